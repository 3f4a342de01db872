// Integration tests for snapshot assembly, derivation and replacement
//
// Covers reachable-graph reduction, induced subgraphs, single-use routing
// derivation, property wrappers, batch builds and reachability tracking
// across successive snapshots.

use overlay_core::graph::format;
use overlay_core::{
    InstanceSessionId, NetworkGraph, ReachabilityTracker, RoutingError, RoutingSettings,
    TopologyDescription,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn node(n: usize) -> InstanceSessionId {
    format!("{:032x}::{:010x}", n + 1, 42).parse().unwrap()
}

fn linear_chain(n: usize, root: usize, closed: bool) -> NetworkGraph {
    let graph = NetworkGraph::new(node(root));
    for i in 0..n {
        graph.add_node(node(i)).unwrap();
    }
    for i in 0..n - 1 {
        graph.add_link(format!("{}-", i), node(i), node(i + 1)).unwrap();
    }
    if closed {
        graph.add_link("back-", node(n - 1), node(0)).unwrap();
    }
    graph
}

#[test]
fn test_reduction_to_reachable_on_chains() {
    let n = 5;
    for root in 0..n {
        let raw = linear_chain(n, root, false);
        assert_eq!(raw.node_count(), n);
        assert_eq!(raw.link_count(), n - 1);

        let reachable = raw.reduce_to_reachable().unwrap();
        assert_eq!(reachable.node_count(), n - root);
        assert_eq!(reachable.link_count(), n - root - 1);

        // raw graph is unchanged
        assert_eq!(raw.node_count(), n);
        assert_eq!(raw.link_count(), n - 1);
    }
    println!("✓ Open chains reduce to the downstream part");
}

#[test]
fn test_reduction_to_reachable_on_loops() {
    let n = 5;
    for root in 0..n {
        let raw = linear_chain(n, root, true);
        let reachable = raw.reduce_to_reachable().unwrap();
        assert_eq!(reachable.node_count(), n);
        assert_eq!(reachable.link_count(), n);
    }
    println!("✓ Closed loops are fully reachable from every root");
}

#[test]
fn test_reduction_drops_detached_and_inbound_only_nodes() {
    let graph = NetworkGraph::new(node(0));
    graph.add_node(node(1)).unwrap();
    graph.add_node(node(2)).unwrap();
    graph.add_link("x-", node(0), node(1)).unwrap();
    let reachable = graph.reduce_to_reachable().unwrap();
    assert_eq!((reachable.node_count(), reachable.link_count()), (2, 1));

    graph.add_link("y-", node(2), node(0)).unwrap();
    let reachable = graph.reduce_to_reachable().unwrap();
    assert_eq!((reachable.node_count(), reachable.link_count()), (2, 1));
    assert!(!reachable.contains_node(&node(2)));

    println!("✓ Detached and inbound-only nodes are dropped");
}

#[test]
fn test_induced_subgraph_invariant() {
    let graph = linear_chain(4, 0, true);

    let subset = BTreeSet::from([node(0), node(1), node(3)]);
    let sub = graph.induced_subgraph(&subset).unwrap();
    assert_eq!(sub.node_ids().into_iter().collect::<BTreeSet<_>>(), subset);
    for link in sub.links() {
        assert!(subset.contains(&link.source) && subset.contains(&link.target));
    }
    // 0-: 0→1 and back-: 3→0 survive; 1-: 1→2 and 2-: 2→3 do not
    let ids: Vec<_> = sub.links().into_iter().map(|l| l.link_id).collect();
    assert_eq!(ids, vec!["0-", "back-"]);

    let without_local = BTreeSet::from([node(1), node(2)]);
    assert!(matches!(
        graph.induced_subgraph(&without_local),
        Err(RoutingError::InvariantViolation(_))
    ));

    println!("✓ Induced subgraphs keep exactly the inner links");
}

#[test]
fn test_single_use_routing_derivation() {
    let graph = linear_chain(3, 0, false);
    let routing = graph.generate_routing_information().unwrap();
    assert_eq!(routing.reachable_nodes().len(), 3);

    assert!(matches!(
        graph.generate_routing_information(),
        Err(RoutingError::InvariantViolation(_))
    ));
    assert!(graph.is_frozen());
    assert!(matches!(
        graph.add_node(node(9)),
        Err(RoutingError::InvariantViolation(_))
    ));

    // the frozen snapshot still answers queries and can seed a new one
    let copy = graph.reduce_to_reachable().unwrap();
    assert!(!copy.is_frozen());
    assert!(copy.generate_routing_information().is_ok());

    println!("✓ Routing information is derived once per snapshot");
}

#[test]
fn test_description_build_and_render() {
    let (l, a, b) = (node(0), node(1), node(2));
    let json = format!(
        r#"{{
            "local": "{l}",
            "nodes": [{{ "id": "{a}", "name": "Alpha" }}, {{ "id": "{b}" }}],
            "links": [
                {{ "id": "l-a", "source": "{l}", "target": "{a}" }},
                {{ "id": "b-l", "source": "{b}", "target": "{l}" }}
            ]
        }}"#
    );
    let description = TopologyDescription::from_json_str(&json).unwrap();
    let graph = Arc::new(description.build(&RoutingSettings::default()).unwrap());
    assert_eq!(graph.node_count(), 3);

    let with_names = graph.attach_node_properties(description.display_names());
    let dot = format::to_graphviz(&with_names, false);
    assert!(dot.contains("label=\"Alpha\""));
    assert!(dot.contains(&format!("label=\"{}\", style=bold", l)));

    let reachable = Arc::new(graph.reduce_to_reachable().unwrap());
    let dot = format::to_graphviz(
        &reachable.attach_node_properties(description.display_names()),
        true,
    );
    assert!(!dot.contains(b.as_str()));
    assert!(dot.contains("[label=\"l-a\", style=bold]"));

    println!("✓ Topology description builds and renders");
}

#[test]
fn test_tracker_follows_snapshot_replacement() {
    let tracker = ReachabilityTracker::new();

    let first = linear_chain(4, 0, false);
    let change = tracker.update(&first.routing_information()).unwrap();
    assert_eq!(change.added.len(), 3);

    // the link 1→2 disappears in the next snapshot
    let second = NetworkGraph::new(node(0));
    for i in 1..4 {
        second.add_node(node(i)).unwrap();
    }
    second.add_link("0-", node(0), node(1)).unwrap();
    second.add_link("2-", node(2), node(3)).unwrap();

    let change = tracker.update(&second.routing_information()).unwrap();
    assert!(change.added.is_empty());
    assert_eq!(change.removed, BTreeSet::from([node(2), node(3)]));

    assert_eq!(tracker.update(&second.reduce_to_reachable().unwrap().routing_information()), None);

    println!("✓ Tracker reports reachability changes between snapshots");
}
