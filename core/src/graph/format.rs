//! Text renderings of snapshots for consoles and debugging
//!
//! - [`to_graphviz`]: `dot` digraph, local node and optionally the spanning
//!   tree drawn bold
//! - [`summary`]: counts followed by sorted node and link lists
//! - [`link_list`]: one `source --[id]--> target` line per link

use super::{NetworkGraph, NetworkGraphLink, NetworkGraphWithProperties};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

const GRAPH_NAME: &str = "overlay_network";

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render as a Graphviz digraph.
///
/// Vertices are labelled with their `display_name` property, falling back to
/// the session id. Edges are labelled with the link id.
///
/// With `mark_spanning_tree`, edges of the broadcast spanning tree are drawn
/// bold. This derives the snapshot's routing information if nothing has yet,
/// which freezes it.
pub fn to_graphviz(graph: &NetworkGraphWithProperties, mark_spanning_tree: bool) -> String {
    let snapshot = graph.graph();
    let local = snapshot.local_node();
    let tree_links = if mark_spanning_tree {
        snapshot.routing_information().spanning_tree_links()
    } else {
        BTreeSet::new()
    };

    let mut out = String::new();
    let _ = writeln!(out, "digraph {} {{", GRAPH_NAME);
    for node in snapshot.node_ids() {
        let label = graph.display_name(&node).unwrap_or(node.as_str());
        let style = if node == *local { ", style=bold" } else { "" };
        let _ = writeln!(
            out,
            "  {} [label={}{}];",
            quoted(node.as_str()),
            quoted(label),
            style
        );
    }
    for link in snapshot.links() {
        let style = if tree_links.contains(&link) { ", style=bold" } else { "" };
        let _ = writeln!(
            out,
            "  {} -> {} [label={}{}];",
            quoted(link.source.as_str()),
            quoted(link.target.as_str()),
            quoted(&link.link_id),
            style
        );
    }
    out.push_str("}\n");
    out
}

/// One indented line per link, sorted
pub fn link_list<'a>(links: impl IntoIterator<Item = &'a NetworkGraphLink>) -> String {
    let mut sorted: Vec<&NetworkGraphLink> = links.into_iter().collect();
    sorted.sort();
    let mut out = String::new();
    for link in sorted {
        let _ = writeln!(out, "  {}", link);
    }
    out
}

/// Multi-line overview: metadata, nodes with in/out degree, links
pub fn summary(graph: &NetworkGraph) -> String {
    let local = graph.local_node();
    let links = graph.links();

    let mut in_degree: BTreeMap<_, usize> = BTreeMap::new();
    let mut out_degree: BTreeMap<_, usize> = BTreeMap::new();
    for link in &links {
        *out_degree.entry(&link.source).or_default() += 1;
        *in_degree.entry(&link.target).or_default() += 1;
    }

    let mut out = String::new();
    let _ = writeln!(out, "Topology Metadata:");
    let _ = writeln!(
        out,
        "  Local Node Id: {}, Nodes: {}, Links: {}, Frozen: {}",
        local,
        graph.node_count(),
        links.len(),
        graph.is_frozen()
    );
    let _ = writeln!(out, "Known Nodes:");
    for node in graph.node_ids() {
        let marker = if node == *local { "*" } else { "" };
        let _ = writeln!(
            out,
            "  {}{}, --{}-> * --{}->",
            node,
            marker,
            in_degree.get(&node).copied().unwrap_or(0),
            out_degree.get(&node).copied().unwrap_or(0)
        );
    }
    let _ = writeln!(out, "Links:");
    out.push_str(&link_list(&links));
    out
}
