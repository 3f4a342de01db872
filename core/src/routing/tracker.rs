// Reachability change tracking across successive snapshots
//
// Each new routing information is compared against the previous one; only
// remote nodes are tracked, the local node is always reachable.

use super::RoutingInformation;
use crate::identity::InstanceSessionId;
use parking_lot::Mutex;
use std::collections::BTreeSet;

/// Remote nodes that became reachable or unreachable between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachabilityChange {
    pub added: BTreeSet<InstanceSessionId>,
    pub removed: BTreeSet<InstanceSessionId>,
}

impl ReachabilityChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ReachabilityTracker {
    reachable: Mutex<BTreeSet<InstanceSessionId>>,
}

impl ReachabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the reachable set of `routing`.
    ///
    /// Returns `None` if the remote reachable set is unchanged.
    pub fn update(&self, routing: &RoutingInformation) -> Option<ReachabilityChange> {
        let local = routing.local_node();
        let current: BTreeSet<InstanceSessionId> = routing
            .reachable_nodes()
            .iter()
            .filter(|node| *node != local)
            .cloned()
            .collect();

        let mut previous = self.reachable.lock();
        let change = ReachabilityChange {
            added: current.difference(&previous).cloned().collect(),
            removed: previous.difference(&current).cloned().collect(),
        };
        *previous = current;
        drop(previous);

        if change.is_empty() {
            tracing::debug!("Topology update did not change the set of reachable nodes");
            return None;
        }
        tracing::info!(
            "Reachable nodes changed: {} added, {} removed",
            change.added.len(),
            change.removed.len()
        );
        Some(change)
    }

    /// Snapshot of the remote nodes reachable as of the last update
    pub fn reachable_remote_nodes(&self) -> BTreeSet<InstanceSessionId> {
        self.reachable.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NetworkGraph;

    fn node(n: u8) -> InstanceSessionId {
        format!("{:032x}::{:010x}", n, 3).parse().unwrap()
    }

    fn snapshot(links: &[(&str, u8, u8)]) -> NetworkGraph {
        let graph = NetworkGraph::new(node(0));
        for (id, source, target) in links {
            graph.add_node(node(*source)).unwrap();
            graph.add_node(node(*target)).unwrap();
            graph.add_link(*id, node(*source), node(*target)).unwrap();
        }
        graph
    }

    #[test]
    fn test_first_update_reports_all_remote_nodes() {
        let tracker = ReachabilityTracker::new();
        let graph = snapshot(&[("a", 0, 1), ("b", 1, 2)]);
        let change = tracker.update(&graph.routing_information()).unwrap();

        assert_eq!(change.added, BTreeSet::from([node(1), node(2)]));
        assert!(change.removed.is_empty());
    }

    #[test]
    fn test_unchanged_topology_reports_nothing() {
        let tracker = ReachabilityTracker::new();
        tracker.update(&snapshot(&[("a", 0, 1)]).routing_information());
        // different link, same reachable set
        assert_eq!(
            tracker.update(&snapshot(&[("z", 0, 1)]).routing_information()),
            None
        );
    }

    #[test]
    fn test_lost_and_gained_nodes() {
        let tracker = ReachabilityTracker::new();
        tracker.update(&snapshot(&[("a", 0, 1), ("b", 0, 2)]).routing_information());

        let change = tracker
            .update(&snapshot(&[("a", 0, 1), ("c", 1, 3)]).routing_information())
            .unwrap();
        assert_eq!(change.added, BTreeSet::from([node(3)]));
        assert_eq!(change.removed, BTreeSet::from([node(2)]));
        assert_eq!(
            tracker.reachable_remote_nodes(),
            BTreeSet::from([node(1), node(3)])
        );
    }

    #[test]
    fn test_isolated_local_node_is_not_a_change() {
        let tracker = ReachabilityTracker::new();
        assert_eq!(tracker.update(&snapshot(&[]).routing_information()), None);
    }
}
