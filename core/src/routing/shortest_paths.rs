// Breadth-first shortest path tree over a snapshot's adjacency map
//
// Hop count is the only metric. The adjacency map is ordered by source node
// and then by link id; nodes are expanded in discovery order. Together this
// fixes which incoming link wins among equally short paths: the lowest link
// id from the earliest discovered predecessor.

use crate::graph::NetworkGraphLink;
use crate::identity::InstanceSessionId;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Outgoing links per source node, keyed by link id
pub(crate) type Adjacency = BTreeMap<InstanceSessionId, BTreeMap<String, NetworkGraphLink>>;

/// Result of one breadth-first search from the local node
#[derive(Debug, Default)]
pub(crate) struct ShortestPathTree {
    /// Reachable node (local node excluded) → link it is reached through
    pub incoming: BTreeMap<InstanceSessionId, NetworkGraphLink>,
    /// Reachable node (local node excluded) → number of hops from the local node
    pub hops: BTreeMap<InstanceSessionId, usize>,
}

impl ShortestPathTree {
    /// All reachable nodes, the local node included
    pub fn reachable_set(&self, local: &InstanceSessionId) -> BTreeSet<InstanceSessionId> {
        let mut reachable: BTreeSet<_> = self.incoming.keys().cloned().collect();
        reachable.insert(local.clone());
        reachable
    }
}

pub(crate) fn compute(local: &InstanceSessionId, adjacency: &Adjacency) -> ShortestPathTree {
    let mut tree = ShortestPathTree::default();
    let mut queue = VecDeque::new();
    queue.push_back((local, 0usize));

    while let Some((node, distance)) = queue.pop_front() {
        let Some(outgoing) = adjacency.get(node) else {
            continue;
        };
        for link in outgoing.values() {
            let target = &link.target;
            if target == local || tree.incoming.contains_key(target) {
                continue;
            }
            tree.incoming.insert(target.clone(), link.clone());
            tree.hops.insert(target.clone(), distance + 1);
            queue.push_back((target, distance + 1));
        }
    }

    tracing::trace!(
        "Shortest path tree from {}: {} reachable nodes",
        local,
        tree.incoming.len()
    );
    tree
}
