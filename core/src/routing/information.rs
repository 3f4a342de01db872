//! Routing information derived from one frozen snapshot
//!
//! Holds the breadth-first shortest path tree and answers three kinds of
//! question about it:
//! - **Next hop**: which of the local node's outgoing links leads towards a target
//! - **Route**: the full link sequence from the local node to a target
//! - **Spanning tree**: the broadcast tree covering every reachable node
//!
//! Next-hop answers are memoized on first request; the memo table only grows.

use super::shortest_paths::{self, Adjacency};
use super::RoutingError;
use crate::graph::NetworkGraphLink;
use crate::identity::InstanceSessionId;
use crate::settings::RoutingSettings;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Next-hop cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    /// One per node whose next hop had to be computed
    pub misses: u64,
}

/// Broadcast tree rooted at the local node
#[derive(Debug, Default)]
struct SpanningTree {
    links: BTreeSet<NetworkGraphLink>,
    children: BTreeMap<InstanceSessionId, Vec<NetworkGraphLink>>,
}

pub struct RoutingInformation {
    local_node: InstanceSessionId,
    verbose_logging: bool,
    incoming: BTreeMap<InstanceSessionId, NetworkGraphLink>,
    hops: BTreeMap<InstanceSessionId, usize>,
    reachable: BTreeSet<InstanceSessionId>,
    next_links: Mutex<HashMap<InstanceSessionId, NetworkGraphLink>>,
    spanning_tree: Mutex<Option<Arc<SpanningTree>>>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl RoutingInformation {
    pub(crate) fn derive(
        local_node: &InstanceSessionId,
        adjacency: &Adjacency,
        settings: &RoutingSettings,
    ) -> Self {
        let tree = shortest_paths::compute(local_node, adjacency);
        let reachable = tree.reachable_set(local_node);

        if settings.verbose_logging {
            tracing::debug!(
                "Derived routing information for {}: {} nodes reachable",
                local_node,
                reachable.len()
            );
        }

        Self {
            local_node: local_node.clone(),
            verbose_logging: settings.verbose_logging,
            incoming: tree.incoming,
            hops: tree.hops,
            reachable,
            next_links: Mutex::new(HashMap::new()),
            spanning_tree: Mutex::new(None),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    pub fn local_node(&self) -> &InstanceSessionId {
        &self.local_node
    }

    // ========================================================================
    // NEXT HOP
    // ========================================================================

    /// The outgoing link of the local node on the shortest path to `target`.
    ///
    /// Fails with `NoRouteToNode` for the local node itself and for any node
    /// not reachable in this snapshot. Failures are not cached.
    pub fn next_link_towards(
        &self,
        target: &InstanceSessionId,
    ) -> Result<NetworkGraphLink, RoutingError> {
        if *target == self.local_node || !self.incoming.contains_key(target) {
            return Err(RoutingError::NoRouteToNode {
                target: target.clone(),
            });
        }

        let mut cache = self.next_links.lock();
        if let Some(link) = cache.get(target) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(link.clone());
        }

        // Walk predecessors until we hit a memoized node or a link leaving
        // the local node; every node passed on the way shares the answer.
        let mut walked = Vec::new();
        let mut current = target;
        let first_link = loop {
            if let Some(link) = cache.get(current) {
                break link.clone();
            }
            let incoming = self.incoming.get(current).ok_or_else(|| {
                RoutingError::InvariantViolation(format!(
                    "Predecessor chain of {} is broken at {}",
                    target, current
                ))
            })?;
            walked.push(current.clone());
            if incoming.source == self.local_node {
                break incoming.clone();
            }
            current = &incoming.source;
        };

        let misses = walked.len() as u64;
        for node in walked {
            cache.insert(node, first_link.clone());
        }
        self.cache_misses.fetch_add(misses, Ordering::Relaxed);

        if self.verbose_logging {
            tracing::debug!(
                "Next hop towards {} is {} ({} new cache entries)",
                target,
                first_link.link_id,
                misses
            );
        }
        Ok(first_link)
    }

    /// Complete path from the local node to `target`, first hop first.
    ///
    /// `Ok(None)` if `target` is not reachable. Asking for a route to the
    /// local node is a caller bug and fails with `InvariantViolation`.
    pub fn route_to(
        &self,
        target: &InstanceSessionId,
    ) -> Result<Option<Vec<NetworkGraphLink>>, RoutingError> {
        if *target == self.local_node {
            return Err(RoutingError::InvariantViolation(format!(
                "Cannot compute a route from the local node {} to itself",
                target
            )));
        }

        let mut route = Vec::new();
        let mut current = target;
        while *current != self.local_node {
            let Some(link) = self.incoming.get(current) else {
                return Ok(None);
            };
            route.push(link.clone());
            current = &link.source;
        }
        route.reverse();
        Ok(Some(route))
    }

    // ========================================================================
    // SPANNING TREE
    // ========================================================================

    fn spanning_tree(&self) -> Arc<SpanningTree> {
        let mut slot = self.spanning_tree.lock();
        if let Some(tree) = slot.as_ref() {
            return Arc::clone(tree);
        }

        let mut tree = SpanningTree::default();
        for link in self.incoming.values() {
            tree.links.insert(link.clone());
            tree.children
                .entry(link.source.clone())
                .or_default()
                .push(link.clone());
        }
        for children in tree.children.values_mut() {
            children.sort();
        }

        let tree = Arc::new(tree);
        *slot = Some(Arc::clone(&tree));
        tree
    }

    /// Links of the broadcast spanning tree; reaches every reachable node exactly once
    pub fn spanning_tree_links(&self) -> BTreeSet<NetworkGraphLink> {
        self.spanning_tree().links.clone()
    }

    /// Tree links grouped by their source node.
    ///
    /// Leaves have no entry. Each child list is ordered by link id.
    pub fn spanning_tree_child_map(&self) -> BTreeMap<InstanceSessionId, Vec<NetworkGraphLink>> {
        self.spanning_tree().children.clone()
    }

    // ========================================================================
    // REACHABILITY
    // ========================================================================

    /// Every node reachable from the local node, including the local node
    pub fn reachable_nodes(&self) -> &BTreeSet<InstanceSessionId> {
        &self.reachable
    }

    pub fn is_reachable(&self, node: &InstanceSessionId) -> bool {
        self.reachable.contains(node)
    }

    /// Shortest distance in links; `Some(0)` for the local node
    pub fn hop_count(&self, target: &InstanceSessionId) -> Option<usize> {
        if *target == self.local_node {
            return Some(0);
        }
        self.hops.get(target).copied()
    }

    // ========================================================================
    // DIAGNOSTICS
    // ========================================================================

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.cache_hits.load(Ordering::Relaxed),
            misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    /// Zero the counters; the memo table itself is kept
    pub fn reset_cache_stats(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for RoutingInformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingInformation")
            .field("local_node", &self.local_node)
            .field("reachable", &self.reachable.len())
            .field("cache_stats", &self.cache_stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(n: u8) -> InstanceSessionId {
        format!("{:032x}::{:010x}", n, 7).parse().unwrap()
    }

    fn routing(local: u8, links: &[(&str, u8, u8)]) -> RoutingInformation {
        let mut adjacency = Adjacency::new();
        for (id, source, target) in links {
            let link = NetworkGraphLink::new(*id, node(*source), node(*target));
            adjacency
                .entry(link.source.clone())
                .or_default()
                .insert(id.to_string(), link);
        }
        RoutingInformation::derive(&node(local), &adjacency, &RoutingSettings::default())
    }

    #[test]
    fn test_local_target_leaves_cache_untouched() {
        let info = routing(1, &[("12", 1, 2)]);
        assert!(matches!(
            info.next_link_towards(&node(1)),
            Err(RoutingError::NoRouteToNode { .. })
        ));
        assert_eq!(info.cache_stats(), CacheStats::default());
    }

    #[test]
    fn test_cache_hit_after_miss() {
        let info = routing(1, &[("12", 1, 2), ("23", 2, 3)]);
        assert_eq!(info.next_link_towards(&node(3)).unwrap().link_id, "12");
        assert_eq!(info.cache_stats(), CacheStats { hits: 0, misses: 2 });

        assert_eq!(info.next_link_towards(&node(2)).unwrap().link_id, "12");
        assert_eq!(info.cache_stats(), CacheStats { hits: 1, misses: 2 });

        info.reset_cache_stats();
        assert_eq!(info.cache_stats(), CacheStats::default());
        info.next_link_towards(&node(3)).unwrap();
        assert_eq!(info.cache_stats().misses, 0);
    }

    #[test]
    fn test_unreachable_failure_not_cached() {
        let info = routing(1, &[("21", 2, 1)]);
        for _ in 0..3 {
            assert!(info.next_link_towards(&node(2)).is_err());
        }
        assert_eq!(info.cache_stats(), CacheStats::default());
    }

    #[test]
    fn test_route_is_ordered_from_local_node() {
        let info = routing(1, &[("12", 1, 2), ("23", 2, 3), ("34", 3, 4)]);
        let route = info.route_to(&node(4)).unwrap().unwrap();
        let ids: Vec<_> = route.iter().map(|l| l.link_id.as_str()).collect();
        assert_eq!(ids, vec!["12", "23", "34"]);
        assert_eq!(route[0].source, node(1));
        assert_eq!(route[2].target, node(4));
    }

    #[test]
    fn test_route_to_local_node_is_rejected() {
        let info = routing(1, &[("12", 1, 2)]);
        assert!(matches!(
            info.route_to(&node(1)),
            Err(RoutingError::InvariantViolation(_))
        ));
        assert_eq!(info.route_to(&node(9)).unwrap(), None);
    }

    #[test]
    fn test_hop_count() {
        let info = routing(1, &[("12", 1, 2), ("23", 2, 3), ("13", 1, 3)]);
        assert_eq!(info.hop_count(&node(1)), Some(0));
        assert_eq!(info.hop_count(&node(3)), Some(1));
        assert_eq!(info.hop_count(&node(8)), None);
    }

    #[test]
    fn test_spanning_tree_child_map_lists_sorted_children() {
        let info = routing(1, &[("b", 1, 2), ("a", 1, 3), ("c", 3, 4)]);
        let children = info.spanning_tree_child_map();

        let root: Vec<_> = children[&node(1)].iter().map(|l| l.link_id.as_str()).collect();
        assert_eq!(root, vec!["a", "b"]);
        assert_eq!(children[&node(3)].len(), 1);
        assert!(!children.contains_key(&node(2)));
        assert!(!children.contains_key(&node(4)));
    }
}
