//! Routing Engine: shortest paths over one frozen snapshot
//!
//! Routing information is derived from a [`NetworkGraph`](crate::graph::NetworkGraph)
//! exactly once and never changes afterwards:
//! - Shortest paths: breadth-first search from the local node, hop count only
//! - Next hop: memoized predecessor walk, one cache entry per node
//! - Spanning tree: inverse of the shortest path tree, for broadcasts
//! - Tracker: reachable set changes between successive snapshots

mod information;
mod shortest_paths;
mod tracker;

pub use information::{CacheStats, RoutingInformation};
pub(crate) use shortest_paths::{compute as shortest_path_tree, Adjacency};
pub use tracker::{ReachabilityChange, ReachabilityTracker};

use crate::identity::InstanceSessionId;
use thiserror::Error;

/// Routing and snapshot errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The target is the local node or is not reachable in this snapshot
    #[error("No route to node {target}")]
    NoRouteToNode { target: InstanceSessionId },

    /// Structural inconsistency; indicates a bug in the caller
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}
