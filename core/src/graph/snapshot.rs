// Network Graph Snapshot: one node's view of the overlay at one moment
//
// Directed multigraph over instance sessions. Append-only while it is being
// assembled; deriving routing information freezes it for good.

use super::{NetworkGraphLink, NetworkGraphWithProperties, NodeProperties};
use crate::identity::InstanceSessionId;
use crate::routing::{shortest_path_tree, Adjacency, RoutingError, RoutingInformation};
use crate::settings::RoutingSettings;
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Default)]
struct GraphState {
    nodes: BTreeSet<InstanceSessionId>,
    links: BTreeMap<String, NetworkGraphLink>,
    outgoing: Adjacency,
    frozen: bool,
}

impl GraphState {
    fn insert_link(&mut self, link: NetworkGraphLink) {
        self.outgoing
            .entry(link.source.clone())
            .or_default()
            .insert(link.link_id.clone(), link.clone());
        self.links.insert(link.link_id.clone(), link);
    }

    fn ensure_mutable(&self, operation: &str) -> Result<(), RoutingError> {
        if self.frozen {
            return Err(RoutingError::InvariantViolation(format!(
                "Cannot {} after routing information was derived",
                operation
            )));
        }
        Ok(())
    }
}

pub struct NetworkGraph {
    local_node: InstanceSessionId,
    settings: RoutingSettings,
    state: RwLock<GraphState>,
    routing: Mutex<Option<Arc<RoutingInformation>>>,
}

impl NetworkGraph {
    /// A snapshot containing only `local_node`
    pub fn new(local_node: InstanceSessionId) -> Self {
        Self::with_settings(local_node, RoutingSettings::default())
    }

    pub fn with_settings(local_node: InstanceSessionId, settings: RoutingSettings) -> Self {
        let mut state = GraphState::default();
        state.nodes.insert(local_node.clone());
        Self {
            local_node,
            settings,
            state: RwLock::new(state),
            routing: Mutex::new(None),
        }
    }

    pub fn local_node(&self) -> &InstanceSessionId {
        &self.local_node
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    // ========================================================================
    // ASSEMBLY
    // ========================================================================

    /// Add a vertex. Returns false if it was already present.
    pub fn add_node(&self, node: InstanceSessionId) -> Result<bool, RoutingError> {
        let mut state = self.state.write();
        state.ensure_mutable("add a node")?;
        if state.nodes.contains(&node) {
            if node != self.local_node {
                tracing::debug!("Ignoring redundant add of node {}", node);
            }
            return Ok(false);
        }
        state.nodes.insert(node);
        Ok(true)
    }

    /// Add a directed link between two existing vertices.
    pub fn add_link(
        &self,
        link_id: impl Into<String>,
        source: InstanceSessionId,
        target: InstanceSessionId,
    ) -> Result<NetworkGraphLink, RoutingError> {
        let link = NetworkGraphLink::new(link_id, source, target);
        let mut state = self.state.write();
        state.ensure_mutable("add a link")?;

        for endpoint in [&link.source, &link.target] {
            if !state.nodes.contains(endpoint) {
                return Err(RoutingError::InvariantViolation(format!(
                    "Link {} references unknown node {}",
                    link.link_id, endpoint
                )));
            }
        }
        if let Some(existing) = state.links.get(&link.link_id) {
            return Err(RoutingError::InvariantViolation(format!(
                "Duplicate link id {} (already used by {})",
                link.link_id, existing
            )));
        }

        state.insert_link(link.clone());
        Ok(link)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.state.read().links.len()
    }

    pub fn contains_node(&self, node: &InstanceSessionId) -> bool {
        self.state.read().nodes.contains(node)
    }

    /// Sorted vertex set
    pub fn node_ids(&self) -> Vec<InstanceSessionId> {
        self.state.read().nodes.iter().cloned().collect()
    }

    /// All links ordered by link id
    pub fn links(&self) -> Vec<NetworkGraphLink> {
        self.state.read().links.values().cloned().collect()
    }

    pub fn link(&self, link_id: &str) -> Option<NetworkGraphLink> {
        self.state.read().links.get(link_id).cloned()
    }

    /// Links leaving `node`, ordered by link id
    pub fn outgoing_links(&self, node: &InstanceSessionId) -> Vec<NetworkGraphLink> {
        self.state
            .read()
            .outgoing
            .get(node)
            .map(|links| links.values().cloned().collect())
            .unwrap_or_default()
    }

    /// True once routing information has been derived
    pub fn is_frozen(&self) -> bool {
        self.state.read().frozen
    }

    /// Deterministic single-line rendering.
    ///
    /// Nodes in id order, the local node marked with `*`; links ordered by
    /// source node and then link id. Identical for identical graphs no matter
    /// in which order they were assembled.
    pub fn compact_representation(&self) -> String {
        let state = self.state.read();
        let nodes: Vec<String> = state
            .nodes
            .iter()
            .map(|node| {
                if *node == self.local_node {
                    format!("{}*", node)
                } else {
                    node.to_string()
                }
            })
            .collect();
        let links: Vec<String> = state
            .outgoing
            .values()
            .flat_map(|links| links.values())
            .map(NetworkGraphLink::compact)
            .collect();
        format!("nodes=[{}]; links=[{}]", nodes.join(", "), links.join(", "))
    }

    // ========================================================================
    // DERIVED SNAPSHOTS
    // ========================================================================

    /// New, unfrozen snapshot restricted to `subset`.
    ///
    /// Keeps every vertex of `subset` that exists here and every link whose
    /// endpoints both survive. The local node must be part of `subset`.
    pub fn induced_subgraph(
        &self,
        subset: &BTreeSet<InstanceSessionId>,
    ) -> Result<NetworkGraph, RoutingError> {
        if !subset.contains(&self.local_node) {
            return Err(RoutingError::InvariantViolation(format!(
                "Induced subgraph must contain the local node {}",
                self.local_node
            )));
        }

        let state = self.state.read();
        let mut reduced = GraphState {
            nodes: state.nodes.intersection(subset).cloned().collect(),
            ..GraphState::default()
        };
        for link in state.links.values() {
            if reduced.nodes.contains(&link.source) && reduced.nodes.contains(&link.target) {
                reduced.insert_link(link.clone());
            }
        }

        Ok(Self {
            local_node: self.local_node.clone(),
            settings: self.settings.clone(),
            state: RwLock::new(reduced),
            routing: Mutex::new(None),
        })
    }

    /// Induced subgraph over the nodes reachable from the local node.
    ///
    /// Leaves this snapshot unfrozen and its routing derivation unused.
    pub fn reduce_to_reachable(&self) -> Result<NetworkGraph, RoutingError> {
        let reachable = {
            let state = self.state.read();
            shortest_path_tree(&self.local_node, &state.outgoing).reachable_set(&self.local_node)
        };
        self.induced_subgraph(&reachable)
    }

    /// Wrap a shared snapshot with per-node properties
    pub fn attach_node_properties(
        self: &Arc<Self>,
        properties: BTreeMap<InstanceSessionId, NodeProperties>,
    ) -> NetworkGraphWithProperties {
        NetworkGraphWithProperties::new(Arc::clone(self), properties)
    }

    // ========================================================================
    // ROUTING
    // ========================================================================

    /// Derive routing information; may be called once per snapshot.
    ///
    /// Freezes the snapshot. A second call, or a call after
    /// [`routing_information`](Self::routing_information) already derived,
    /// fails with `InvariantViolation`.
    pub fn generate_routing_information(&self) -> Result<Arc<RoutingInformation>, RoutingError> {
        let mut slot = self.routing.lock();
        if slot.is_some() {
            return Err(RoutingError::InvariantViolation(
                "Routing information was already derived from this snapshot".to_string(),
            ));
        }
        let routing = self.derive();
        *slot = Some(Arc::clone(&routing));
        Ok(routing)
    }

    /// Shared routing information, derived on first use
    pub fn routing_information(&self) -> Arc<RoutingInformation> {
        let mut slot = self.routing.lock();
        if let Some(routing) = slot.as_ref() {
            return Arc::clone(routing);
        }
        let routing = self.derive();
        *slot = Some(Arc::clone(&routing));
        routing
    }

    // Caller holds the routing slot lock.
    fn derive(&self) -> Arc<RoutingInformation> {
        let mut state = self.state.write();
        state.frozen = true;
        let state = RwLockWriteGuard::downgrade(state);
        Arc::new(RoutingInformation::derive(
            &self.local_node,
            &state.outgoing,
            &self.settings,
        ))
    }
}

impl fmt::Debug for NetworkGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkGraph")
            .field("local_node", &self.local_node)
            .field("nodes", &self.node_count())
            .field("links", &self.link_count())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}
