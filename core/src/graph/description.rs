// Batch form of a topology: everything needed to assemble one snapshot

use super::{NetworkGraph, NodeProperties, DISPLAY_NAME_PROPERTY};
use crate::identity::InstanceSessionId;
use crate::names::NodeNameRegistry;
use crate::routing::RoutingError;
use crate::settings::RoutingSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub id: InstanceSessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescription {
    pub id: String,
    pub source: InstanceSessionId,
    pub target: InstanceSessionId,
}

/// Serializable description of one snapshot.
///
/// ```json
/// { "local": "<session id>",
///   "nodes": [{ "id": "<session id>", "name": "Alpha" }],
///   "links": [{ "id": "l1", "source": "<session id>", "target": "<session id>" }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyDescription {
    pub local: InstanceSessionId,
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
    #[serde(default)]
    pub links: Vec<LinkDescription>,
}

impl TopologyDescription {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Assemble a snapshot: all nodes first, then all links in listed order
    pub fn build(&self, settings: &RoutingSettings) -> Result<NetworkGraph, RoutingError> {
        let graph = NetworkGraph::with_settings(self.local.clone(), settings.clone());
        for node in &self.nodes {
            graph.add_node(node.id.clone())?;
        }
        for link in &self.links {
            graph.add_link(link.id.clone(), link.source.clone(), link.target.clone())?;
        }
        tracing::debug!(
            "Built snapshot for {}: {} nodes, {} links",
            self.local,
            graph.node_count(),
            graph.link_count()
        );
        Ok(graph)
    }

    /// Named nodes as a property map, ready for `attach_node_properties`
    pub fn display_names(&self) -> BTreeMap<InstanceSessionId, NodeProperties> {
        self.nodes
            .iter()
            .filter_map(|node| {
                let name = node.name.as_ref()?;
                let props = NodeProperties::from([(DISPLAY_NAME_PROPERTY.to_string(), name.clone())]);
                Some((node.id.clone(), props))
            })
            .collect()
    }

    /// Feed every listed name into `registry`; returns how many were applied
    pub fn register_names(&self, registry: &NodeNameRegistry) -> usize {
        let mut applied = 0;
        for node in &self.nodes {
            if let Some(name) = &node.name {
                if registry.associate_display_name(&node.id, name.as_str()) {
                    applied += 1;
                }
            }
        }
        applied
    }
}
