use super::NetworkGraph;
use crate::identity::InstanceSessionId;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Property key holding a node's display name
pub const DISPLAY_NAME_PROPERTY: &str = "display_name";

/// Key → value properties of one node
pub type NodeProperties = BTreeMap<String, String>;

/// A snapshot plus per-node properties.
///
/// The snapshot is shared, not copied; queries on it go through [`graph`](Self::graph).
#[derive(Debug, Clone)]
pub struct NetworkGraphWithProperties {
    graph: Arc<NetworkGraph>,
    properties: BTreeMap<InstanceSessionId, NodeProperties>,
}

impl NetworkGraphWithProperties {
    pub(crate) fn new(
        graph: Arc<NetworkGraph>,
        properties: BTreeMap<InstanceSessionId, NodeProperties>,
    ) -> Self {
        Self { graph, properties }
    }

    pub fn graph(&self) -> &Arc<NetworkGraph> {
        &self.graph
    }

    pub fn node_property(&self, node: &InstanceSessionId, key: &str) -> Option<&str> {
        self.properties
            .get(node)
            .and_then(|props| props.get(key))
            .map(String::as_str)
    }

    pub fn node_properties(&self, node: &InstanceSessionId) -> Option<&NodeProperties> {
        self.properties.get(node)
    }

    pub fn display_name(&self, node: &InstanceSessionId) -> Option<&str> {
        self.node_property(node, DISPLAY_NAME_PROPERTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_share_the_snapshot() {
        let local: InstanceSessionId = format!("{:032x}::{:010x}", 1, 1).parse().unwrap();
        let graph = Arc::new(NetworkGraph::new(local.clone()));

        let mut props = NodeProperties::new();
        props.insert(DISPLAY_NAME_PROPERTY.to_string(), "Home".to_string());
        props.insert("role".to_string(), "relay".to_string());
        let with_props = graph.attach_node_properties(BTreeMap::from([(local.clone(), props)]));

        assert!(Arc::ptr_eq(with_props.graph(), &graph));
        assert_eq!(with_props.display_name(&local), Some("Home"));
        assert_eq!(with_props.node_property(&local, "role"), Some("relay"));
        assert_eq!(with_props.node_property(&local, "missing"), None);
        assert_eq!(with_props.node_properties(&local).map(|p| p.len()), Some(2));
    }
}
