// Overlay Core: topology and routing
//
// A node's local view of the overlay network: who exists, who is reachable,
// which link to send on, and what to call everyone.
//
// Transport, discovery and persistence live elsewhere. Nothing in here
// touches the network or the disk (settings files excepted).

pub mod graph;
pub mod identity;
pub mod names;
pub mod routing;
pub mod settings;

pub use graph::{
    NetworkGraph, NetworkGraphLink, NetworkGraphWithProperties, NodeProperties,
    TopologyDescription, DISPLAY_NAME_PROPERTY,
};
pub use identity::{
    IdType, IdentifierError, InstanceId, InstanceSessionId, LogicalNodeId, LogicalNodeSessionId,
    NodeId, SessionScoped,
};
pub use names::{NameFallback, NodeNameRegistry};
pub use routing::{
    CacheStats, ReachabilityChange, ReachabilityTracker, RoutingError, RoutingInformation,
};
pub use settings::{NamingSettings, RoutingSettings, SettingsError, TopologySettings};
