//! Network Graph Snapshot
//!
//! A node's local view of the overlay, assembled from discovery facts:
//! - `NetworkGraph`: append-only directed multigraph, frozen once routed
//! - `NetworkGraphWithProperties`: shared snapshot plus per-node properties
//! - `TopologyDescription`: serde form for building a snapshot in one call
//! - `format`: Graphviz and plain-text renderings for consoles

mod description;
pub mod format;
mod link;
mod properties;
mod snapshot;

pub use description::{LinkDescription, NodeDescription, TopologyDescription};
pub use link::NetworkGraphLink;
pub use properties::{NetworkGraphWithProperties, NodeProperties, DISPLAY_NAME_PROPERTY};
pub use snapshot::NetworkGraph;
