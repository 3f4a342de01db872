use crate::identity::InstanceSessionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed link between two sessions, identified by a graph-unique id.
///
/// Ordering is by link id first, which is what the routing engine relies on
/// when it breaks ties between equally short paths.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NetworkGraphLink {
    pub link_id: String,
    pub source: InstanceSessionId,
    pub target: InstanceSessionId,
}

impl NetworkGraphLink {
    pub fn new(
        link_id: impl Into<String>,
        source: InstanceSessionId,
        target: InstanceSessionId,
    ) -> Self {
        Self {
            link_id: link_id.into(),
            source,
            target,
        }
    }

    /// Short form used in compact graph dumps: `id:source->target`
    pub fn compact(&self) -> String {
        format!("{}:{}->{}", self.link_id, self.source, self.target)
    }
}

impl fmt::Display for NetworkGraphLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --[{}]--> {}", self.source, self.link_id, self.target)
    }
}
