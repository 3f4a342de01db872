//! Node Identity: the four identifier kinds and their session ordering
//!
//! Identifiers form a refinement chain:
//! - `InstanceId`: persistent, survives restarts
//! - `InstanceSessionId`: one run of an instance ("most recent session wins")
//! - `LogicalNodeId`: a sub-identity under one instance
//! - `LogicalNodeSessionId`: a logical node within one session
//!
//! Parsing is purely syntactic. Whether a node is known or reachable is
//! decided by the layers above.

mod ids;

pub use ids::{
    InstanceId, InstanceSessionId, LogicalNodeId, LogicalNodeSessionId, SessionScoped,
    DEFAULT_LOGICAL_NODE_PART, INSTANCE_PART_LENGTH, MAX_LOGICAL_NODE_PART_LENGTH,
    SESSION_PART_LENGTH,
};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Identifier errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("'{input}' cannot be parsed to a valid {expected}")]
    Malformed { input: String, expected: IdType },

    #[error("Ids refer to different instances: {0} / {1}")]
    InstanceMismatch(String, String),
}

/// The four identifier kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
    Instance,
    InstanceSession,
    LogicalNode,
    LogicalNodeSession,
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance => write!(f, "instance id"),
            Self::InstanceSession => write!(f, "instance session id"),
            Self::LogicalNode => write!(f, "logical node id"),
            Self::LogicalNodeSession => write!(f, "logical node session id"),
        }
    }
}

/// Any of the four identifier kinds.
///
/// Ordered by canonical string form, which keeps sorted dumps and snapshot
/// diffs deterministic. The four string grammars are disjoint, so two
/// different variants never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    Instance(InstanceId),
    InstanceSession(InstanceSessionId),
    LogicalNode(LogicalNodeId),
    LogicalNodeSession(LogicalNodeSessionId),
}

impl NodeId {
    pub fn id_type(&self) -> IdType {
        match self {
            Self::Instance(_) => IdType::Instance,
            Self::InstanceSession(_) => IdType::InstanceSession,
            Self::LogicalNode(_) => IdType::LogicalNode,
            Self::LogicalNodeSession(_) => IdType::LogicalNodeSession,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Instance(id) => id.as_str(),
            Self::InstanceSession(id) => id.as_str(),
            Self::LogicalNode(id) => id.as_str(),
            Self::LogicalNodeSession(id) => id.as_str(),
        }
    }

    pub fn instance_part(&self) -> &str {
        match self {
            Self::Instance(id) => id.as_str(),
            Self::InstanceSession(id) => id.instance_part(),
            Self::LogicalNode(id) => id.instance_part(),
            Self::LogicalNodeSession(id) => id.instance_part(),
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        match self {
            Self::Instance(id) => id.clone(),
            Self::InstanceSession(id) => id.instance_id(),
            Self::LogicalNode(id) => id.instance_id(),
            Self::LogicalNodeSession(id) => id.instance_id(),
        }
    }

    /// `None` for the two session-less kinds
    pub fn session_part(&self) -> Option<&str> {
        match self {
            Self::InstanceSession(id) => Some(id.session_part()),
            Self::LogicalNodeSession(id) => Some(id.session_part()),
            Self::Instance(_) | Self::LogicalNode(_) => None,
        }
    }

    /// `None` for the two instance-level kinds
    pub fn logical_node_part(&self) -> Option<&str> {
        match self {
            Self::LogicalNode(id) => Some(id.logical_node_part()),
            Self::LogicalNodeSession(id) => Some(id.logical_node_part()),
            Self::Instance(_) | Self::InstanceSession(_) => None,
        }
    }

    pub fn is_same_instance_as(&self, other: &NodeId) -> bool {
        self.instance_part() == other.instance_part()
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<InstanceId> for NodeId {
    fn from(id: InstanceId) -> Self {
        Self::Instance(id)
    }
}

impl From<InstanceSessionId> for NodeId {
    fn from(id: InstanceSessionId) -> Self {
        Self::InstanceSession(id)
    }
}

impl From<LogicalNodeId> for NodeId {
    fn from(id: LogicalNodeId) -> Self {
        Self::LogicalNode(id)
    }
}

impl From<LogicalNodeSessionId> for NodeId {
    fn from(id: LogicalNodeSessionId) -> Self {
        Self::LogicalNodeSession(id)
    }
}

/// Parse `input` as an identifier of the requested kind.
pub fn parse(input: &str, id_type: IdType) -> Result<NodeId, IdentifierError> {
    Ok(match id_type {
        IdType::Instance => NodeId::Instance(input.parse()?),
        IdType::InstanceSession => NodeId::InstanceSession(input.parse()?),
        IdType::LogicalNode => NodeId::LogicalNode(input.parse()?),
        IdType::LogicalNodeSession => NodeId::LogicalNodeSession(input.parse()?),
    })
}

/// Compare the session parts of two session-scoped identifiers.
///
/// Only meaningful for ids of the same instance; callers check that first.
pub fn session_order<A, B>(a: &A, b: &B) -> Ordering
where
    A: SessionScoped + ?Sized,
    B: SessionScoped + ?Sized,
{
    debug_assert_eq!(
        a.instance_part(),
        b.instance_part(),
        "session order is undefined across instances"
    );
    a.session_part().cmp(b.session_part())
}
