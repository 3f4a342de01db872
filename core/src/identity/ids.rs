// Node identifier value types
//
// Canonical string forms:
//   InstanceId            <instance>
//   InstanceSessionId     <instance>::<session>
//   LogicalNodeId         <instance>:<logical>
//   LogicalNodeSessionId  <instance>:<logical>:<session>
//
// Every type keeps its canonical string and slices the parts out of it on
// demand, so equality, hashing and ordering are all defined over that string.

use super::{IdType, IdentifierError};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of the persistent instance part (hex chars)
pub const INSTANCE_PART_LENGTH: usize = 32;
/// Length of the per-run session part (hex chars)
pub const SESSION_PART_LENGTH: usize = 10;
/// Maximum length of a custom logical node part (hex chars)
pub const MAX_LOGICAL_NODE_PART_LENGTH: usize = 32;
/// Logical node part addressing the instance itself
pub const DEFAULT_LOGICAL_NODE_PART: &str = "0";

const SEPARATOR: char = ':';
const SESSION_SEPARATOR: &str = "::";

fn is_lower_hex(part: &str) -> bool {
    part.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn is_instance_part(part: &str) -> bool {
    part.len() == INSTANCE_PART_LENGTH && is_lower_hex(part)
}

fn is_session_part(part: &str) -> bool {
    part.len() == SESSION_PART_LENGTH && is_lower_hex(part)
}

fn is_logical_node_part(part: &str) -> bool {
    !part.is_empty() && part.len() <= MAX_LOGICAL_NODE_PART_LENGTH && is_lower_hex(part)
}

fn malformed(input: &str, expected: IdType) -> IdentifierError {
    IdentifierError::Malformed {
        input: input.to_string(),
        expected,
    }
}

/// Accessors shared by the two session-carrying identifier kinds.
pub trait SessionScoped {
    /// The persistent instance part
    fn instance_part(&self) -> &str;
    /// The session part; lexicographic order equals generation order
    fn session_part(&self) -> &str;

    /// Same instance and same run
    fn is_same_session_as(&self, other: &dyn SessionScoped) -> bool {
        self.instance_part() == other.instance_part() && self.session_part() == other.session_part()
    }
}

// Display/FromStr/serde plumbing is identical for all four kinds.
macro_rules! string_backed_id {
    ($name:ident, $id_type:expr) => {
        impl $name {
            /// The canonical string form
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The [`IdType`] this identifier belongs to
            pub fn id_type(&self) -> IdType {
                $id_type
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdentifierError;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                if Self::is_valid(input) {
                    Ok(Self(input.to_string()))
                } else {
                    Err(malformed(input, $id_type))
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(input: String) -> Result<Self, Self::Error> {
                if Self::is_valid(&input) {
                    Ok(Self(input))
                } else {
                    Err(malformed(&input, $id_type))
                }
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

// ============================================================================
// INSTANCE ID
// ============================================================================

/// Persistent identity of one node installation; survives restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId(String);

string_backed_id!(InstanceId, IdType::Instance);

impl InstanceId {
    /// Generate a new random instance id (128 bits, hex encoded)
    pub fn generate() -> Self {
        let mut bytes = [0u8; INSTANCE_PART_LENGTH / 2];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    fn is_valid(input: &str) -> bool {
        is_instance_part(input)
    }

    /// Address a logical node under this instance
    pub fn logical_node(&self, logical_node_part: &str) -> Result<LogicalNodeId, IdentifierError> {
        format!("{}{}{}", self.0, SEPARATOR, logical_node_part).parse()
    }

    /// The logical node id that addresses the instance itself
    pub fn default_logical_node(&self) -> LogicalNodeId {
        LogicalNodeId(format!("{}{}{}", self.0, SEPARATOR, DEFAULT_LOGICAL_NODE_PART))
    }
}

// ============================================================================
// INSTANCE SESSION ID
// ============================================================================

/// One particular run of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceSessionId(String);

string_backed_id!(InstanceSessionId, IdType::InstanceSession);

impl InstanceSessionId {
    /// Mint a fresh session for `instance`.
    ///
    /// The session part is the current Unix time in seconds (8 hex chars)
    /// followed by one random byte, so later sessions compare greater.
    pub fn new_session(instance: &InstanceId) -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as u32;
        let salt: u8 = rand::random();
        Self(format!(
            "{}{}{:08x}{:02x}",
            instance.0, SESSION_SEPARATOR, secs, salt
        ))
    }

    /// Combine an instance with an already known session part
    pub fn from_parts(instance: &InstanceId, session_part: &str) -> Result<Self, IdentifierError> {
        format!("{}{}{}", instance.0, SESSION_SEPARATOR, session_part).parse()
    }

    fn is_valid(input: &str) -> bool {
        match input.split_once(SESSION_SEPARATOR) {
            Some((instance, session)) => is_instance_part(instance) && is_session_part(session),
            None => false,
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        InstanceId(self.instance_part().to_string())
    }

    /// The session id of the default logical node of this session
    pub fn default_logical_node_session_id(&self) -> LogicalNodeSessionId {
        LogicalNodeSessionId(format!(
            "{}{}{}{}{}",
            self.instance_part(),
            SEPARATOR,
            DEFAULT_LOGICAL_NODE_PART,
            SEPARATOR,
            self.session_part()
        ))
    }

    pub fn is_same_instance_as(&self, other: &InstanceSessionId) -> bool {
        self.instance_part() == other.instance_part()
    }
}

impl SessionScoped for InstanceSessionId {
    fn instance_part(&self) -> &str {
        &self.0[..INSTANCE_PART_LENGTH]
    }

    fn session_part(&self) -> &str {
        &self.0[INSTANCE_PART_LENGTH + SESSION_SEPARATOR.len()..]
    }
}

// ============================================================================
// LOGICAL NODE ID
// ============================================================================

/// A named sub-identity under one instance, independent of sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalNodeId(String);

string_backed_id!(LogicalNodeId, IdType::LogicalNode);

impl LogicalNodeId {
    fn is_valid(input: &str) -> bool {
        match input.split_once(SEPARATOR) {
            Some((instance, logical)) => is_instance_part(instance) && is_logical_node_part(logical),
            None => false,
        }
    }

    pub fn instance_part(&self) -> &str {
        &self.0[..INSTANCE_PART_LENGTH]
    }

    pub fn logical_node_part(&self) -> &str {
        &self.0[INSTANCE_PART_LENGTH + 1..]
    }

    pub fn is_default(&self) -> bool {
        self.logical_node_part() == DEFAULT_LOGICAL_NODE_PART
    }

    pub fn instance_id(&self) -> InstanceId {
        InstanceId(self.instance_part().to_string())
    }

    /// Bind this logical node to a concrete session of its instance.
    pub fn combine_with_session(
        &self,
        session: &InstanceSessionId,
    ) -> Result<LogicalNodeSessionId, IdentifierError> {
        if self.instance_part() != session.instance_part() {
            return Err(IdentifierError::InstanceMismatch(
                self.to_string(),
                session.to_string(),
            ));
        }
        Ok(LogicalNodeSessionId(format!(
            "{}{}{}",
            self.0,
            SEPARATOR,
            session.session_part()
        )))
    }
}

// ============================================================================
// LOGICAL NODE SESSION ID
// ============================================================================

/// A logical node within one particular session of its instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalNodeSessionId(String);

string_backed_id!(LogicalNodeSessionId, IdType::LogicalNodeSession);

impl LogicalNodeSessionId {
    fn is_valid(input: &str) -> bool {
        let mut parts = input.splitn(3, SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(instance), Some(logical), Some(session)) => {
                is_instance_part(instance) && is_logical_node_part(logical) && is_session_part(session)
            }
            _ => false,
        }
    }

    pub fn logical_node_part(&self) -> &str {
        &self.0[INSTANCE_PART_LENGTH + 1..self.0.len() - SESSION_PART_LENGTH - 1]
    }

    pub fn is_default(&self) -> bool {
        self.logical_node_part() == DEFAULT_LOGICAL_NODE_PART
    }

    pub fn instance_id(&self) -> InstanceId {
        InstanceId(self.instance_part().to_string())
    }

    pub fn instance_session_id(&self) -> InstanceSessionId {
        InstanceSessionId(format!(
            "{}{}{}",
            self.instance_part(),
            SESSION_SEPARATOR,
            self.session_part()
        ))
    }

    pub fn logical_node_id(&self) -> LogicalNodeId {
        LogicalNodeId(format!(
            "{}{}{}",
            self.instance_part(),
            SEPARATOR,
            self.logical_node_part()
        ))
    }
}

impl SessionScoped for LogicalNodeSessionId {
    fn instance_part(&self) -> &str {
        &self.0[..INSTANCE_PART_LENGTH]
    }

    fn session_part(&self) -> &str {
        &self.0[self.0.len() - SESSION_PART_LENGTH..]
    }
}
