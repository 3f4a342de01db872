//! Topology core settings
//!
//! Everything here is handed to the components at construction time:
//! - Naming: placeholder and outdated-session marker used by name resolution
//! - Routing: verbosity of routing cache diagnostics

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Errors that can occur while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid name placeholder: must not be blank")]
    EmptyPlaceholder,

    #[error("Invalid outdated session marker: must not be blank")]
    EmptyOutdatedMarker,

    #[error("Failed to read settings file")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// NAMING
// ============================================================================

/// Settings for the node name registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingSettings {
    /// Returned by placeholder-policy lookups when no name is known
    pub unknown_name_placeholder: String,

    /// Appended to the current name when an outdated session is resolved
    pub outdated_session_marker: String,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            unknown_name_placeholder: "<unknown>".to_string(),
            outdated_session_marker: "<outdated session>".to_string(),
        }
    }
}

impl NamingSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.unknown_name_placeholder.trim().is_empty() {
            return Err(SettingsError::EmptyPlaceholder);
        }
        if self.outdated_session_marker.trim().is_empty() {
            return Err(SettingsError::EmptyOutdatedMarker);
        }
        Ok(())
    }
}

// ============================================================================
// ROUTING
// ============================================================================

/// Settings for graph assembly and routing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// Log every next-hop cache miss and reachability computation at debug level
    pub verbose_logging: bool,
}

// ============================================================================
// TOPOLOGY SETTINGS
// ============================================================================

/// All settings of the topology core
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologySettings {
    pub naming: NamingSettings,
    pub routing: RoutingSettings,
}

impl TopologySettings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.naming.validate()
    }

    /// Parse and validate settings from JSON; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: TopologySettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// TESTS
// ============================================================================
