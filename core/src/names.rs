// Node Name Registry: session-aware display names
//
// One record per instance ever observed. Writes are gated on the instance's
// current session: a strictly newer session replaces the record, an older one
// is ignored. No name history is kept, so lookups for outdated sessions are
// answered with the current name plus a marker.

use crate::identity::{
    session_order, InstanceId, InstanceSessionId, LogicalNodeSessionId, NodeId, SessionScoped,
    DEFAULT_LOGICAL_NODE_PART,
};
use crate::settings::NamingSettings;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

/// What `resolve` returns when no name is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFallback {
    /// Return the configured placeholder string
    Placeholder,
    /// Return `None`
    Absent,
}

#[derive(Debug, Clone)]
struct InstanceSessionRecord {
    current_session: InstanceSessionId,
    display_name: Option<String>,
    /// Logical node part → override; survives session replacement
    logical_node_names: BTreeMap<String, String>,
}

impl InstanceSessionRecord {
    fn new(session: &InstanceSessionId) -> Self {
        Self {
            current_session: session.clone(),
            display_name: None,
            logical_node_names: BTreeMap::new(),
        }
    }

    fn resolve(&self, id: &NodeId, outdated_marker: &str) -> Option<String> {
        let outdated = match id.session_part() {
            Some(session) => match session.cmp(self.current_session.session_part()) {
                Ordering::Equal => false,
                Ordering::Less => true,
                // a session we have not seen yet; nothing is known about it
                Ordering::Greater => return None,
            },
            None => false,
        };

        let name = id
            .logical_node_part()
            .filter(|part| *part != DEFAULT_LOGICAL_NODE_PART)
            .and_then(|part| self.logical_node_names.get(part))
            .or(self.display_name.as_ref())?;

        if outdated {
            Some(format!("{} {}", name, outdated_marker))
        } else {
            Some(name.clone())
        }
    }
}

/// Thread-safe association of display names to node identifiers.
pub struct NodeNameRegistry {
    settings: NamingSettings,
    records: Mutex<HashMap<InstanceId, InstanceSessionRecord>>,
}

impl NodeNameRegistry {
    pub fn new(settings: NamingSettings) -> Self {
        Self {
            settings,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Record that `session` exists without naming it.
    ///
    /// Returns true if `session` is (now) the current session of its instance.
    pub fn observe_session(&self, session: &InstanceSessionId) -> bool {
        let mut records = self.records.lock();
        current_record(&mut records, session).is_some()
    }

    /// Set the display name of `session`.
    ///
    /// Returns false (and changes nothing) if `session` is older than the
    /// instance's current session.
    pub fn associate_display_name(&self, session: &InstanceSessionId, name: impl Into<String>) -> bool {
        let mut records = self.records.lock();
        match current_record(&mut records, session) {
            Some(record) => {
                record.display_name = Some(name.into());
                true
            }
            None => false,
        }
    }

    /// Set (`Some`) or remove (`None`) the override name of a logical node.
    ///
    /// Gated on the logical node's session exactly like
    /// [`associate_display_name`](Self::associate_display_name). The default
    /// logical node is always named after its instance, so overrides for it
    /// are rejected.
    pub fn associate_logical_node_name(&self, id: &LogicalNodeSessionId, name: Option<&str>) -> bool {
        if id.is_default() {
            tracing::debug!("Ignoring name override for default logical node {}", id);
            return false;
        }
        let session = id.instance_session_id();
        let mut records = self.records.lock();
        let Some(record) = current_record(&mut records, &session) else {
            return false;
        };
        let part = id.logical_node_part().to_string();
        match name {
            Some(name) => {
                record.logical_node_names.insert(part, name.to_string());
            }
            None => {
                record.logical_node_names.remove(&part);
            }
        }
        true
    }

    /// Drop all logical node overrides of `instance`
    pub fn clear_logical_node_names(&self, instance: &InstanceId) {
        if let Some(record) = self.records.lock().get_mut(instance) {
            record.logical_node_names.clear();
        }
    }

    /// Resolve the display name of any identifier kind.
    pub fn resolve(&self, id: &NodeId, fallback: NameFallback) -> Option<String> {
        let resolved = {
            let records = self.records.lock();
            records
                .get(&id.instance_id())
                .and_then(|record| record.resolve(id, &self.settings.outdated_session_marker))
        };
        match (resolved, fallback) {
            (Some(name), _) => Some(name),
            (None, NameFallback::Placeholder) => Some(self.settings.unknown_name_placeholder.clone()),
            (None, NameFallback::Absent) => None,
        }
    }

    /// Resolve with the placeholder fallback; convenient for log output
    pub fn display_name_of(&self, id: impl Into<NodeId>) -> String {
        self.resolve(&id.into(), NameFallback::Placeholder)
            .unwrap_or_else(|| self.settings.unknown_name_placeholder.clone())
    }

    pub fn current_session(&self, instance: &InstanceId) -> Option<InstanceSessionId> {
        self.records
            .lock()
            .get(instance)
            .map(|record| record.current_session.clone())
    }

    /// Number of instances ever observed
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Sorted dump of all associations, one instance per line followed by its
    /// logical node overrides.
    pub fn format_all_name_associations(&self) -> String {
        let records = self.records.lock();
        let mut sorted: Vec<&InstanceSessionRecord> = records.values().collect();
        sorted.sort_by(|a, b| a.current_session.cmp(&b.current_session));

        let mut out = String::new();
        for record in sorted {
            let name = record
                .display_name
                .as_deref()
                .unwrap_or(&self.settings.unknown_name_placeholder);
            let _ = writeln!(out, "{} -> \"{}\"", record.current_session, name);
            for (part, name) in &record.logical_node_names {
                let _ = writeln!(out, "  [{}] -> \"{}\"", part, name);
            }
        }
        out
    }
}

impl Default for NodeNameRegistry {
    fn default() -> Self {
        Self::new(NamingSettings::default())
    }
}

/// Fetch the record of `session`'s instance if `session` is current,
/// creating or replacing it as needed.
fn current_record<'a>(
    records: &'a mut HashMap<InstanceId, InstanceSessionRecord>,
    session: &InstanceSessionId,
) -> Option<&'a mut InstanceSessionRecord> {
    let record = records
        .entry(session.instance_id())
        .or_insert_with(|| InstanceSessionRecord::new(session));

    match session_order(session, &record.current_session) {
        Ordering::Greater => {
            tracing::debug!(
                "Session {} supersedes {}; discarding its name",
                session,
                record.current_session
            );
            record.current_session = session.clone();
            record.display_name = None;
            Some(record)
        }
        Ordering::Equal => Some(record),
        Ordering::Less => {
            tracing::debug!(
                "Ignoring name update for outdated session {} (current: {})",
                session,
                record.current_session
            );
            None
        }
    }
}
