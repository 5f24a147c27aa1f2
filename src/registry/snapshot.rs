//! Persisted node-list snapshot.
//!
//! Lets a restart skip live discovery: the file lists known hostnames with
//! their operator overrides. A missing file means "discover from scratch".

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{FleetError, NodeOptions};

/// One persisted node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Hostname.
    pub hostname: String,
    /// Operator override for scheduling eligibility.
    #[serde(default = "default_schedulable")]
    pub schedulable: bool,
    /// Fill order; lower first.
    #[serde(default)]
    pub priority: u32,
    /// Withheld capacity.
    #[serde(default)]
    pub reserved: f64,
}

const fn default_schedulable() -> bool {
    true
}

impl SnapshotEntry {
    /// Operator options carried by this entry.
    pub const fn options(&self) -> NodeOptions {
        NodeOptions {
            schedulable: self.schedulable,
            priority: self.priority,
            reserved: self.reserved,
        }
    }
}

/// Ordered list of known nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Nodes in discovery order.
    pub nodes: Vec<SnapshotEntry>,
}

impl FleetSnapshot {
    /// Parse a snapshot from JSON.
    pub fn from_json_str(input: &str) -> Result<Self, FleetError> {
        serde_json::from_str(input).map_err(|e| FleetError::Snapshot(format!("parse error: {e}")))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, FleetError> {
        serde_json::to_string_pretty(self).map_err(|e| FleetError::Snapshot(e.to_string()))
    }

    /// Read a snapshot file. `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, FleetError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| FleetError::Snapshot(format!("read {}: {e}", path.display())))?;
        Self::from_json_str(&data).map(Some)
    }

    /// Write the snapshot to `path`, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<(), FleetError> {
        let data = self.to_json_string()?;
        std::fs::write(path, data)
            .map_err(|e| FleetError::Snapshot(format!("write {}: {e}", path.display())))
    }
}
