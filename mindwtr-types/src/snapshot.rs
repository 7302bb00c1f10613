//! The full state a device exchanges with its sync target.

use crate::record::{Project, Task};
use crate::timestamp::Timestamp;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of the most recent sync cycle, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Error,
}

/// Device-local preferences.
///
/// The merge engine never looks inside settings; it keeps the local copy
/// wholesale. Only the sync bookkeeping fields are typed, the rest
/// (theme, language, credentials, ...) is carried in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_status: Option<SyncStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_stats: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    /// Stamps a successful sync. Clears any previous error.
    pub fn record_success(&mut self, at: Timestamp, stats: Option<Value>) {
        self.last_sync_at = Some(at.to_iso_string());
        self.last_sync_status = Some(SyncStatus::Success);
        self.last_sync_error = None;
        if stats.is_some() {
            self.last_sync_stats = stats;
        }
    }

    /// Stamps a failed sync. Stats from the last success are left in place.
    pub fn record_failure(&mut self, at: Timestamp, error: impl Into<String>) {
        self.last_sync_at = Some(at.to_iso_string());
        self.last_sync_status = Some(SyncStatus::Error);
        self.last_sync_error = Some(error.into());
    }
}

/// Tasks, projects and device-local settings at a point in time.
///
/// Collection order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub settings: Settings,
}

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes to JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
