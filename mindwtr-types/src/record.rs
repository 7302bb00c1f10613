//! Mergeable records: tasks, projects, and their attachments.
//!
//! Every record carries a stable `id`, an `updatedAt` modification time and
//! an optional `deletedAt` tombstone. Fields this crate does not model are
//! kept in `extra` so a snapshot written by a newer client survives a merge
//! unchanged.

use crate::ids::new_id;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Reads `updatedAt`, treating `null` like an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// An identifiable, timestamped, soft-deletable record.
///
/// The merge engine is written against this trait only.
pub trait Record {
    /// Stable identity across devices; never reused.
    fn id(&self) -> &str;

    /// Last local modification, as written by the device that made it.
    fn updated_at(&self) -> &str;

    /// Tombstone time, if the record has been soft-deleted.
    fn deleted_at(&self) -> Option<&str>;

    /// Returns true if the record carries a non-empty tombstone.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some_and(|d| !d.is_empty())
    }

    /// Modification time for comparison; unparsable values are the epoch.
    fn modified_at(&self) -> Timestamp {
        Timestamp::parse_or_epoch(self.updated_at())
    }
}

/// A record that owns a nested attachment list.
pub trait HasAttachments: Record {
    fn attachments(&self) -> &[Attachment];

    /// Replaces the attachment list. An empty list clears the field.
    fn set_attachments(&mut self, attachments: Vec<Attachment>);
}

/// What an attachment points at.
///
/// Kinds written by newer clients are kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    File,
    #[default]
    Link,
    #[serde(untagged)]
    Other(String),
}

/// A file or link hung off a task or project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub kind: AttachmentKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attachment {
    /// Creates a new attachment stamped with the current time.
    pub fn new(kind: AttachmentKind, title: impl Into<String>, uri: impl Into<String>) -> Self {
        let now = Timestamp::now().to_iso_string();
        Self {
            id: new_id(),
            kind,
            title: title.into(),
            uri: uri.into(),
            created_at: Some(now.clone()),
            updated_at: now,
            deleted_at: None,
            extra: Map::new(),
        }
    }
}

/// A single task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Creates a new inbox task stamped with the current time.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Timestamp::now().to_iso_string();
        Self {
            id: new_id(),
            title: title.into(),
            status: "inbox".to_string(),
            project_id: None,
            attachments: None,
            created_at: Some(now.clone()),
            updated_at: now,
            deleted_at: None,
            extra: Map::new(),
        }
    }

    /// Records a local edit.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now().to_iso_string();
    }

    /// Soft-deletes the task. The tombstone and modification time match so
    /// the deletion competes in last-write-wins like any other edit.
    pub fn mark_deleted(&mut self) {
        let now = Timestamp::now().to_iso_string();
        self.deleted_at = Some(now.clone());
        self.updated_at = now;
    }

    /// Clears the tombstone as a fresh edit.
    pub fn restore(&mut self) {
        self.deleted_at = None;
        self.touch();
    }
}

/// A project grouping tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// Creates a new active project stamped with the current time.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Timestamp::now().to_iso_string();
        Self {
            id: new_id(),
            title: title.into(),
            status: "active".to_string(),
            color: None,
            attachments: None,
            created_at: Some(now.clone()),
            updated_at: now,
            deleted_at: None,
            extra: Map::new(),
        }
    }

    /// Soft-deletes the project.
    pub fn mark_deleted(&mut self) {
        let now = Timestamp::now().to_iso_string();
        self.deleted_at = Some(now.clone());
        self.updated_at = now;
    }
}

macro_rules! impl_record {
    ($ty:ty) => {
        impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn updated_at(&self) -> &str {
                &self.updated_at
            }

            fn deleted_at(&self) -> Option<&str> {
                self.deleted_at.as_deref()
            }
        }
    };
}

impl_record!(Attachment);
impl_record!(Task);
impl_record!(Project);

macro_rules! impl_has_attachments {
    ($ty:ty) => {
        impl HasAttachments for $ty {
            fn attachments(&self) -> &[Attachment] {
                self.attachments.as_deref().unwrap_or_default()
            }

            fn set_attachments(&mut self, attachments: Vec<Attachment>) {
                self.attachments = if attachments.is_empty() {
                    None
                } else {
                    Some(attachments)
                };
            }
        }
    };
}

impl_has_attachments!(Task);
impl_has_attachments!(Project);
