//! Snapshot encoding for storage targets.
//!
//! Sync files pass through cloud folders, mobile document providers and
//! WebDAV servers, and sometimes come back damaged: a leading BOM, trailing
//! NUL padding from an interrupted write, or stray bytes around the JSON
//! object. Decoding strips those before giving up.

use crate::error::{SyncError, SyncResult};
use mindwtr_types::Snapshot;
use serde_json::Value;

/// Characters of the offending text quoted in "not JSON" errors.
const PREVIEW_CHARS: usize = 20;

/// Decodes a snapshot from raw bytes.
///
/// Invalid UTF-8 is rejected rather than replaced, since a decoded
/// snapshot is written back to both sides.
pub fn decode_snapshot(bytes: &[u8]) -> SyncResult<Snapshot> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| SyncError::InvalidSnapshot("sync file is not valid UTF-8".to_string()))?;
    let sanitized = sanitize(text);
    if sanitized.is_empty() {
        return Err(SyncError::InvalidSnapshot("sync file is empty".to_string()));
    }

    let err = match parse_checked(sanitized) {
        Ok(snapshot) => return Ok(snapshot),
        Err(err) => err,
    };

    // Retry on the outermost object if there is anything around it.
    if let (Some(start), Some(end)) = (sanitized.find('{'), sanitized.rfind('}')) {
        if end > start && (start > 0 || end < sanitized.len() - 1) {
            return parse_checked(&sanitized[start..=end]);
        }
    }

    if !sanitized.starts_with('{') {
        let preview: String = sanitized.chars().take(PREVIEW_CHARS).collect();
        return Err(SyncError::InvalidSnapshot(format!(
            "sync file is not JSON (starts with \"{preview}\")"
        )));
    }

    Err(err)
}

/// Encodes a snapshot, pretty-printed with two-space indentation if `pretty`.
pub fn encode_snapshot(snapshot: &Snapshot, pretty: bool) -> SyncResult<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(snapshot)?
    } else {
        serde_json::to_vec(snapshot)?
    };
    Ok(bytes)
}

fn sanitize(text: &str) -> &str {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text).trim();
    text.trim_end_matches('\0').trim()
}

/// Parses JSON text that must carry both a `tasks` and a `projects` key.
fn parse_checked(text: &str) -> SyncResult<Snapshot> {
    let value: Value = serde_json::from_str(text)?;
    let has_collections = value
        .as_object()
        .is_some_and(|obj| is_present(obj.get("tasks")) && is_present(obj.get("projects")));
    if !has_collections {
        return Err(SyncError::InvalidSnapshot("invalid data format".to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

fn is_present(value: Option<&Value>) -> bool {
    value.is_some_and(|v| !v.is_null())
}
