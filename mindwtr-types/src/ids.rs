//! Record identifiers.
//!
//! Ids are opaque strings so snapshots written by any client stay readable.
//! Records created here get a random UUID v4.

use uuid::Uuid;

/// Generates a fresh record id.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns true if `id` can key a record: non-empty and not just whitespace.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    !id.trim().is_empty()
}
