//! Immutable rider document versions

use crate::{FieldName, FieldValue, RiderDocumentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One published version of an artist's rider.
///
/// Versions are immutable: once an Acknowledgment references a version,
/// edits to the rider produce `version + 1` and the referenced snapshot
/// stays untouched. This is what keeps every ledger entry's
/// `original_value` meaningful forever.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiderDocument {
    /// Identifier shared by all versions of this rider
    pub document_id: RiderDocumentId,
    /// The artist who owns the rider
    pub owner_id: UserId,
    /// Monotonically increasing version number, starting at 1
    pub version: u32,
    /// The typed requirement fields
    pub fields: BTreeMap<FieldName, FieldValue>,
    /// When this version was published
    pub published_at: DateTime<Utc>,
}

impl RiderDocument {
    /// Look up a field value in this version
    pub fn field(&self, name: &FieldName) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Whether this version declares the given field
    pub fn has_field(&self, name: &FieldName) -> bool {
        self.fields.contains_key(name)
    }
}
