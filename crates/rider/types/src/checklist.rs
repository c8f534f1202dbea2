//! Requirement checklist rows

use crate::FieldName;
use serde::{Deserialize, Serialize};

/// One requirement the venue must acknowledge before negotiating.
///
/// Checklist rows are derived from a curated subset of the rider's
/// fields when the Acknowledgment is created: a snapshot, not a live
/// view of the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    /// Free-form grouping label, e.g. "Technical" or "Hospitality"
    pub category: String,
    /// The rider field this row was derived from
    pub field_name: FieldName,
    /// Human-readable requirement text
    pub requirement_text: String,
    /// Whether the venue can meet this requirement
    pub can_meet: bool,
    /// Whether the venue has worked through this row at all
    pub acknowledged_by_user: bool,
}

impl ChecklistEntry {
    /// Create a fresh, untouched checklist row
    pub fn new(
        category: impl Into<String>,
        field_name: FieldName,
        requirement_text: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            field_name,
            requirement_text: requirement_text.into(),
            can_meet: false,
            acknowledged_by_user: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_starts_untouched() {
        let entry = ChecklistEntry::new(
            "Hospitality",
            FieldName::new("dressing_room_required"),
            "Provide a private dressing room",
        );
        assert!(!entry.can_meet);
        assert!(!entry.acknowledged_by_user);
    }
}
