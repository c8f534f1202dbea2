//! Requirement Checklist
//!
//! Before any negotiation begins, the venue works through the rider
//! requirement by requirement and marks each one "can meet" or "cannot
//! meet". The checklist is derived once, when the Acknowledgment is
//! created, from a curated subset of the document's fields; later edits
//! to the rider template do not change an in-flight review.
//!
//! Checklist operations are pure: toggling a row returns a new
//! checklist and touches neither the ledger nor the negotiation status.

#![deny(unsafe_code)]

use rider_types::{
    ChecklistEntry, FieldName, FieldValue, NegotiationError, NegotiationResult, RiderDocument,
};
use serde::{Deserialize, Serialize};

/// One row of the derivation table: which field becomes a checklist
/// entry, and how it reads to a human.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyRow {
    pub field_name: FieldName,
    pub category: String,
    pub label: String,
}

impl PolicyRow {
    pub fn new(
        field_name: impl Into<FieldName>,
        category: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            category: category.into(),
            label: label.into(),
        }
    }
}

/// The configuration table mapping rider fields to checklist rows
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChecklistPolicy {
    rows: Vec<PolicyRow>,
}

impl ChecklistPolicy {
    pub fn new(rows: Vec<PolicyRow>) -> Self {
        Self { rows }
    }

    /// The marketplace's standard review checklist
    pub fn standard() -> Self {
        Self::new(vec![
            PolicyRow::new(
                "sound_system_provided",
                "Technical",
                "Provide a PA / sound system",
            ),
            PolicyRow::new(
                "lighting_rig_provided",
                "Technical",
                "Provide a stage lighting rig",
            ),
            PolicyRow::new("power_supply", "Technical", "Provide the requested power supply"),
            PolicyRow::new(
                "dressing_room_required",
                "Hospitality",
                "Provide a private dressing room",
            ),
            PolicyRow::new(
                "parking_required",
                "Hospitality",
                "Provide parking for load-in",
            ),
            PolicyRow::new("meal_provided", "Hospitality", "Provide a warm meal for the band"),
            PolicyRow::new(
                "accommodation_required",
                "Hospitality",
                "Arrange overnight accommodation",
            ),
        ])
    }

    pub fn rows(&self) -> &[PolicyRow] {
        &self.rows
    }
}

impl Default for ChecklistPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Derive the checklist snapshot for a document.
///
/// Fields absent from the document are skipped, as are boolean fields
/// set to `false`; there is nothing to acknowledge. Choice fields
/// surface with the selected option appended to the label.
pub fn derive_checklist(document: &RiderDocument, policy: &ChecklistPolicy) -> Vec<ChecklistEntry> {
    let mut checklist = Vec::new();

    for row in policy.rows() {
        let Some(value) = document.field(&row.field_name) else {
            continue;
        };
        let requirement_text = match value {
            FieldValue::Bool(false) => continue,
            FieldValue::Bool(true) => row.label.clone(),
            other => format!("{} ({})", row.label, other),
        };
        checklist.push(ChecklistEntry::new(
            row.category.clone(),
            row.field_name.clone(),
            requirement_text,
        ));
    }

    checklist
}

/// Toggle whether the venue can meet one requirement. Pure: returns a
/// new checklist and also marks the row as acknowledged, since deciding
/// either way is working through it.
pub fn toggle_can_meet(
    checklist: &[ChecklistEntry],
    field_name: &FieldName,
    can_meet: bool,
) -> NegotiationResult<Vec<ChecklistEntry>> {
    let mut updated = checklist.to_vec();
    let entry = updated
        .iter_mut()
        .find(|e| &e.field_name == field_name)
        .ok_or_else(|| {
            NegotiationError::NotFound(format!("checklist row '{}'", field_name))
        })?;

    entry.can_meet = can_meet;
    entry.acknowledged_by_user = true;
    Ok(updated)
}

/// Check that a checklist is ready for the acknowledge-as-is path.
///
/// Fails with `IncompleteAcknowledgment` if any row was never worked
/// through, and with `MissingNotes` if a requirement cannot be met and
/// the venue attached no explanation.
pub fn validate_for_acknowledge(
    checklist: &[ChecklistEntry],
    notes: Option<&str>,
) -> NegotiationResult<()> {
    if let Some(entry) = checklist.iter().find(|e| !e.acknowledged_by_user) {
        return Err(NegotiationError::IncompleteAcknowledgment {
            field_name: entry.field_name.to_string(),
        });
    }

    let any_unmet = checklist.iter().any(|e| !e.can_meet);
    let notes_blank = notes.map_or(true, |n| n.trim().is_empty());
    if any_unmet && notes_blank {
        return Err(NegotiationError::MissingNotes);
    }

    Ok(())
}
