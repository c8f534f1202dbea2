//! Actions a party can take on a negotiation

use rider_types::{ActionKind, ChecklistEntry, FieldName, FieldValue};
use serde::{Deserialize, Serialize};

/// What a party wants to do. Paired with the acting [`PartyRole`] when
/// passed to [`apply`](crate::apply).
///
/// [`PartyRole`]: rider_types::PartyRole
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NegotiationAction {
    /// Accept the rider as-is, submitting the worked-through checklist
    Acknowledge {
        checklist: Vec<ChecklistEntry>,
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    /// Propose a change to one field, or counter an open proposal on it
    ProposeModification {
        field_name: FieldName,
        proposed_value: FieldValue,
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    /// Approve open entries authored by the counterparty
    ApproveModifications { entry_ids: Vec<u64> },
    /// Reject open entries authored by the counterparty
    RejectModifications { entry_ids: Vec<u64>, reason: String },
    /// Close out a fully-accepted negotiation
    Finalize,
    /// Soft-delete the review because the booking was cancelled
    Archive,
}

impl NegotiationAction {
    /// The kind carried inside errors and logs
    pub fn kind(&self) -> ActionKind {
        match self {
            NegotiationAction::Acknowledge { .. } => ActionKind::Acknowledge,
            NegotiationAction::ProposeModification { .. } => ActionKind::ProposeModification,
            NegotiationAction::ApproveModifications { .. } => ActionKind::ApproveModifications,
            NegotiationAction::RejectModifications { .. } => ActionKind::RejectModifications,
            NegotiationAction::Finalize => ActionKind::Finalize,
            NegotiationAction::Archive => ActionKind::Archive,
        }
    }
}
