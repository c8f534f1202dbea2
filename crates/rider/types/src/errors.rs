//! Error taxonomy for the negotiation core
//!
//! Every variant is recoverable at the caller: the surrounding
//! application surfaces the message and lets the user retry with
//! corrected input or refreshed state. None of these should crash the
//! process.

use crate::{NegotiationStatus, PartyRole};

/// The kind of action that was attempted, carried inside errors so the
/// caller can tell what was refused without parsing messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Acknowledge,
    ProposeModification,
    ApproveModifications,
    RejectModifications,
    Finalize,
    Archive,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActionKind::Acknowledge => "acknowledge",
            ActionKind::ProposeModification => "propose_modification",
            ActionKind::ApproveModifications => "approve_modifications",
            ActionKind::RejectModifications => "reject_modifications",
            ActionKind::Finalize => "finalize",
            ActionKind::Archive => "archive",
        };
        write!(f, "{}", s)
    }
}

/// Errors that can occur across the negotiation core
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("checklist row '{field_name}' has not been acknowledged")]
    IncompleteAcknowledgment { field_name: String },

    #[error("notes are required when a requirement cannot be met")]
    MissingNotes,

    #[error("action '{action}' is not legal while the negotiation is {status}")]
    IllegalTransition {
        action: ActionKind,
        status: NegotiationStatus,
    },

    #[error("the {role} may not perform {action} here")]
    InvalidActor {
        role: PartyRole,
        action: ActionKind,
    },

    #[error("concurrent modification: gave up after {attempts} attempts")]
    ConcurrentModification { attempts: u32 },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("modification entry {0} not found")]
    EntryNotFound(u64),

    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// Result type alias for negotiation operations
pub type NegotiationResult<T> = Result<T, NegotiationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_refused_action() {
        let err = NegotiationError::IllegalTransition {
            action: ActionKind::Finalize,
            status: NegotiationStatus::ModificationsProposed,
        };
        let msg = err.to_string();
        assert!(msg.contains("finalize"));
        assert!(msg.contains("modifications_proposed"));

        let err = NegotiationError::InvalidActor {
            role: PartyRole::Artist,
            action: ActionKind::ApproveModifications,
        };
        assert!(err.to_string().contains("artist"));
    }
}
