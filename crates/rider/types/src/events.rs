//! Domain events emitted by the negotiation state machine

use crate::{AcknowledgmentId, BookingId, ContractId, NegotiationStatus, PartyRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events produced by applying an action. The state machine only
/// describes what happened; dispatching to collaborators is the service
/// layer's job.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NegotiationEvent {
    /// A transition-table row was applied. Emitted for every applied
    /// action, including counter-proposals that keep the status at
    /// `modifications_proposed`; the counterparty still needs to hear
    /// about those.
    StatusChanged {
        acknowledgment_id: AcknowledgmentId,
        new_status: NegotiationStatus,
        actor: PartyRole,
    },
    /// A fully-accepted negotiation was closed out. The service layer
    /// enriches this into [`RiderFinalized`] for the contract and
    /// reminder collaborators.
    Finalized {
        acknowledgment_id: AcknowledgmentId,
        booking_id: BookingId,
    },
}

/// The hand-off event consumed by the reminder scheduler once a
/// negotiation is finalized and its contract generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiderFinalized {
    pub booking_id: BookingId,
    pub contract_id: ContractId,
    /// When the performance takes place
    pub event_date: DateTime<Utc>,
    /// Where the generated contract can be fetched
    pub contract_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_changed_wire_form() {
        let event = NegotiationEvent::StatusChanged {
            acknowledgment_id: AcknowledgmentId::new("ack-1"),
            new_status: NegotiationStatus::ModificationsProposed,
            actor: PartyRole::Venue,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "status_changed");
        assert_eq!(json["new_status"], "modifications_proposed");
        assert_eq!(json["actor"], "venue");
    }
}
