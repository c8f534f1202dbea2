//! Collaborator contracts: everything the negotiation core hands off

use rider_types::{
    Acknowledgment, AcknowledgmentId, BookingId, ContractId, NegotiationResult, NegotiationStatus,
    PartyRole, RiderFinalized,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload handed to the notification dispatcher on every applied action
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusNotification {
    pub acknowledgment_id: AcknowledgmentId,
    pub new_status: NegotiationStatus,
    pub actor: PartyRole,
}

/// Fire-and-forget notification delivery. The core neither knows nor
/// cares whether this fans out to e-mail, push or both.
pub trait NotificationDispatcher: Send + Sync {
    fn status_changed(&self, notification: &StatusNotification);
}

/// Dispatcher that only leaves a trace in the logs
pub struct LoggingDispatcher;

impl NotificationDispatcher for LoggingDispatcher {
    fn status_changed(&self, notification: &StatusNotification) {
        tracing::info!(
            acknowledgment_id = %notification.acknowledgment_id,
            new_status = %notification.new_status,
            actor = %notification.actor,
            "negotiation status notification"
        );
    }
}

/// Read side of the booking system: when does this booking perform?
pub trait BookingCalendar: Send + Sync {
    fn event_date(&self, booking_id: &BookingId) -> NegotiationResult<DateTime<Utc>>;
}

/// Handle to a generated contract document
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractHandle {
    pub contract_id: ContractId,
    pub url: String,
}

/// Contract generation collaborator, invoked exactly once per
/// finalization
pub trait ContractGenerator: Send + Sync {
    fn generate(&self, acknowledgment: &Acknowledgment) -> NegotiationResult<ContractHandle>;
}

/// Consumer of the finalization hand-off; in production, the reminder
/// scheduler
pub trait FinalizedSink: Send + Sync {
    fn rider_finalized(&self, event: &RiderFinalized);
}

/// Sink that only leaves a trace in the logs
pub struct LoggingFinalizedSink;

impl FinalizedSink for LoggingFinalizedSink {
    fn rider_finalized(&self, event: &RiderFinalized) {
        tracing::info!(
            booking_id = %event.booking_id,
            contract_id = %event.contract_id,
            "rider finalized"
        );
    }
}
