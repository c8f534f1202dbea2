//! The negotiation operations exposed to the marketplace

use crate::{
    AcknowledgmentStore, BookingCalendar, CommitOutcome, ContractGenerator, FinalizedSink,
    NotificationDispatcher, StatusNotification,
};
use rider_checklist::{derive_checklist, ChecklistPolicy};
use rider_document::DocumentStore;
use rider_negotiation::{apply, NegotiationAction};
use rider_types::{
    Acknowledgment, AcknowledgmentId, BookingId, ChecklistEntry, FieldName, FieldValue,
    ModificationEntry, NegotiationError, NegotiationEvent, NegotiationResult, PartyRole,
    RiderDocumentId, RiderFinalized, UserId,
};
use std::sync::Arc;

/// How often a mutation retries after losing an optimistic-lock race
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// The application-facing entry point for rider negotiations.
///
/// One instance serves every acknowledgment; instances of the protocol
/// are fully independent and may be driven from any number of threads.
pub struct NegotiationService {
    store: Arc<dyn AcknowledgmentStore>,
    documents: Arc<DocumentStore>,
    policy: ChecklistPolicy,
    dispatcher: Arc<dyn NotificationDispatcher>,
    calendar: Arc<dyn BookingCalendar>,
    contracts: Arc<dyn ContractGenerator>,
    finalized_sink: Arc<dyn FinalizedSink>,
}

impl NegotiationService {
    pub fn new(
        store: Arc<dyn AcknowledgmentStore>,
        documents: Arc<DocumentStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        calendar: Arc<dyn BookingCalendar>,
        contracts: Arc<dyn ContractGenerator>,
        finalized_sink: Arc<dyn FinalizedSink>,
    ) -> Self {
        Self {
            store,
            documents,
            policy: ChecklistPolicy::standard(),
            dispatcher,
            calendar,
            contracts,
            finalized_sink,
        }
    }

    /// Override the checklist derivation table
    pub fn with_policy(mut self, policy: ChecklistPolicy) -> Self {
        self.policy = policy;
        self
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Create the negotiation instance for a booking entering rider
    /// review, snapshotting the checklist from the rider's latest
    /// published version.
    pub fn open_review(
        &self,
        booking_id: BookingId,
        rider_document_id: &RiderDocumentId,
        venue_user_id: UserId,
    ) -> NegotiationResult<Acknowledgment> {
        let document = self.documents.latest_version(rider_document_id)?;
        let checklist = derive_checklist(&document, &self.policy);
        let acknowledgment =
            Acknowledgment::open_review(booking_id, &document, venue_user_id, checklist);

        self.store.insert(acknowledgment.clone())?;

        tracing::info!(
            acknowledgment_id = %acknowledgment.acknowledgment_id,
            booking_id = %acknowledgment.booking_id,
            rider_version = acknowledgment.rider_version,
            "rider review opened"
        );
        Ok(acknowledgment)
    }

    /// Soft-delete a not-yet-finalized review because its booking was
    /// cancelled
    pub fn archive(
        &self,
        acknowledgment_id: &AcknowledgmentId,
        actor: PartyRole,
    ) -> NegotiationResult<Acknowledgment> {
        self.mutate(acknowledgment_id, actor, NegotiationAction::Archive)
    }

    // ── Negotiation actions ──────────────────────────────────────────

    pub fn acknowledge(
        &self,
        acknowledgment_id: &AcknowledgmentId,
        actor: PartyRole,
        checklist: Vec<ChecklistEntry>,
        notes: Option<String>,
    ) -> NegotiationResult<Acknowledgment> {
        self.mutate(
            acknowledgment_id,
            actor,
            NegotiationAction::Acknowledge { checklist, notes },
        )
    }

    pub fn propose_modification(
        &self,
        acknowledgment_id: &AcknowledgmentId,
        actor: PartyRole,
        field_name: FieldName,
        proposed_value: FieldValue,
        reason: impl Into<String>,
        notes: Option<String>,
    ) -> NegotiationResult<Acknowledgment> {
        self.mutate(
            acknowledgment_id,
            actor,
            NegotiationAction::ProposeModification {
                field_name,
                proposed_value,
                reason: reason.into(),
                notes,
            },
        )
    }

    pub fn approve_modifications(
        &self,
        acknowledgment_id: &AcknowledgmentId,
        actor: PartyRole,
        entry_ids: Vec<u64>,
    ) -> NegotiationResult<Acknowledgment> {
        self.mutate(
            acknowledgment_id,
            actor,
            NegotiationAction::ApproveModifications { entry_ids },
        )
    }

    pub fn reject_modifications(
        &self,
        acknowledgment_id: &AcknowledgmentId,
        actor: PartyRole,
        entry_ids: Vec<u64>,
        reason: impl Into<String>,
    ) -> NegotiationResult<Acknowledgment> {
        self.mutate(
            acknowledgment_id,
            actor,
            NegotiationAction::RejectModifications {
                entry_ids,
                reason: reason.into(),
            },
        )
    }

    /// Close out an accepted negotiation and hand off to the contract
    /// and reminder collaborators
    pub fn finalize(
        &self,
        acknowledgment_id: &AcknowledgmentId,
        actor: PartyRole,
    ) -> NegotiationResult<Acknowledgment> {
        self.mutate(acknowledgment_id, actor, NegotiationAction::Finalize)
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn get(&self, acknowledgment_id: &AcknowledgmentId) -> NegotiationResult<Acknowledgment> {
        Ok(self.store.load(acknowledgment_id)?.acknowledgment)
    }

    /// The full audit timeline, in entry order, unfiltered
    pub fn get_timeline(
        &self,
        acknowledgment_id: &AcknowledgmentId,
    ) -> NegotiationResult<Vec<ModificationEntry>> {
        Ok(self.store.load(acknowledgment_id)?.acknowledgment.ledger)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Read–apply–commit with bounded optimistic retries
    fn mutate(
        &self,
        acknowledgment_id: &AcknowledgmentId,
        actor: PartyRole,
        action: NegotiationAction,
    ) -> NegotiationResult<Acknowledgment> {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let record = self.store.load(acknowledgment_id)?;
            let document = self.documents.get_version(
                &record.acknowledgment.rider_document_id,
                record.acknowledgment.rider_version,
            )?;

            let (next, events) =
                apply(&record.acknowledgment, &document, actor, action.clone())?;

            match self.store.commit(record.version, next.clone())? {
                CommitOutcome::Committed => {
                    self.dispatch(&next, events)?;
                    return Ok(next);
                }
                CommitOutcome::Conflict => {
                    tracing::warn!(
                        acknowledgment_id = %acknowledgment_id,
                        attempt,
                        "optimistic lock conflict, retrying"
                    );
                }
            }
        }

        Err(NegotiationError::ConcurrentModification {
            attempts: MAX_COMMIT_ATTEMPTS,
        })
    }

    fn dispatch(
        &self,
        acknowledgment: &Acknowledgment,
        events: Vec<NegotiationEvent>,
    ) -> NegotiationResult<()> {
        for event in events {
            match event {
                NegotiationEvent::StatusChanged {
                    acknowledgment_id,
                    new_status,
                    actor,
                } => {
                    self.dispatcher.status_changed(&StatusNotification {
                        acknowledgment_id,
                        new_status,
                        actor,
                    });
                }
                NegotiationEvent::Finalized { booking_id, .. } => {
                    let event_date = self.calendar.event_date(&booking_id)?;
                    let contract = self.contracts.generate(acknowledgment)?;
                    self.finalized_sink.rider_finalized(&RiderFinalized {
                        booking_id,
                        contract_id: contract.contract_id,
                        event_date,
                        contract_url: contract.url,
                    });
                }
            }
        }
        Ok(())
    }
}
