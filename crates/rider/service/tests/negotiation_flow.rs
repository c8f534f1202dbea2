//! End-to-end negotiation flows driven through the service layer

use chrono::{DateTime, Duration, Utc};
use rider_checklist::toggle_can_meet;
use rider_document::DocumentStore;
use rider_service::{
    BookingCalendar, ContractGenerator, ContractHandle, FinalizedSink,
    InMemoryAcknowledgmentStore, NegotiationService, NotificationDispatcher, StatusNotification,
};
use rider_types::{
    Acknowledgment, BookingId, ContractId, EntryStatus, FieldName, FieldValue, NegotiationError,
    NegotiationResult, NegotiationStatus, PartyRole, RiderDocumentId, RiderFinalized, UserId,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

struct FixedCalendar(DateTime<Utc>);

impl BookingCalendar for FixedCalendar {
    fn event_date(&self, _booking_id: &BookingId) -> NegotiationResult<DateTime<Utc>> {
        Ok(self.0)
    }
}

struct StubContracts;

impl ContractGenerator for StubContracts {
    fn generate(&self, acknowledgment: &Acknowledgment) -> NegotiationResult<ContractHandle> {
        Ok(ContractHandle {
            contract_id: ContractId::new(format!("contract-{}", acknowledgment.booking_id)),
            url: format!("https://contracts.test/{}", acknowledgment.booking_id),
        })
    }
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<RiderFinalized>>);

impl FinalizedSink for RecordingSink {
    fn rider_finalized(&self, event: &RiderFinalized) {
        self.0.lock().unwrap().push(event.clone());
    }
}

#[derive(Default)]
struct RecordingDispatcher(Mutex<Vec<StatusNotification>>);

impl NotificationDispatcher for RecordingDispatcher {
    fn status_changed(&self, notification: &StatusNotification) {
        self.0.lock().unwrap().push(notification.clone());
    }
}

fn rider_fields() -> BTreeMap<FieldName, FieldValue> {
    let mut fields = BTreeMap::new();
    fields.insert(
        FieldName::new("performance_duration_minutes"),
        FieldValue::Integer(75),
    );
    fields.insert(
        FieldName::new("performance_fee"),
        FieldValue::Decimal(Decimal::from_str("1200.00").unwrap()),
    );
    fields.insert(
        FieldName::new("dressing_room_required"),
        FieldValue::Bool(true),
    );
    fields.insert(FieldName::new("parking_required"), FieldValue::Bool(true));
    fields.insert(FieldName::new("meal_provided"), FieldValue::Bool(true));
    fields
}

struct Harness {
    service: Arc<NegotiationService>,
    sink: Arc<RecordingSink>,
    rider: RiderDocumentId,
}

fn harness() -> Harness {
    let documents = Arc::new(DocumentStore::new());
    let rider = documents
        .publish(UserId::new("artist-1"), rider_fields())
        .unwrap()
        .document_id;

    let sink = Arc::new(RecordingSink::default());
    let service = Arc::new(NegotiationService::new(
        Arc::new(InMemoryAcknowledgmentStore::new()),
        documents,
        Arc::new(RecordingDispatcher::default()),
        Arc::new(FixedCalendar(Utc::now() + Duration::days(21))),
        Arc::new(StubContracts),
        sink.clone(),
    ));

    Harness {
        service,
        sink,
        rider,
    }
}

fn open(harness: &Harness, booking: &str) -> Acknowledgment {
    harness
        .service
        .open_review(
            BookingId::new(booking),
            &harness.rider,
            UserId::new("venue-1"),
        )
        .unwrap()
}

#[test]
fn venue_proposal_opens_negotiation() {
    let h = harness();
    let ack = open(&h, "booking-a");

    let updated = h
        .service
        .propose_modification(
            &ack.acknowledgment_id,
            PartyRole::Venue,
            FieldName::new("dressing_room_required"),
            FieldValue::Bool(false),
            "no space",
            None,
        )
        .unwrap();

    assert_eq!(updated.status, NegotiationStatus::ModificationsProposed);
    assert_eq!(updated.ledger.len(), 1);
    assert_eq!(updated.ledger[0].status, EntryStatus::Proposed);
}

#[test]
fn artist_approval_accepts_when_nothing_stays_open() {
    let h = harness();
    let ack = open(&h, "booking-b");
    let id = ack.acknowledgment_id.clone();

    h.service
        .propose_modification(
            &id,
            PartyRole::Venue,
            FieldName::new("dressing_room_required"),
            FieldValue::Bool(false),
            "no space",
            None,
        )
        .unwrap();
    let updated = h
        .service
        .approve_modifications(&id, PartyRole::Artist, vec![1])
        .unwrap();

    assert_eq!(updated.ledger[0].status, EntryStatus::Approved);
    assert_eq!(updated.status, NegotiationStatus::Accepted);
}

#[test]
fn counter_proposal_supersedes_on_the_same_field() {
    let h = harness();
    let ack = open(&h, "booking-c");
    let id = ack.acknowledgment_id.clone();

    h.service
        .propose_modification(
            &id,
            PartyRole::Venue,
            FieldName::new("parking_required"),
            FieldValue::Bool(false),
            "no lot",
            None,
        )
        .unwrap();
    let updated = h
        .service
        .propose_modification(
            &id,
            PartyRole::Artist,
            FieldName::new("parking_required"),
            FieldValue::Bool(true),
            "the van carries the backline",
            None,
        )
        .unwrap();

    assert_eq!(updated.ledger.len(), 2);
    assert_eq!(updated.ledger[0].status, EntryStatus::Rejected);
    assert_eq!(updated.ledger[0].superseded_by, Some(2));
    assert_eq!(updated.ledger[1].status, EntryStatus::CounterProposed);
    assert_eq!(updated.open_entries().len(), 1);
}

#[test]
fn self_approval_changes_nothing() {
    let h = harness();
    let ack = open(&h, "booking-d");
    let id = ack.acknowledgment_id.clone();

    h.service
        .propose_modification(
            &id,
            PartyRole::Venue,
            FieldName::new("parking_required"),
            FieldValue::Bool(false),
            "no lot",
            None,
        )
        .unwrap();

    let err = h
        .service
        .approve_modifications(&id, PartyRole::Venue, vec![1])
        .unwrap_err();
    assert!(matches!(err, NegotiationError::InvalidActor { .. }));

    let current = h.service.get(&id).unwrap();
    assert_eq!(current.status, NegotiationStatus::ModificationsProposed);
    assert_eq!(current.ledger[0].status, EntryStatus::Proposed);
}

#[test]
fn concurrent_disjoint_proposals_both_land() {
    let h = harness();
    let ack = open(&h, "booking-e");
    let id = ack.acknowledgment_id.clone();

    std::thread::scope(|scope| {
        let service = h.service.clone();
        let venue_id = id.clone();
        let venue = scope.spawn(move || {
            service.propose_modification(
                &venue_id,
                PartyRole::Venue,
                FieldName::new("parking_required"),
                FieldValue::Bool(false),
                "no lot",
                None,
            )
        });

        let service = h.service.clone();
        let meal_id = id.clone();
        let venue_second = scope.spawn(move || {
            service.propose_modification(
                &meal_id,
                PartyRole::Venue,
                FieldName::new("meal_provided"),
                FieldValue::Bool(false),
                "kitchen closes early",
                None,
            )
        });

        venue.join().unwrap().unwrap();
        venue_second.join().unwrap().unwrap();
    });

    let timeline = h.service.get_timeline(&id).unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].entry_id, 1);
    assert_eq!(timeline[1].entry_id, 2);

    let fields: Vec<&str> = timeline.iter().map(|e| e.field_name.as_str()).collect();
    assert!(fields.contains(&"parking_required"));
    assert!(fields.contains(&"meal_provided"));
}

#[test]
fn acknowledge_as_is_then_negotiate_later() {
    let h = harness();
    let ack = open(&h, "booking-f");
    let id = ack.acknowledgment_id.clone();

    let mut checklist = ack.checklist.clone();
    let fields: Vec<FieldName> = checklist.iter().map(|e| e.field_name.clone()).collect();
    for field in &fields {
        checklist = toggle_can_meet(&checklist, field, true).unwrap();
    }

    let acknowledged = h
        .service
        .acknowledge(&id, PartyRole::Venue, checklist, None)
        .unwrap();
    assert_eq!(acknowledged.status, NegotiationStatus::Acknowledged);

    // The venue may still open the ledger afterwards.
    let reopened = h
        .service
        .propose_modification(
            &id,
            PartyRole::Venue,
            FieldName::new("meal_provided"),
            FieldValue::Bool(false),
            "kitchen renovation",
            None,
        )
        .unwrap();
    assert_eq!(reopened.status, NegotiationStatus::ModificationsProposed);
    assert_eq!(reopened.acknowledged_at, acknowledged.acknowledged_at);
}

#[test]
fn finalize_hands_off_once() {
    let h = harness();
    let ack = open(&h, "booking-g");
    let id = ack.acknowledgment_id.clone();

    h.service
        .propose_modification(
            &id,
            PartyRole::Venue,
            FieldName::new("parking_required"),
            FieldValue::Bool(false),
            "no lot",
            None,
        )
        .unwrap();
    h.service
        .approve_modifications(&id, PartyRole::Artist, vec![1])
        .unwrap();
    h.service.finalize(&id, PartyRole::Venue).unwrap();

    let err = h.service.finalize(&id, PartyRole::Venue).unwrap_err();
    assert!(matches!(err, NegotiationError::IllegalTransition { .. }));

    let finalizations = h.sink.0.lock().unwrap();
    assert_eq!(finalizations.len(), 1);
    assert_eq!(
        finalizations[0].contract_url,
        "https://contracts.test/booking-g"
    );
}

#[test]
fn rejecting_every_open_entry_ends_the_negotiation() {
    let h = harness();
    let ack = open(&h, "booking-h");
    let id = ack.acknowledgment_id.clone();

    h.service
        .propose_modification(
            &id,
            PartyRole::Venue,
            FieldName::new("parking_required"),
            FieldValue::Bool(false),
            "no lot",
            None,
        )
        .unwrap();
    h.service
        .propose_modification(
            &id,
            PartyRole::Venue,
            FieldName::new("meal_provided"),
            FieldValue::Bool(false),
            "kitchen closes early",
            None,
        )
        .unwrap();

    let rejected = h
        .service
        .reject_modifications(
            &id,
            PartyRole::Artist,
            vec![1, 2],
            "the hospitality terms are part of the quoted fee",
        )
        .unwrap();

    assert_eq!(rejected.status, NegotiationStatus::Rejected);
    assert!(rejected.open_entries().is_empty());

    // Terminal: nothing more to propose.
    let err = h
        .service
        .propose_modification(
            &id,
            PartyRole::Venue,
            FieldName::new("parking_required"),
            FieldValue::Bool(true),
            "second thoughts",
            None,
        )
        .unwrap_err();
    assert!(matches!(err, NegotiationError::IllegalTransition { .. }));
}
