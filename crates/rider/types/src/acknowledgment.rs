//! The Acknowledgment aggregate: one negotiation instance

use crate::{
    AcknowledgmentId, BookingId, ChecklistEntry, FieldName, ModificationEntry, RiderDocument,
    RiderDocumentId, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a negotiation instance.
///
/// Always a pure function of the ledger's entries plus the checklist
/// acknowledgment bookkeeping; callers never assign it directly; the
/// negotiation state machine derives it after every applied action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStatus {
    /// Created, venue has not yet responded
    Pending,
    /// Venue accepted the rider as-is (may still open the ledger later)
    Acknowledged,
    /// At least one proposal awaits a response
    ModificationsProposed,
    /// Every proposal resolved, last resolution was an approval
    Accepted,
    /// Negotiation ended with a rejection
    Rejected,
}

impl NegotiationStatus {
    /// Whether no further ledger activity is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, NegotiationStatus::Accepted | NegotiationStatus::Rejected)
    }
}

impl std::fmt::Display for NegotiationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NegotiationStatus::Pending => "pending",
            NegotiationStatus::Acknowledged => "acknowledged",
            NegotiationStatus::ModificationsProposed => "modifications_proposed",
            NegotiationStatus::Accepted => "accepted",
            NegotiationStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

/// One negotiation instance tying a rider snapshot to a booking and its
/// two parties.
///
/// Owned exclusively by its booking: created when the booking reaches
/// rider review, archived (soft delete) only if the booking is cancelled
/// before finalization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub acknowledgment_id: AcknowledgmentId,
    pub booking_id: BookingId,
    /// The referenced rider document
    pub rider_document_id: RiderDocumentId,
    /// The immutable document version under negotiation
    pub rider_version: u32,
    pub artist_user_id: UserId,
    pub venue_user_id: UserId,
    /// Derived status, written only by the negotiation state machine
    pub status: NegotiationStatus,
    /// Checklist snapshot taken at creation time
    pub checklist: Vec<ChecklistEntry>,
    /// The append-only modification ledger, in `entry_id` order
    pub ledger: Vec<ModificationEntry>,
    /// Venue notes attached when acknowledging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the venue acknowledged as-is (retained even after later
    /// proposals)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
    /// Soft-delete marker set when the booking is cancelled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Acknowledgment {
    /// Create a fresh negotiation instance for a booking entering rider
    /// review. The checklist is the snapshot derived from `document`.
    pub fn open_review(
        booking_id: BookingId,
        document: &RiderDocument,
        venue_user_id: UserId,
        checklist: Vec<ChecklistEntry>,
    ) -> Self {
        Self {
            acknowledgment_id: AcknowledgmentId::generate(),
            booking_id,
            rider_document_id: document.document_id.clone(),
            rider_version: document.version,
            artist_user_id: document.owner_id.clone(),
            venue_user_id,
            status: NegotiationStatus::Pending,
            checklist,
            ledger: Vec::new(),
            notes: None,
            acknowledged_at: None,
            finalized_at: None,
            archived_at: None,
        }
    }

    // ── Ledger queries ───────────────────────────────────────────────

    /// All entries still awaiting a response
    pub fn open_entries(&self) -> Vec<&ModificationEntry> {
        self.ledger.iter().filter(|e| e.is_open()).collect()
    }

    /// The open entry for a field, if one exists. The ledger invariant
    /// guarantees at most one.
    pub fn open_entry_for(&self, field_name: &FieldName) -> Option<&ModificationEntry> {
        self.ledger
            .iter()
            .find(|e| e.is_open() && &e.field_name == field_name)
    }

    /// Look up an entry by its sequence number
    pub fn entry(&self, entry_id: u64) -> Option<&ModificationEntry> {
        self.ledger.iter().find(|e| e.entry_id == entry_id)
    }

    /// The sequence number the next appended entry receives
    pub fn next_entry_id(&self) -> u64 {
        self.ledger.len() as u64 + 1
    }

    /// The full audit timeline: every entry, in `entry_id` order,
    /// unfiltered
    pub fn timeline(&self) -> &[ModificationEntry] {
        &self.ledger
    }

    // ── Lifecycle queries ────────────────────────────────────────────

    pub fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntryStatus, FieldValue, PartyRole};
    use std::collections::BTreeMap;

    fn document() -> RiderDocument {
        let mut fields = BTreeMap::new();
        fields.insert(FieldName::new("parking_required"), FieldValue::Bool(true));
        RiderDocument {
            document_id: RiderDocumentId::new("doc-1"),
            owner_id: UserId::new("artist-1"),
            version: 3,
            fields,
            published_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_review_snapshots_document_reference() {
        let ack = Acknowledgment::open_review(
            BookingId::new("booking-1"),
            &document(),
            UserId::new("venue-1"),
            vec![],
        );
        assert_eq!(ack.status, NegotiationStatus::Pending);
        assert_eq!(ack.rider_version, 3);
        assert_eq!(ack.artist_user_id, UserId::new("artist-1"));
        assert!(ack.ledger.is_empty());
        assert!(!ack.is_finalized());
        assert!(!ack.is_archived());
    }

    #[test]
    fn test_open_entry_lookup() {
        let mut ack = Acknowledgment::open_review(
            BookingId::new("booking-1"),
            &document(),
            UserId::new("venue-1"),
            vec![],
        );
        ack.ledger.push(ModificationEntry::proposed(
            1,
            FieldName::new("parking_required"),
            FieldValue::Bool(true),
            FieldValue::Bool(false),
            "no lot",
            PartyRole::Venue,
        ));

        assert_eq!(ack.open_entries().len(), 1);
        assert!(ack
            .open_entry_for(&FieldName::new("parking_required"))
            .is_some());
        assert!(ack.open_entry_for(&FieldName::new("set_count")).is_none());
        assert_eq!(ack.next_entry_id(), 2);

        ack.ledger[0].status = EntryStatus::Approved;
        assert!(ack
            .open_entry_for(&FieldName::new("parking_required"))
            .is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(NegotiationStatus::Accepted.is_terminal());
        assert!(NegotiationStatus::Rejected.is_terminal());
        assert!(!NegotiationStatus::Acknowledged.is_terminal());
        assert!(!NegotiationStatus::ModificationsProposed.is_terminal());
    }
}
