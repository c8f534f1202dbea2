//! The modification ledger entry and its lifecycle

use crate::{FieldName, FieldValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two negotiating parties
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Artist,
    Venue,
}

impl PartyRole {
    /// The other side of the negotiation
    pub fn counterpart(&self) -> PartyRole {
        match self {
            PartyRole::Artist => PartyRole::Venue,
            PartyRole::Venue => PartyRole::Artist,
        }
    }
}

impl std::fmt::Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartyRole::Artist => write!(f, "artist"),
            PartyRole::Venue => write!(f, "venue"),
        }
    }
}

/// Lifecycle status of a ledger entry.
///
/// An entry only ever advances `Proposed`/`CounterProposed` into
/// `Approved` or `Rejected`, never backward. `Approved` and `Rejected`
/// are permanent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Proposed,
    CounterProposed,
    Approved,
    Rejected,
}

impl EntryStatus {
    /// Whether this entry still awaits a response from the counterparty
    pub fn is_open(&self) -> bool {
        matches!(self, EntryStatus::Proposed | EntryStatus::CounterProposed)
    }

    /// Whether this entry is permanently resolved
    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntryStatus::Proposed => "proposed",
            EntryStatus::CounterProposed => "counter_proposed",
            EntryStatus::Approved => "approved",
            EntryStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

/// One proposed field-level change in the append-only ledger.
///
/// `original_value` is snapshotted from the referenced document version
/// at proposal time and never recomputed. Resolution bookkeeping
/// (`resolved_at`, `superseded_by`) is written exactly once, when the
/// entry leaves an open status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModificationEntry {
    /// Sequence number, strictly increasing within an Acknowledgment
    pub entry_id: u64,
    /// The field this proposal targets
    pub field_name: FieldName,
    /// The document's value at proposal time
    pub original_value: FieldValue,
    /// The value being proposed instead
    pub proposed_value: FieldValue,
    /// Why the change is requested
    pub reason: String,
    /// Optional free-text context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Which party authored the proposal
    pub proposed_by: PartyRole,
    /// Current lifecycle status
    pub status: EntryStatus,
    /// When the proposal was appended
    pub created_at: DateTime<Utc>,
    /// When the entry left an open status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    /// The counter-proposal that displaced this entry, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<u64>,
}

impl ModificationEntry {
    /// Create a fresh proposal entry
    pub fn proposed(
        entry_id: u64,
        field_name: FieldName,
        original_value: FieldValue,
        proposed_value: FieldValue,
        reason: impl Into<String>,
        proposed_by: PartyRole,
    ) -> Self {
        Self {
            entry_id,
            field_name,
            original_value,
            proposed_value,
            reason: reason.into(),
            notes: None,
            proposed_by,
            status: EntryStatus::Proposed,
            created_at: Utc::now(),
            resolved_at: None,
            superseded_by: None,
        }
    }

    /// Create a counter-proposal entry (supersedes an open entry on the
    /// same field)
    pub fn counter_proposed(
        entry_id: u64,
        field_name: FieldName,
        original_value: FieldValue,
        proposed_value: FieldValue,
        reason: impl Into<String>,
        proposed_by: PartyRole,
    ) -> Self {
        Self {
            status: EntryStatus::CounterProposed,
            ..Self::proposed(
                entry_id,
                field_name,
                original_value,
                proposed_value,
                reason,
                proposed_by,
            )
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether this entry still awaits a response
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Resolve this entry as approved. Caller must have checked it is open.
    pub fn approve(&mut self, at: DateTime<Utc>) {
        debug_assert!(self.is_open());
        self.status = EntryStatus::Approved;
        self.resolved_at = Some(at);
    }

    /// Resolve this entry as rejected. Caller must have checked it is open.
    pub fn reject(&mut self, at: DateTime<Utc>) {
        debug_assert!(self.is_open());
        self.status = EntryStatus::Rejected;
        self.resolved_at = Some(at);
    }

    /// Resolve this entry as rejected because a counter-proposal
    /// displaced it
    pub fn supersede(&mut self, by_entry_id: u64, at: DateTime<Utc>) {
        debug_assert!(self.is_open());
        self.status = EntryStatus::Rejected;
        self.resolved_at = Some(at);
        self.superseded_by = Some(by_entry_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ModificationEntry {
        ModificationEntry::proposed(
            1,
            FieldName::new("parking_required"),
            FieldValue::Bool(true),
            FieldValue::Bool(false),
            "no parking on site",
            PartyRole::Venue,
        )
    }

    #[test]
    fn test_counterpart() {
        assert_eq!(PartyRole::Artist.counterpart(), PartyRole::Venue);
        assert_eq!(PartyRole::Venue.counterpart(), PartyRole::Artist);
    }

    #[test]
    fn test_open_and_terminal() {
        assert!(EntryStatus::Proposed.is_open());
        assert!(EntryStatus::CounterProposed.is_open());
        assert!(EntryStatus::Approved.is_terminal());
        assert!(EntryStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_approve_sets_resolution() {
        let mut e = entry();
        assert!(e.is_open());

        let at = Utc::now();
        e.approve(at);
        assert_eq!(e.status, EntryStatus::Approved);
        assert_eq!(e.resolved_at, Some(at));
        assert!(e.superseded_by.is_none());
    }

    #[test]
    fn test_supersede_records_displacing_entry() {
        let mut e = entry();
        e.supersede(2, Utc::now());
        assert_eq!(e.status, EntryStatus::Rejected);
        assert_eq!(e.superseded_by, Some(2));
    }

    #[test]
    fn test_counter_proposed_constructor() {
        let e = ModificationEntry::counter_proposed(
            2,
            FieldName::new("parking_required"),
            FieldValue::Bool(true),
            FieldValue::Bool(true),
            "street parking is reserved for load-in",
            PartyRole::Artist,
        );
        assert_eq!(e.status, EntryStatus::CounterProposed);
        assert!(e.is_open());
    }
}
