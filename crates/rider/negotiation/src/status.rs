//! Status derivation: the ledger drives the status

use rider_types::{Acknowledgment, EntryStatus, NegotiationStatus};

/// Compute the status an Acknowledgment must be in, given its ledger and
/// checklist bookkeeping.
///
/// - Empty ledger: `Pending`, or `Acknowledged` once the venue accepted
///   as-is.
/// - Any open entry: `ModificationsProposed`.
/// - Non-empty ledger with zero open entries: terminal. The most
///   recently resolved entry that was not displaced by a
///   counter-proposal decides which: an approval ends the negotiation
///   `Accepted`, an outright rejection ends it `Rejected`. Supersession
///   rejections never decide, because the entry that displaced them is
///   by construction resolved later.
///
/// A combination outside this table is a bug in a code path that bypassed
/// [`apply`](crate::apply), and fails loudly rather than being coerced.
pub fn derived_status(acknowledgment: &Acknowledgment) -> NegotiationStatus {
    let ledger = &acknowledgment.ledger;

    if ledger.is_empty() {
        return if acknowledgment.acknowledged_at.is_some() {
            NegotiationStatus::Acknowledged
        } else {
            NegotiationStatus::Pending
        };
    }

    if ledger.iter().any(|e| e.is_open()) {
        return NegotiationStatus::ModificationsProposed;
    }

    let decider = ledger
        .iter()
        .filter(|e| e.superseded_by.is_none())
        .max_by_key(|e| (e.resolved_at, e.entry_id));

    match decider {
        Some(entry) => match entry.status {
            EntryStatus::Approved => NegotiationStatus::Accepted,
            EntryStatus::Rejected => NegotiationStatus::Rejected,
            EntryStatus::Proposed | EntryStatus::CounterProposed => {
                unreachable!("entry {} counted as resolved but is open", entry.entry_id)
            }
        },
        None => unreachable!(
            "acknowledgment {}: fully-resolved ledger without a non-superseded entry",
            acknowledgment.acknowledgment_id
        ),
    }
}
