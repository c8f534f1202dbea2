//! The single transition entry point

use crate::{derived_status, NegotiationAction};
use chrono::Utc;
use rider_checklist::validate_for_acknowledge;
use rider_types::{
    Acknowledgment, ActionKind, ChecklistEntry, FieldName, FieldValue, ModificationEntry,
    NegotiationError, NegotiationEvent, NegotiationResult, NegotiationStatus, PartyRole,
    RiderDocument,
};
use std::collections::HashSet;

/// Apply one action to a negotiation.
///
/// Pure: on success returns the next Acknowledgment plus the events the
/// caller must dispatch, on failure returns a typed error and the input
/// state stands untouched. `document` must be the immutable version the
/// Acknowledgment references; proposals snapshot their `original_value`
/// from it and validate proposed values against its field kinds.
pub fn apply(
    acknowledgment: &Acknowledgment,
    document: &RiderDocument,
    actor: PartyRole,
    action: NegotiationAction,
) -> NegotiationResult<(Acknowledgment, Vec<NegotiationEvent>)> {
    if document.document_id != acknowledgment.rider_document_id
        || document.version != acknowledgment.rider_version
    {
        return Err(NegotiationError::Validation(format!(
            "expected rider {} version {}, got {} version {}",
            acknowledgment.rider_document_id,
            acknowledgment.rider_version,
            document.document_id,
            document.version
        )));
    }

    if acknowledgment.is_archived() {
        return Err(illegal(&action, acknowledgment));
    }

    let (next, events) = match action {
        NegotiationAction::Acknowledge { checklist, notes } => {
            acknowledge(acknowledgment, actor, checklist, notes)?
        }
        NegotiationAction::ProposeModification {
            field_name,
            proposed_value,
            reason,
            notes,
        } => propose(
            acknowledgment,
            document,
            actor,
            field_name,
            proposed_value,
            reason,
            notes,
        )?,
        NegotiationAction::ApproveModifications { entry_ids } => {
            resolve(acknowledgment, actor, entry_ids, Resolution::Approve)?
        }
        NegotiationAction::RejectModifications { entry_ids, reason } => {
            if reason.trim().is_empty() {
                return Err(NegotiationError::Validation(
                    "a rejection requires a reason".into(),
                ));
            }
            tracing::debug!(
                acknowledgment_id = %acknowledgment.acknowledgment_id,
                reason = %reason,
                "rejection reason recorded"
            );
            resolve(acknowledgment, actor, entry_ids, Resolution::Reject)?
        }
        NegotiationAction::Finalize => finalize(acknowledgment, actor)?,
        NegotiationAction::Archive => archive(acknowledgment)?,
    };

    debug_assert_eq!(next.status, derived_status(&next));
    Ok((next, events))
}

fn illegal(action: &NegotiationAction, acknowledgment: &Acknowledgment) -> NegotiationError {
    NegotiationError::IllegalTransition {
        action: action.kind(),
        status: acknowledgment.status,
    }
}

fn illegal_kind(action: ActionKind, acknowledgment: &Acknowledgment) -> NegotiationError {
    NegotiationError::IllegalTransition {
        action,
        status: acknowledgment.status,
    }
}

// ── Acknowledge as-is ────────────────────────────────────────────────

fn acknowledge(
    acknowledgment: &Acknowledgment,
    actor: PartyRole,
    checklist: Vec<ChecklistEntry>,
    notes: Option<String>,
) -> NegotiationResult<(Acknowledgment, Vec<NegotiationEvent>)> {
    if actor != PartyRole::Venue {
        return Err(NegotiationError::InvalidActor {
            role: actor,
            action: ActionKind::Acknowledge,
        });
    }
    if acknowledgment.status != NegotiationStatus::Pending {
        return Err(illegal_kind(ActionKind::Acknowledge, acknowledgment));
    }

    // The submitted checklist must be the snapshot, worked through,
    // not a different set of rows.
    let snapshot: HashSet<&FieldName> =
        acknowledgment.checklist.iter().map(|e| &e.field_name).collect();
    let submitted: HashSet<&FieldName> = checklist.iter().map(|e| &e.field_name).collect();
    if snapshot != submitted {
        return Err(NegotiationError::Validation(
            "submitted checklist does not match the review's requirement rows".into(),
        ));
    }

    validate_for_acknowledge(&checklist, notes.as_deref())?;

    let mut next = acknowledgment.clone();
    next.checklist = checklist;
    next.notes = notes;
    next.acknowledged_at = Some(Utc::now());
    next.status = derived_status(&next);

    tracing::info!(
        acknowledgment_id = %next.acknowledgment_id,
        "rider acknowledged as-is"
    );

    let events = vec![status_changed(&next, actor)];
    Ok((next, events))
}

// ── Propose / counter-propose ────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn propose(
    acknowledgment: &Acknowledgment,
    document: &RiderDocument,
    actor: PartyRole,
    field_name: FieldName,
    proposed_value: FieldValue,
    reason: String,
    notes: Option<String>,
) -> NegotiationResult<(Acknowledgment, Vec<NegotiationEvent>)> {
    if acknowledgment.status.is_terminal() || acknowledgment.is_finalized() {
        return Err(illegal_kind(ActionKind::ProposeModification, acknowledgment));
    }
    if reason.trim().is_empty() {
        return Err(NegotiationError::Validation(
            "a proposal requires a reason".into(),
        ));
    }

    // The initial proposal opens the negotiation; that is the venue's move.
    if acknowledgment.ledger.is_empty() && actor != PartyRole::Venue {
        return Err(NegotiationError::InvalidActor {
            role: actor,
            action: ActionKind::ProposeModification,
        });
    }

    let original_value = document
        .field(&field_name)
        .cloned()
        .ok_or_else(|| {
            NegotiationError::Validation(format!(
                "rider version {} has no field '{}'",
                document.version, field_name
            ))
        })?;
    if proposed_value.kind() != original_value.kind() {
        return Err(NegotiationError::Validation(format!(
            "field '{}' expects {} but the proposal holds {}",
            field_name,
            original_value.kind(),
            proposed_value.kind()
        )));
    }

    let mut next = acknowledgment.clone();
    let new_id = next.next_entry_id();
    let now = Utc::now();

    match acknowledgment.open_entry_for(&field_name) {
        None => {
            let mut entry = ModificationEntry::proposed(
                new_id,
                field_name.clone(),
                original_value,
                proposed_value,
                reason,
                actor,
            );
            if let Some(notes) = notes {
                entry = entry.with_notes(notes);
            }
            next.ledger.push(entry);
        }
        Some(open) => {
            if open.proposed_by == actor {
                // A party cannot pile a second proposal onto its own
                // open entry; it must wait for the counterparty.
                return Err(illegal_kind(ActionKind::ProposeModification, acknowledgment));
            }
            let open_id = open.entry_id;
            let mut entry = ModificationEntry::counter_proposed(
                new_id,
                field_name.clone(),
                original_value,
                proposed_value,
                reason,
                actor,
            );
            if let Some(notes) = notes {
                entry = entry.with_notes(notes);
            }
            // Atomic supersession: the displaced entry and the
            // counter-proposal land in the same transition.
            if let Some(displaced) = next.ledger.iter_mut().find(|e| e.entry_id == open_id) {
                displaced.supersede(new_id, now);
            }
            next.ledger.push(entry);
        }
    }

    next.status = derived_status(&next);

    tracing::info!(
        acknowledgment_id = %next.acknowledgment_id,
        field = %field_name,
        entry_id = new_id,
        actor = %actor,
        "modification proposed"
    );

    let events = vec![status_changed(&next, actor)];
    Ok((next, events))
}

// ── Approve / reject ─────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
enum Resolution {
    Approve,
    Reject,
}

impl Resolution {
    fn action_kind(self) -> ActionKind {
        match self {
            Resolution::Approve => ActionKind::ApproveModifications,
            Resolution::Reject => ActionKind::RejectModifications,
        }
    }
}

fn resolve(
    acknowledgment: &Acknowledgment,
    actor: PartyRole,
    entry_ids: Vec<u64>,
    resolution: Resolution,
) -> NegotiationResult<(Acknowledgment, Vec<NegotiationEvent>)> {
    let kind = resolution.action_kind();

    if acknowledgment.status != NegotiationStatus::ModificationsProposed {
        return Err(illegal_kind(kind, acknowledgment));
    }
    if entry_ids.is_empty() {
        return Err(NegotiationError::Validation(
            "no modification entries named".into(),
        ));
    }

    // Validate the whole batch before touching anything: resolution is
    // all-or-nothing.
    let mut seen = HashSet::new();
    for &entry_id in &entry_ids {
        let entry = acknowledgment
            .entry(entry_id)
            .ok_or(NegotiationError::EntryNotFound(entry_id))?;
        if !entry.is_open() || !seen.insert(entry_id) {
            return Err(illegal_kind(kind, acknowledgment));
        }
        if entry.proposed_by == actor {
            return Err(NegotiationError::InvalidActor { role: actor, action: kind });
        }
    }

    let mut next = acknowledgment.clone();
    let now = Utc::now();
    for entry in next.ledger.iter_mut().filter(|e| entry_ids.contains(&e.entry_id)) {
        match resolution {
            Resolution::Approve => entry.approve(now),
            Resolution::Reject => entry.reject(now),
        }
    }

    next.status = derived_status(&next);

    tracing::info!(
        acknowledgment_id = %next.acknowledgment_id,
        entries = entry_ids.len(),
        new_status = %next.status,
        actor = %actor,
        "modifications resolved"
    );

    let events = vec![status_changed(&next, actor)];
    Ok((next, events))
}

// ── Finalize / archive ───────────────────────────────────────────────

fn finalize(
    acknowledgment: &Acknowledgment,
    actor: PartyRole,
) -> NegotiationResult<(Acknowledgment, Vec<NegotiationEvent>)> {
    if acknowledgment.status != NegotiationStatus::Accepted || acknowledgment.is_finalized() {
        return Err(illegal_kind(ActionKind::Finalize, acknowledgment));
    }
    debug_assert!(acknowledgment.open_entries().is_empty());

    let mut next = acknowledgment.clone();
    next.finalized_at = Some(Utc::now());

    tracing::info!(
        acknowledgment_id = %next.acknowledgment_id,
        booking_id = %next.booking_id,
        actor = %actor,
        "negotiation finalized"
    );

    let events = vec![NegotiationEvent::Finalized {
        acknowledgment_id: next.acknowledgment_id.clone(),
        booking_id: next.booking_id.clone(),
    }];
    Ok((next, events))
}

fn archive(
    acknowledgment: &Acknowledgment,
) -> NegotiationResult<(Acknowledgment, Vec<NegotiationEvent>)> {
    if acknowledgment.is_finalized() {
        return Err(illegal_kind(ActionKind::Archive, acknowledgment));
    }

    let mut next = acknowledgment.clone();
    next.archived_at = Some(Utc::now());

    tracing::info!(
        acknowledgment_id = %next.acknowledgment_id,
        "review archived with cancelled booking"
    );

    Ok((next, vec![]))
}

fn status_changed(acknowledgment: &Acknowledgment, actor: PartyRole) -> NegotiationEvent {
    NegotiationEvent::StatusChanged {
        acknowledgment_id: acknowledgment.acknowledgment_id.clone(),
        new_status: acknowledgment.status,
        actor,
    }
}
