//! Rider Negotiation Domain Types for Encore
//!
//! A rider is the structured document of an artist's performance
//! requirements (technical, hospitality, financial). When a booking
//! reaches rider review, the venue and the artist negotiate field-level
//! changes until both sides agree.
//!
//! # Key Concepts
//!
//! - **RiderDocument**: An immutable-per-version document of typed
//!   fields. Edits never happen in place; they produce a new version.
//! - **ChecklistEntry**: A per-requirement acknowledgment row the venue
//!   works through before negotiating: "can meet" / "cannot meet".
//! - **ModificationEntry**: One proposed field change in the append-only
//!   ledger, with its full lifecycle recorded on the entry itself.
//! - **Acknowledgment**: The negotiation instance tying a rider snapshot
//!   to a booking and its two parties. Its status is always derived from
//!   the ledger, never assigned by a caller.
//!
//! # Design Principles
//!
//! 1. The ledger is append-only. Entries advance status forward and are
//!    never edited or deleted; the unfiltered timeline is the audit trail.
//! 2. At most one entry per field is open at any time. A counter-proposal
//!    supersedes the open entry, it does not replace it.
//! 3. Original values are snapshotted at proposal time and never
//!    recomputed, so the audit trail stays meaningful even after the
//!    artist edits the live template.

#![deny(unsafe_code)]

mod acknowledgment;
mod checklist;
mod document;
mod entry;
mod errors;
mod events;
mod field;
mod ids;

pub use acknowledgment::*;
pub use checklist::*;
pub use document::*;
pub use entry::*;
pub use errors::*;
pub use events::*;
pub use field::*;
pub use ids::*;
