//! Rider Negotiation State Machine
//!
//! All transition logic for a rider review lives in one pure function:
//! [`apply`]. Callers describe what a party wants to do as a
//! [`NegotiationAction`]; `apply` either returns the next state of the
//! Acknowledgment plus the events to dispatch, or a typed error saying
//! exactly why the action was refused. There are no status checks
//! scattered across handlers, so illegal states (finalizing with open
//! entries, approving your own proposal) cannot leak through a UI that
//! forgot one.
//!
//! # Design Principles
//!
//! 1. `apply` never performs side effects. It returns events; the
//!    service layer dispatches them.
//! 2. The ledger drives the status. After every action the status is
//!    re-derived from the ledger and checklist bookkeeping, never
//!    assigned per-branch.
//! 3. Illegal actions fail with a typed error naming the attempted
//!    action and the current status, never a silent no-op.

#![deny(unsafe_code)]

mod action;
mod machine;
mod status;

pub use action::*;
pub use machine::*;
pub use status::*;
