//! Rider Negotiation Service
//!
//! The operations the surrounding marketplace calls. Every mutation
//! follows the same discipline: load the acknowledgment and its version
//! counter, run the action through the state machine, and commit with a
//! compare-and-swap. A conflicting writer forces a bounded retry with
//! the now-current state; exhaustion surfaces as a typed error, never a
//! lost update.
//!
//! The service coordinates, it does not execute: notifications,
//! contract generation, booking dates and reminder registration are all
//! behind collaborator traits.

#![deny(unsafe_code)]

mod collaborators;
mod service;
mod store;

pub use collaborators::*;
pub use service::*;
pub use store::*;
