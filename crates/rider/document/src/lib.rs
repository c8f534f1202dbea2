//! Rider Document Versioning
//!
//! Riders are edited by artists and referenced by negotiations. The two
//! must never interfere: once an Acknowledgment references a version,
//! that version is frozen. This crate enforces the discipline: there is
//! no update-in-place operation at all. Publishing creates version 1,
//! every revision appends `version + 1`, and old versions stay readable
//! forever.

#![deny(unsafe_code)]

mod schema;
mod store;

pub use schema::*;
pub use store::*;
