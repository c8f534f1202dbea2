//! Acknowledgment storage with optimistic locking

use rider_types::{Acknowledgment, AcknowledgmentId, NegotiationError, NegotiationResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// An acknowledgment together with its optimistic-lock version counter
#[derive(Clone, Debug)]
pub struct VersionedAcknowledgment {
    pub acknowledgment: Acknowledgment,
    /// Bumped on every committed write
    pub version: u64,
}

/// Outcome of a compare-and-swap commit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Another writer advanced the version since the caller's read
    Conflict,
}

/// Storage contract for acknowledgments.
///
/// The marketplace's persistence layer implements this over its real
/// database; the negotiation core only needs load plus an atomic
/// conditional write. Different acknowledgments are fully independent;
/// implementations must serialize writers per acknowledgment, nothing
/// wider.
pub trait AcknowledgmentStore: Send + Sync {
    /// Store a freshly created acknowledgment at version 1
    fn insert(&self, acknowledgment: Acknowledgment) -> NegotiationResult<()>;

    /// Load the current state and version counter
    fn load(&self, id: &AcknowledgmentId) -> NegotiationResult<VersionedAcknowledgment>;

    /// Write `acknowledgment` only if the stored version still equals
    /// `expected_version`
    fn commit(
        &self,
        expected_version: u64,
        acknowledgment: Acknowledgment,
    ) -> NegotiationResult<CommitOutcome>;
}

/// In-memory store used by tests and by the application until the
/// persistence layer wraps the trait
pub struct InMemoryAcknowledgmentStore {
    records: RwLock<HashMap<AcknowledgmentId, VersionedAcknowledgment>>,
}

impl InMemoryAcknowledgmentStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryAcknowledgmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AcknowledgmentStore for InMemoryAcknowledgmentStore {
    fn insert(&self, acknowledgment: Acknowledgment) -> NegotiationResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| NegotiationError::LockPoisoned)?;
        let id = acknowledgment.acknowledgment_id.clone();
        if records.contains_key(&id) {
            return Err(NegotiationError::Validation(format!(
                "acknowledgment {} already exists",
                id
            )));
        }
        records.insert(
            id,
            VersionedAcknowledgment {
                acknowledgment,
                version: 1,
            },
        );
        Ok(())
    }

    fn load(&self, id: &AcknowledgmentId) -> NegotiationResult<VersionedAcknowledgment> {
        let records = self
            .records
            .read()
            .map_err(|_| NegotiationError::LockPoisoned)?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| NegotiationError::NotFound(format!("acknowledgment {}", id)))
    }

    fn commit(
        &self,
        expected_version: u64,
        acknowledgment: Acknowledgment,
    ) -> NegotiationResult<CommitOutcome> {
        let mut records = self
            .records
            .write()
            .map_err(|_| NegotiationError::LockPoisoned)?;
        let id = acknowledgment.acknowledgment_id.clone();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| NegotiationError::NotFound(format!("acknowledgment {}", id)))?;

        if record.version != expected_version {
            return Ok(CommitOutcome::Conflict);
        }

        record.acknowledgment = acknowledgment;
        record.version += 1;
        Ok(CommitOutcome::Committed)
    }
}
