//! Event-Date Reminder Scheduling
//!
//! Consumes the finalization hand-off and nudges both parties as the
//! performance approaches. The scheduler runs on its own cadence;
//! whatever drives it (a cron job, a worker loop) simply calls
//! [`ReminderScheduler::run_once`] periodically.
//!
//! Idempotence is bookkeeping, not guesswork: each (contract, offset)
//! pair carries a persisted sent flag, and a reminder is only marked
//! sent after the transport accepted it. Re-running a poll can never
//! double-send; a crashed poll re-offers the reminder next time.
//! Reminder content and delivery channel are none of this crate's
//! business.

#![deny(unsafe_code)]

use chrono::{DateTime, Duration, Utc};
use rider_types::{BookingId, ContractId, RiderFinalized};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Days before the event date at which reminders go out
pub const REMINDER_OFFSETS_DAYS: [i64; 3] = [7, 3, 1];

/// Reminder-side errors
#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("no reminder schedule for contract {0}")]
    UnknownSchedule(ContractId),

    #[error("contract {contract_id} has no {days_before}-day reminder")]
    UnknownOffset {
        contract_id: ContractId,
        days_before: i64,
    },

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// One reminder slot and its persisted sent flag
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReminderSlot {
    pub days_before: i64,
    pub sent: bool,
}

/// The reminder schedule registered for one finalized contract
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReminderSchedule {
    pub contract_id: ContractId,
    pub booking_id: BookingId,
    pub event_date: DateTime<Utc>,
    pub slots: Vec<ReminderSlot>,
}

impl ReminderSchedule {
    fn for_event(contract_id: ContractId, booking_id: BookingId, event_date: DateTime<Utc>) -> Self {
        Self {
            contract_id,
            booking_id,
            event_date,
            slots: REMINDER_OFFSETS_DAYS
                .iter()
                .map(|&days_before| ReminderSlot {
                    days_before,
                    sent: false,
                })
                .collect(),
        }
    }
}

/// A reminder whose send time has arrived
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DueReminder {
    pub contract_id: ContractId,
    pub booking_id: BookingId,
    pub event_date: DateTime<Utc>,
    pub days_before: i64,
}

/// Channel-agnostic delivery hook driven by [`ReminderScheduler::run_once`]
pub trait ReminderTransport {
    fn deliver(&self, reminder: &DueReminder) -> Result<(), ReminderError>;
}

/// Registers schedules for finalized riders and decides what is due.
pub struct ReminderScheduler {
    schedules: RwLock<HashMap<ContractId, ReminderSchedule>>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self {
            schedules: RwLock::new(HashMap::new()),
        }
    }

    /// Register the fixed offsets for a finalized contract. Repeating
    /// the registration is a no-op; sent flags survive.
    pub fn register(&self, event: &RiderFinalized) -> Result<(), ReminderError> {
        let mut schedules = self
            .schedules
            .write()
            .map_err(|_| ReminderError::LockPoisoned)?;
        if schedules.contains_key(&event.contract_id) {
            return Ok(());
        }

        schedules.insert(
            event.contract_id.clone(),
            ReminderSchedule::for_event(
                event.contract_id.clone(),
                event.booking_id.clone(),
                event.event_date,
            ),
        );

        tracing::info!(
            contract_id = %event.contract_id,
            event_date = %event.event_date,
            "reminder schedule registered"
        );
        Ok(())
    }

    /// Every reminder due at `now` that has not been sent. Offsets whose
    /// event already happened are skipped, not delivered late.
    pub fn due(&self, now: DateTime<Utc>) -> Result<Vec<DueReminder>, ReminderError> {
        let schedules = self
            .schedules
            .read()
            .map_err(|_| ReminderError::LockPoisoned)?;

        let mut due = Vec::new();
        for schedule in schedules.values() {
            if schedule.event_date <= now {
                continue;
            }
            for slot in &schedule.slots {
                if slot.sent {
                    continue;
                }
                let send_at = schedule.event_date - Duration::days(slot.days_before);
                if now >= send_at {
                    due.push(DueReminder {
                        contract_id: schedule.contract_id.clone(),
                        booking_id: schedule.booking_id.clone(),
                        event_date: schedule.event_date,
                        days_before: slot.days_before,
                    });
                }
            }
        }

        due.sort_by(|a, b| {
            a.contract_id
                .0
                .cmp(&b.contract_id.0)
                .then(b.days_before.cmp(&a.days_before))
        });
        Ok(due)
    }

    /// Persist that a (contract, offset) reminder went out
    pub fn mark_sent(&self, contract_id: &ContractId, days_before: i64) -> Result<(), ReminderError> {
        let mut schedules = self
            .schedules
            .write()
            .map_err(|_| ReminderError::LockPoisoned)?;
        let schedule = schedules
            .get_mut(contract_id)
            .ok_or_else(|| ReminderError::UnknownSchedule(contract_id.clone()))?;
        let slot = schedule
            .slots
            .iter_mut()
            .find(|s| s.days_before == days_before)
            .ok_or_else(|| ReminderError::UnknownOffset {
                contract_id: contract_id.clone(),
                days_before,
            })?;

        slot.sent = true;
        Ok(())
    }

    /// One poll: deliver everything due, marking each reminder sent only
    /// after the transport accepted it. Returns how many went out.
    pub fn run_once(
        &self,
        now: DateTime<Utc>,
        transport: &dyn ReminderTransport,
    ) -> Result<usize, ReminderError> {
        let mut delivered = 0;
        for reminder in self.due(now)? {
            match transport.deliver(&reminder) {
                Ok(()) => {
                    self.mark_sent(&reminder.contract_id, reminder.days_before)?;
                    delivered += 1;
                }
                Err(err) => {
                    // Left unsent: the next poll re-offers it.
                    tracing::warn!(
                        contract_id = %reminder.contract_id,
                        days_before = reminder.days_before,
                        error = %err,
                        "reminder delivery failed"
                    );
                }
            }
        }
        Ok(delivered)
    }
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new()
    }
}
