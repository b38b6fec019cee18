//! Two-step timelocked mutations
//!
//! Every sensitive change goes through the same small state machine:
//! `Idle -> Pending { value, confirmable_after } -> Idle`. A new request
//! overwrites an unconfirmed one; a confirmation only succeeds once the clock
//! has reached `confirmable_after`.

use crate::error::RegistryError;
use registry_core::Timestamp;
use serde::{Deserialize, Serialize};

/// A value waiting for its timelock to elapse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Pending<T> {
    Idle,
    Pending {
        value: T,
        confirmable_after: Timestamp,
    },
}

impl<T> Default for Pending<T> {
    fn default() -> Self {
        Pending::Idle
    }
}

impl<T> Pending<T> {
    /// Queue `value`, replacing whatever was queued before.
    /// Returns the time from which it can be confirmed.
    pub fn request(&mut self, value: T, now: Timestamp, delay: u64) -> Timestamp {
        let confirmable_after = now.saturating_add(delay);
        *self = Pending::Pending {
            value,
            confirmable_after,
        };
        confirmable_after
    }

    /// Take the queued value if its delay has elapsed.
    ///
    /// On error the state is left untouched.
    pub fn confirm(&mut self, now: Timestamp) -> Result<T, RegistryError> {
        match self.confirmable_after() {
            None => return Err(RegistryError::NoPendingUpdate),
            Some(confirmable_after) if now < confirmable_after => {
                return Err(RegistryError::TooEarly {
                    confirmable_after,
                    now,
                })
            }
            Some(_) => {}
        }

        match std::mem::replace(self, Pending::Idle) {
            Pending::Pending { value, .. } => Ok(value),
            Pending::Idle => Err(RegistryError::NoPendingUpdate),
        }
    }

    pub fn clear(&mut self) {
        *self = Pending::Idle;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Pending::Idle)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Pending::Pending { value, .. } => Some(value),
            Pending::Idle => None,
        }
    }

    pub fn confirmable_after(&self) -> Option<Timestamp> {
        match self {
            Pending::Pending {
                confirmable_after, ..
            } => Some(*confirmable_after),
            Pending::Idle => None,
        }
    }
}

/// The registry-wide timelock.
///
/// Changing the period is itself delayed by the period currently in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Timelock {
    /// Delay applied to new dapps, filter updates and timelock changes (seconds)
    pub period: u64,

    /// Queued period change
    #[serde(default)]
    pub change: Pending<u64>,
}

impl Timelock {
    pub fn new(period: u64) -> Self {
        Self {
            period,
            change: Pending::Idle,
        }
    }

    /// Earliest time something requested now may take effect
    pub fn deadline_from(&self, now: Timestamp) -> Timestamp {
        now.saturating_add(self.period)
    }

    pub fn request_change(&mut self, new_period: u64, now: Timestamp) -> Timestamp {
        let delay = self.period;
        self.change.request(new_period, now, delay)
    }

    /// Commit the queued period. Returns `(old, new)`.
    pub fn confirm_change(&mut self, now: Timestamp) -> Result<(u64, u64), RegistryError> {
        let new_period = self.change.confirm(now)?;
        let old_period = std::mem::replace(&mut self.period, new_period);
        Ok((old_period, new_period))
    }
}
