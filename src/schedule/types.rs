//! Core scheduling types
//!
//! Ranges are validated at construction so the scheduler never sees an
//! inverted bound at run time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::chain::{Address, ConfirmationId};
use crate::error::{Error, Result};

/// Inclusive range of transfer amounts in base units (lamports, wei, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    min: u128,
    max: u128,
}

impl AmountRange {
    pub fn new(min: u128, max: u128) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidRange {
                name: "amount",
                min,
                max,
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u128 {
        self.min
    }

    pub fn max(&self) -> u128 {
        self.max
    }
}

/// Inclusive range of plain integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedRange {
    min: u64,
    max: u64,
}

impl BoundedRange {
    pub fn new(name: &'static str, min: u64, max: u64) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidRange {
                name,
                min: min as u128,
                max: max as u128,
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

/// Pacing delay between transfers, in seconds
pub type DelayRange = BoundedRange;

/// Transfers per day
pub type QuotaRange = BoundedRange;

/// A single value transfer to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    destination: Address,
    amount: u128,
}

impl TransferRequest {
    pub fn new(destination: Address, amount: u128) -> Self {
        Self {
            destination,
            amount,
        }
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    pub fn amount(&self) -> u128 {
        self.amount
    }
}

/// Result of one attempted transfer
#[derive(Debug)]
pub enum TransferOutcome {
    /// Included on chain
    Sent(ConfirmationId),
    /// Balance guard refused the transfer; nothing was submitted
    Skipped {
        reason: String,
        balance: u128,
        shortfall: u128,
    },
    /// Client-level failure; not retried
    Failed(Error),
}

impl TransferOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, TransferOutcome::Sent(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TransferOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TransferOutcome::Failed(_))
    }
}

/// Progress through one day's quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPlan {
    pub quota: u64,
    pub attempted: u64,
}

impl DayPlan {
    pub fn new(quota: u64) -> Self {
        Self {
            quota,
            attempted: 0,
        }
    }

    pub fn record_attempt(&mut self) {
        self.attempted += 1;
    }

    pub fn remaining(&self) -> u64 {
        self.quota.saturating_sub(self.attempted)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempted >= self.quota
    }
}

/// Scheduler phase within a day cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Trading,
    Resting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Trading => write!(f, "trading"),
            Phase::Resting => write!(f, "resting"),
        }
    }
}

/// Summary of one completed day cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub quota: u64,
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
    pub delays: Vec<Duration>,
    pub rest: Duration,
}

/// How a day cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEnd {
    Completed(CycleReport),
    Cancelled,
}
