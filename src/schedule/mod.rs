//! Transfer pacing
//!
//! Sampling, admission control and the day-cycle scheduler.
//!
//! # Architecture
//!
//! ```text
//! RangeSampler ──► DailyScheduler ──► TransferExecutor ──► ChainClient
//!                       │                    │
//!                       │               BalanceGuard
//!                       ▼
//!                 TelemetrySink ──► StatusBoard
//! ```

pub mod clock;
pub mod daily;
pub mod guard;
pub mod sampler;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use daily::{DailyScheduler, ScheduleSettings, Sleeper, TokioSleeper};
pub use guard::{BalanceGuard, GuardDecision};
pub use sampler::RangeSampler;
pub use types::{
    AmountRange, BoundedRange, CycleEnd, CycleReport, DayPlan, DelayRange, Phase, QuotaRange,
    TransferOutcome, TransferRequest,
};
