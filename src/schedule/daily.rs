//! Daily transfer scheduler
//!
//! Each cycle has two phases:
//!
//! ```text
//! Trading: quota = rand(quota)         Resting: sleep until next 00:00 UTC
//!   repeat quota times:                         |
//!     amount = rand(amount)                     v
//!     execute guarded transfer           back to Trading
//!     emit outcome
//!     sleep rand(delay)  (not after the last transfer)
//! ```
//!
//! Every suspension point races the cancellation token, so a supervisor can
//! stop the loop between operations. Transfers are strictly sequential.
//!
//! Client failures are logged and the slot moves on. A failure that is a
//! configuration problem (the node rejects the destination, a bad key) ends
//! the run with a `Fatal` event carrying the phase.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::clock::{rest_until_next_day, Clock, SystemClock};
use super::sampler::RangeSampler;
use super::types::{
    AmountRange, CycleEnd, CycleReport, DayPlan, DelayRange, Phase, QuotaRange, TransferOutcome,
    TransferRequest,
};
use crate::chain::{format_units, Address, NetworkInfo};
use crate::error::{Error, Result};
use crate::telemetry::{LogKind, TelemetryEvent, TelemetrySink};
use crate::wallet::TransferExecutor;

/// Cooperative sleep used for pacing and resting
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Validated scheduling parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub destination: Address,
    pub quota: QuotaRange,
    pub delay: DelayRange,
    pub amount: AmountRange,
    /// Decimals of the native unit, for log lines
    pub decimals: u8,
    pub symbol: String,
}

/// Paces transfers across UTC days
pub struct DailyScheduler {
    executor: TransferExecutor,
    settings: ScheduleSettings,
    sampler: RangeSampler,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    telemetry: TelemetrySink,
    cancel: CancellationToken,
    phase: Phase,
}

impl DailyScheduler {
    /// Create a scheduler on the system clock and tokio timer
    pub fn new(
        executor: TransferExecutor,
        settings: ScheduleSettings,
        telemetry: TelemetrySink,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            executor,
            settings,
            sampler: RangeSampler::from_entropy(),
            clock: Arc::new(SystemClock),
            sleeper: Arc::new(TokioSleeper),
            telemetry,
            cancel,
            phase: Phase::Trading,
        }
    }

    pub fn with_sampler(mut self, sampler: RangeSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &ScheduleSettings {
        &self.settings
    }

    /// Query network and balance once and publish a snapshot
    ///
    /// Failures here are startup failures: reported as `Fatal` and returned.
    pub async fn announce(&self) -> Result<NetworkInfo> {
        match self.snapshot().await {
            Ok(network) => Ok(network),
            Err(e) => {
                error!("Startup failed: {}", e);
                self.report_fatal(&e);
                Err(e)
            }
        }
    }

    async fn snapshot(&self) -> Result<NetworkInfo> {
        let client = self.executor.client();
        let network = client.get_network_info().await?;
        let balance = client.get_balance(client.sender()).await?;

        info!(
            "Wallet {} on {} | DEST: {} | Balance: {} {}",
            client.sender(),
            network,
            self.settings.destination,
            format_units(balance, self.settings.decimals),
            self.settings.symbol
        );

        self.telemetry.emit(TelemetryEvent::BalanceSnapshot {
            address: client.sender().clone(),
            destination: self.settings.destination.clone(),
            balance,
            network: network.clone(),
        });

        Ok(network)
    }

    /// Run day cycles until cancelled
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.run_cycle().await {
                Ok(CycleEnd::Completed(report)) => {
                    info!(
                        "Day cycle complete: quota={} sent={} skipped={} failed={}",
                        report.quota, report.sent, report.skipped, report.failed
                    );
                }
                Ok(CycleEnd::Cancelled) => {
                    info!("Scheduler stopped while {}", self.phase);
                    return Ok(());
                }
                Err(e) => {
                    error!("Scheduler failed while {}: {}", self.phase, e);
                    self.report_fatal(&e);
                    return Err(Error::Scheduler {
                        phase: self.phase,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    /// Run one Trading phase followed by one Resting phase
    pub async fn run_cycle(&mut self) -> Result<CycleEnd> {
        self.phase = Phase::Trading;

        let quota = self.sampler.sample_quota(&self.settings.quota);
        let mut plan = DayPlan::new(quota);
        let mut report = CycleReport {
            quota,
            ..CycleReport::default()
        };

        self.log(
            LogKind::Info,
            format!("Starting new day with target {} tx", quota),
        );

        while !plan.is_exhausted() {
            if self.cancel.is_cancelled() {
                return Ok(CycleEnd::Cancelled);
            }

            let amount = self.sampler.sample_amount(&self.settings.amount);
            let request = TransferRequest::new(self.settings.destination.clone(), amount);

            let outcome = self.executor.execute(&request).await;
            plan.record_attempt();
            self.record_outcome(&outcome, amount, &mut report);

            if let TransferOutcome::Failed(e) = outcome {
                if e.is_configuration() {
                    return Err(e);
                }
            }

            if !plan.is_exhausted() {
                let delay = self.sampler.sample_delay(&self.settings.delay);
                self.log(
                    LogKind::Waiting,
                    format!("Waiting {} sec before next tx...", delay.as_secs()),
                );
                report.delays.push(delay);
                if !self.pause(delay).await {
                    return Ok(CycleEnd::Cancelled);
                }
            }
        }

        self.phase = Phase::Resting;
        let rest = rest_until_next_day(self.clock.now());
        report.rest = rest;
        self.log(
            LogKind::Resting,
            format!(
                "Daily target reached. Sleeping {} sec until next UTC day...",
                rest.as_secs()
            ),
        );
        if !self.pause(rest).await {
            return Ok(CycleEnd::Cancelled);
        }

        Ok(CycleEnd::Completed(report))
    }

    /// Emit the single telemetry line for a quota slot
    fn record_outcome(&self, outcome: &TransferOutcome, amount: u128, report: &mut CycleReport) {
        let decimals = self.settings.decimals;
        let symbol = &self.settings.symbol;

        match outcome {
            TransferOutcome::Sent(confirmation) => {
                report.sent += 1;
                self.log(
                    LogKind::Sent,
                    format!(
                        "Sent {} {} | Tx: {}",
                        format_units(amount, decimals),
                        symbol,
                        confirmation
                    ),
                );
                self.telemetry.emit(TelemetryEvent::HourlyTick {
                    hour: self.clock.local_hour(),
                });
            }
            TransferOutcome::Skipped {
                reason, balance, ..
            } => {
                report.skipped += 1;
                self.log(
                    LogKind::Skipped,
                    format!(
                        "Low balance. Skipped ({}). Bal={} {}",
                        reason,
                        format_units(*balance, decimals),
                        symbol
                    ),
                );
            }
            TransferOutcome::Failed(e) => {
                report.failed += 1;
                warn!("Transfer of {} {} failed: {}", format_units(amount, decimals), symbol, e);
                self.log(LogKind::Failed, format!("Transfer failed: {}", e));
            }
        }
    }

    fn report_fatal(&self, error: &Error) {
        self.telemetry.emit(TelemetryEvent::Fatal {
            phase: self.phase,
            message: error.to_string(),
            timestamp: self.clock.now(),
        });
    }

    /// Sleep unless cancelled first; false when cancelled
    async fn pause(&self, duration: Duration) -> bool {
        debug!("Pausing {:?} while {}", duration, self.phase);
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = self.sleeper.sleep(duration) => true,
        }
    }

    fn log(&self, kind: LogKind, text: String) {
        self.telemetry
            .emit(TelemetryEvent::log(kind, text, self.clock.now()));
    }
}
