//! Status model fed by telemetry
//!
//! Holds what a dashboard would show: the last few log lines, the wallet
//! header, outcome counts and today's per-hour activity. Rendering is left
//! to whoever reads it; the binary mirrors events to tracing.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::hourly::HourlyActivity;
use super::{LogKind, TelemetryEvent};
use crate::chain::units::SOL_DECIMALS;
use crate::chain::{format_units, Address, NetworkInfo};
use crate::schedule::types::Phase;

/// Default number of log lines kept
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// One retained log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentEntry {
    pub kind: LogKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Latest wallet header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletHeader {
    pub address: Address,
    pub destination: Address,
    pub balance: u128,
    pub network: NetworkInfo,
}

/// Fatal report kept for display after the scheduler stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalReport {
    pub phase: Phase,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated view of the telemetry stream
#[derive(Debug, Clone)]
pub struct StatusBoard {
    recent_limit: usize,
    decimals: u8,
    symbol: String,
    recent: VecDeque<RecentEntry>,
    header: Option<WalletHeader>,
    hourly: HourlyActivity,
    sent: u64,
    skipped: u64,
    failed: u64,
    fatal: Option<FatalReport>,
}

impl StatusBoard {
    pub fn new(recent_limit: usize) -> Self {
        Self {
            recent_limit: recent_limit.max(1),
            decimals: SOL_DECIMALS,
            symbol: "SOL".to_string(),
            recent: VecDeque::with_capacity(recent_limit.max(1)),
            header: None,
            hourly: HourlyActivity::new_today(),
            sent: 0,
            skipped: 0,
            failed: 0,
            fatal: None,
        }
    }

    /// Native unit used to render balances
    pub fn with_units(mut self, decimals: u8, symbol: impl Into<String>) -> Self {
        self.decimals = decimals;
        self.symbol = symbol.into();
        self
    }

    /// Fold one event into the board
    pub fn apply(&mut self, event: TelemetryEvent, now: DateTime<Utc>) {
        match event {
            TelemetryEvent::LogLine {
                kind,
                text,
                timestamp,
            } => {
                match kind {
                    LogKind::Sent => self.sent += 1,
                    LogKind::Skipped => self.skipped += 1,
                    LogKind::Failed => self.failed += 1,
                    _ => {}
                }
                self.recent.push_front(RecentEntry {
                    kind,
                    text,
                    timestamp,
                });
                self.recent.truncate(self.recent_limit);
            }
            TelemetryEvent::HourlyTick { hour } => {
                self.hourly.record(hour, now);
            }
            TelemetryEvent::BalanceSnapshot {
                address,
                destination,
                balance,
                network,
            } => {
                self.header = Some(WalletHeader {
                    address,
                    destination,
                    balance,
                    network,
                });
            }
            TelemetryEvent::Fatal {
                phase,
                message,
                timestamp,
            } => {
                self.fatal = Some(FatalReport {
                    phase,
                    message,
                    timestamp,
                });
            }
        }
    }

    /// Most recent log lines, newest first
    pub fn recent(&self) -> impl Iterator<Item = &RecentEntry> {
        self.recent.iter()
    }

    pub fn header(&self) -> Option<&WalletHeader> {
        self.header.as_ref()
    }

    pub fn hourly(&self) -> &HourlyActivity {
        &self.hourly
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn fatal(&self) -> Option<&FatalReport> {
        self.fatal.as_ref()
    }

    /// Plain-text summary for logs and the CLI
    pub fn summary(&self) -> String {
        let header = match &self.header {
            Some(h) => format!(
                "Wallet: {} | DEST: {}\nChain: {} | Balance: {} {}",
                h.address,
                h.destination,
                h.network,
                format_units(h.balance, self.decimals),
                self.symbol
            ),
            None => "Wallet: (no snapshot yet)".to_string(),
        };
        let mut summary = format!(
            "{}\nSent: {} | Skipped: {} | Failed: {} | Today: {}",
            header,
            self.sent,
            self.skipped,
            self.failed,
            self.hourly.total()
        );
        if let Some(fatal) = &self.fatal {
            summary.push_str(&format!(
                "\nFatal while {}: {}",
                fatal.phase, fatal.message
            ));
        }
        summary
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}

/// Drain the telemetry stream until every sink is dropped
pub async fn run_status_board(
    mut rx: mpsc::Receiver<TelemetryEvent>,
    mut board: StatusBoard,
) -> StatusBoard {
    while let Some(event) = rx.recv().await {
        match &event {
            TelemetryEvent::LogLine { kind, text, .. } => match kind {
                LogKind::Failed => warn!(kind = %kind, "{}", text),
                _ => info!(kind = %kind, "{}", text),
            },
            TelemetryEvent::HourlyTick { hour } => {
                info!("Transfer confirmed in hour {}h", hour);
            }
            TelemetryEvent::BalanceSnapshot {
                address,
                balance,
                network,
                ..
            } => {
                info!("Wallet {} on {}: balance {}", address, network, balance);
            }
            TelemetryEvent::Fatal { phase, message, .. } => {
                error!("Fatal error while {}: {}", phase, message);
            }
        }
        board.apply(event, Utc::now());
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetrySink;

    fn line(kind: LogKind, text: &str) -> TelemetryEvent {
        TelemetryEvent::log(kind, text, Utc::now())
    }

    #[test]
    fn test_recent_ring_keeps_newest() {
        let mut board = StatusBoard::new(3);
        for i in 0..5 {
            board.apply(line(LogKind::Info, &format!("line {}", i)), Utc::now());
        }
        let texts: Vec<_> = board.recent().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["line 4", "line 3", "line 2"]);
    }

    #[test]
    fn test_outcome_counts() {
        let mut board = StatusBoard::default();
        board.apply(line(LogKind::Sent, "sent"), Utc::now());
        board.apply(line(LogKind::Skipped, "skipped"), Utc::now());
        board.apply(line(LogKind::Failed, "failed"), Utc::now());
        board.apply(line(LogKind::Waiting, "waiting"), Utc::now());

        assert_eq!(board.sent(), 1);
        assert_eq!(board.skipped(), 1);
        assert_eq!(board.failed(), 1);
        assert_eq!(board.recent().count(), 4);
    }

    #[test]
    fn test_snapshot_and_fatal() {
        let mut board = StatusBoard::default();
        board.apply(
            TelemetryEvent::BalanceSnapshot {
                address: Address::new("me"),
                destination: Address::new("you"),
                balance: 42,
                network: NetworkInfo {
                    name: "devnet".into(),
                    chain_id: "abc".into(),
                },
            },
            Utc::now(),
        );
        board.apply(
            TelemetryEvent::Fatal {
                phase: Phase::Resting,
                message: "boom".into(),
                timestamp: Utc::now(),
            },
            Utc::now(),
        );

        assert_eq!(board.header().unwrap().balance, 42);
        assert_eq!(board.fatal().unwrap().phase, Phase::Resting);
        let summary = board.summary();
        assert!(summary.contains("Balance: 0.000000042 SOL"));
        assert!(summary.contains("Fatal while resting: boom"));
    }

    #[test]
    fn test_summary_uses_configured_units() {
        let mut board = StatusBoard::new(5).with_units(18, "ETH");
        board.apply(
            TelemetryEvent::BalanceSnapshot {
                address: Address::new("me"),
                destination: Address::new("me"),
                balance: 1_500_000_000_000_000_000,
                network: NetworkInfo {
                    name: "custom".into(),
                    chain_id: "xyz".into(),
                },
            },
            Utc::now(),
        );
        assert!(board.summary().contains("Balance: 1.5 ETH"));
    }

    #[tokio::test]
    async fn test_run_until_sinks_dropped() {
        let (sink, rx) = TelemetrySink::channel(16);
        let handle = tokio::spawn(run_status_board(rx, StatusBoard::default()));

        sink.emit(line(LogKind::Sent, "Sent 0.001"));
        sink.emit(TelemetryEvent::HourlyTick { hour: 5 });
        drop(sink);

        let board = handle.await.unwrap();
        assert_eq!(board.sent(), 1);
        assert_eq!(board.hourly().count(5), 1);
    }
}
