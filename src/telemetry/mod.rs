//! Telemetry events and the outbound sink
//!
//! The scheduler emits events and moves on. Emission uses `try_send` on a
//! bounded channel: when the consumer lags or is gone the event is dropped
//! and counted, and the scheduler is never blocked.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::chain::{Address, NetworkInfo};
use crate::schedule::types::Phase;

pub mod hourly;
pub mod status;

pub use hourly::HourlyActivity;
pub use status::{run_status_board, StatusBoard};

/// Category of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Sent,
    Skipped,
    Failed,
    Waiting,
    Resting,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::Info => write!(f, "info"),
            LogKind::Sent => write!(f, "sent"),
            LogKind::Skipped => write!(f, "skipped"),
            LogKind::Failed => write!(f, "failed"),
            LogKind::Waiting => write!(f, "waiting"),
            LogKind::Resting => write!(f, "resting"),
        }
    }
}

/// Event published by the scheduler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    LogLine {
        kind: LogKind,
        text: String,
        timestamp: DateTime<Utc>,
    },
    /// A transfer was confirmed during this hour of the day
    HourlyTick { hour: u8 },
    BalanceSnapshot {
        address: Address,
        destination: Address,
        balance: u128,
        network: NetworkInfo,
    },
    /// The scheduler stopped on an unexpected error
    Fatal {
        phase: Phase,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl TelemetryEvent {
    pub fn log(kind: LogKind, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        TelemetryEvent::LogLine {
            kind,
            text: text.into(),
            timestamp,
        }
    }
}

/// Non-blocking publisher of telemetry events
#[derive(Clone)]
pub struct TelemetrySink {
    tx: Option<mpsc::Sender<TelemetryEvent>>,
    dropped_count: Arc<AtomicU64>,
}

impl TelemetrySink {
    /// Create a sink and the receiver a consumer drains
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TelemetryEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx: Some(tx),
                dropped_count: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    /// Sink with no consumer; every event is discarded
    pub fn disabled() -> Self {
        Self {
            tx: None,
            dropped_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publish an event without waiting
    pub fn emit(&self, event: TelemetryEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.try_send(event) {
            self.dropped_count.fetch_add(1, Ordering::Relaxed);
            debug!("Dropped telemetry event: {}", e);
        }
    }

    /// Number of events dropped because the consumer lagged or closed
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_delivers() {
        let (sink, mut rx) = TelemetrySink::channel(4);
        sink.emit(TelemetryEvent::HourlyTick { hour: 3 });
        assert_eq!(rx.recv().await, Some(TelemetryEvent::HourlyTick { hour: 3 }));
        assert_eq!(sink.dropped_count(), 0);
    }

    #[tokio::test]
    async fn test_full_channel_drops_instead_of_blocking() {
        let (sink, mut rx) = TelemetrySink::channel(2);
        for hour in 0..5 {
            sink.emit(TelemetryEvent::HourlyTick { hour });
        }
        assert_eq!(sink.dropped_count(), 3);

        // Oldest events survive
        assert_eq!(rx.recv().await, Some(TelemetryEvent::HourlyTick { hour: 0 }));
        assert_eq!(rx.recv().await, Some(TelemetryEvent::HourlyTick { hour: 1 }));
    }

    #[tokio::test]
    async fn test_closed_consumer_is_harmless() {
        let (sink, rx) = TelemetrySink::channel(2);
        drop(rx);
        sink.emit(TelemetryEvent::HourlyTick { hour: 1 });
        assert_eq!(sink.dropped_count(), 1);
    }

    #[test]
    fn test_disabled_sink() {
        let sink = TelemetrySink::disabled();
        sink.emit(TelemetryEvent::HourlyTick { hour: 1 });
        assert_eq!(sink.dropped_count(), 0);
    }

    #[test]
    fn test_event_serializes_tagged() {
        let event = TelemetryEvent::HourlyTick { hour: 7 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"hourly_tick","hour":7}"#);
    }
}
