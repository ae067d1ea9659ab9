//! Testnet Transfer Pacer Library
//!
//! Sends a randomized number of small transfers per UTC day to a fixed
//! destination, with randomized pacing and a balance reserve.

pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod schedule;
pub mod telemetry;
pub mod wallet;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
