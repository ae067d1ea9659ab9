//! Error types for the transfer pacer

use thiserror::Error;

use crate::schedule::types::Phase;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the transfer pacer
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Insecure keypair permissions: {0}")]
    InsecureKeypair(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid {name} range: min {min} > max {max}")]
    InvalidRange {
        name: &'static str,
        min: u128,
        max: u128,
    },

    // RPC errors
    #[error("RPC error: {0}")]
    Rpc(String),

    // Transfer errors
    #[error("Transaction send failed: {0}")]
    TransactionSend(String),

    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("Confirmation timeout after {0}s")]
    ConfirmationTimeout(u64),

    #[error("Amount {0} exceeds what the chain can transfer")]
    AmountOverflow(u128),

    // Scheduler errors
    #[error("Scheduler failed during {phase}: {message}")]
    Scheduler { phase: Phase, message: String },
}

impl Error {
    /// Check if this error is a startup configuration problem
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::MissingEnvVar(_)
                | Error::InvalidKeypair(_)
                | Error::InsecureKeypair(_)
                | Error::InvalidAddress(_)
                | Error::InvalidAmount(_)
                | Error::InvalidRange { .. }
        )
    }

    /// Check if this error came from the chain client (recoverable per call)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Rpc(_)
                | Error::TransactionSend(_)
                | Error::TransactionRejected(_)
                | Error::ConfirmationTimeout(_)
                | Error::AmountOverflow(_)
        )
    }
}
