//! Chain client boundary
//!
//! The scheduler only talks to the chain through [`ChainClient`]. The Solana
//! implementation and a dry-run wrapper live alongside it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

pub mod dry_run;
pub mod solana;
pub mod units;

#[cfg(test)]
pub(crate) mod mock;

pub use dry_run::DryRunChainClient;
pub use solana::SolanaChainClient;
pub use units::{format_units, parse_units};

/// Account address as rendered by the chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a submitted, not yet confirmed transfer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingId(pub String);

impl fmt::Display for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a confirmed transfer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfirmationId(pub String);

impl fmt::Display for ConfirmationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Network the client is connected to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub name: String,
    pub chain_id: String,
}

impl fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

/// Minimal chain access needed to pace transfers
///
/// Implementations must not be driven concurrently for the same sender;
/// the scheduler awaits each confirmation before the next submission.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address transfers are sent from
    fn sender(&self) -> &Address;

    /// Balance of `address` in base units
    async fn get_balance(&self, address: &Address) -> Result<u128>;

    /// Name and id of the connected network
    async fn get_network_info(&self) -> Result<NetworkInfo>;

    /// Submit a value transfer from the sender
    async fn send_transfer(&self, destination: &Address, amount: u128) -> Result<PendingId>;

    /// Wait until a submitted transfer is included
    async fn await_confirmation(&self, pending: &PendingId) -> Result<ConfirmationId>;
}
