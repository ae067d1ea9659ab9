//! Dry-run chain client
//!
//! Reads go to the wrapped client; submissions are never sent. Each
//! "transfer" gets a synthetic id and confirms immediately.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use super::{Address, ChainClient, ConfirmationId, NetworkInfo, PendingId};
use crate::error::Result;

const DRY_RUN_PREFIX: &str = "dry-run-";

/// Wraps a real client and suppresses submissions
pub struct DryRunChainClient {
    inner: Arc<dyn ChainClient>,
    simulated: AtomicU64,
}

impl DryRunChainClient {
    pub fn new(inner: Arc<dyn ChainClient>) -> Self {
        Self {
            inner,
            simulated: AtomicU64::new(0),
        }
    }

    /// Number of transfers that would have been submitted
    pub fn simulated_count(&self) -> u64 {
        self.simulated.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChainClient for DryRunChainClient {
    fn sender(&self) -> &Address {
        self.inner.sender()
    }

    async fn get_balance(&self, address: &Address) -> Result<u128> {
        self.inner.get_balance(address).await
    }

    async fn get_network_info(&self) -> Result<NetworkInfo> {
        self.inner.get_network_info().await
    }

    async fn send_transfer(&self, destination: &Address, amount: u128) -> Result<PendingId> {
        self.simulated.fetch_add(1, Ordering::Relaxed);
        let id = format!("{}{}", DRY_RUN_PREFIX, uuid::Uuid::new_v4());
        info!(
            "DRY-RUN: Would transfer {} base units to {} ({})",
            amount, destination, id
        );
        Ok(PendingId(id))
    }

    async fn await_confirmation(&self, pending: &PendingId) -> Result<ConfirmationId> {
        Ok(ConfirmationId(pending.0.clone()))
    }
}
