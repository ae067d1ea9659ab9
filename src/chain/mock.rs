//! In-memory chain client for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::{Address, ChainClient, ConfirmationId, NetworkInfo, PendingId};
use crate::error::{Error, Result};

/// Scripted chain client that records every call
pub struct MockChainClient {
    sender: Address,
    balance: Mutex<u128>,
    pub fail_balance: bool,
    pub fail_send: bool,
    pub fail_confirm: bool,
    /// Reject every destination as malformed
    pub reject_destination: bool,
    /// Deduct sent amounts from the balance
    pub debit_on_send: bool,
    pub balance_calls: AtomicU64,
    pub send_calls: AtomicU64,
    pub confirm_calls: AtomicU64,
    pub sent: Mutex<Vec<(Address, u128)>>,
}

impl MockChainClient {
    pub fn new(balance: u128) -> Self {
        Self {
            sender: Address::new("SenderAccount1111111111111111111111111111111"),
            balance: Mutex::new(balance),
            fail_balance: false,
            fail_send: false,
            fail_confirm: false,
            reject_destination: false,
            debit_on_send: false,
            balance_calls: AtomicU64::new(0),
            send_calls: AtomicU64::new(0),
            confirm_calls: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn balance_calls(&self) -> u64 {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> u64 {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn confirm_calls(&self) -> u64 {
        self.confirm_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn sender(&self) -> &Address {
        &self.sender
    }

    async fn get_balance(&self, _address: &Address) -> Result<u128> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_balance {
            return Err(Error::Rpc("connection refused".into()));
        }
        Ok(*self.balance.lock().unwrap())
    }

    async fn get_network_info(&self) -> Result<NetworkInfo> {
        Ok(NetworkInfo {
            name: "devnet".into(),
            chain_id: "mock-genesis".into(),
        })
    }

    async fn send_transfer(&self, destination: &Address, amount: u128) -> Result<PendingId> {
        let n = self.send_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_send {
            return Err(Error::TransactionSend("rejected by node".into()));
        }
        if self.reject_destination {
            return Err(Error::InvalidAddress(destination.to_string()));
        }
        if self.debit_on_send {
            let mut balance = self.balance.lock().unwrap();
            *balance = balance.saturating_sub(amount);
        }
        self.sent.lock().unwrap().push((destination.clone(), amount));
        Ok(PendingId(format!("pending-{}", n)))
    }

    async fn await_confirmation(&self, pending: &PendingId) -> Result<ConfirmationId> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_confirm {
            return Err(Error::ConfirmationTimeout(60));
        }
        Ok(ConfirmationId(pending.0.replace("pending", "confirmed")))
    }
}
