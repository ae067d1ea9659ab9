//! Guarded transfer execution
//!
//! One call = one balance read, one guard check and at most one on-chain
//! transfer. Client failures become `TransferOutcome::Failed` instead of
//! propagating; the caller decides what to do next.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::chain::ChainClient;
use crate::schedule::guard::{BalanceGuard, GuardDecision};
use crate::schedule::types::{TransferOutcome, TransferRequest};

/// Reason attached to guard denials
pub const INSUFFICIENT_BALANCE: &str = "insufficient balance";

/// Transfer executor for paced transfers
pub struct TransferExecutor {
    client: Arc<dyn ChainClient>,
    guard: BalanceGuard,
}

impl TransferExecutor {
    /// Create a new transfer executor
    pub fn new(client: Arc<dyn ChainClient>, guard: BalanceGuard) -> Self {
        Self { client, guard }
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    /// Execute a guarded transfer from the client's sender
    ///
    /// Must not be called concurrently for the same sender: a second call
    /// would read the balance before the first transfer lands.
    pub async fn execute(&self, request: &TransferRequest) -> TransferOutcome {
        let sender = self.client.sender();

        let balance = match self.client.get_balance(sender).await {
            Ok(b) => b,
            Err(e) => {
                warn!("Balance query failed for {}: {}", sender, e);
                return TransferOutcome::Failed(e);
            }
        };

        if let GuardDecision::Deny { shortfall } = self.guard.admit(balance, request.amount()) {
            info!(
                "Low balance, transfer skipped: balance={} amount={} shortfall={}",
                balance,
                request.amount(),
                shortfall
            );
            return TransferOutcome::Skipped {
                reason: INSUFFICIENT_BALANCE.to_string(),
                balance,
                shortfall,
            };
        }

        debug!(
            "Submitting transfer: {} base units from {} to {}",
            request.amount(),
            sender,
            request.destination()
        );

        let pending = match self
            .client
            .send_transfer(request.destination(), request.amount())
            .await
        {
            Ok(p) => p,
            Err(e) => {
                warn!("Transfer submission failed: {}", e);
                return TransferOutcome::Failed(e);
            }
        };

        match self.client.await_confirmation(&pending).await {
            Ok(confirmation) => {
                info!(
                    "Transfer complete: {} base units to {} (tx: {})",
                    request.amount(),
                    request.destination(),
                    confirmation
                );
                TransferOutcome::Sent(confirmation)
            }
            Err(e) => {
                warn!("Transfer {} not confirmed: {}", pending, e);
                TransferOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockChainClient;
    use crate::chain::Address;
    use crate::error::Error;

    fn request(amount: u128) -> TransferRequest {
        TransferRequest::new(Address::new("Destination111"), amount)
    }

    fn executor(client: Arc<MockChainClient>) -> TransferExecutor {
        TransferExecutor::new(client, BalanceGuard::new())
    }

    #[tokio::test]
    async fn test_sent_when_balance_sufficient() {
        let client = Arc::new(MockChainClient::new(100));
        let outcome = executor(client.clone()).execute(&request(95)).await;

        assert!(outcome.is_sent());
        assert_eq!(client.balance_calls(), 1);
        assert_eq!(client.send_calls(), 1);
        assert_eq!(client.confirm_calls(), 1);
        assert_eq!(
            client.sent.lock().unwrap().as_slice(),
            &[(Address::new("Destination111"), 95)]
        );
    }

    #[tokio::test]
    async fn test_skipped_never_sends() {
        let client = Arc::new(MockChainClient::new(100));
        let outcome = executor(client.clone()).execute(&request(96)).await;

        match outcome {
            TransferOutcome::Skipped {
                reason,
                balance,
                shortfall,
            } => {
                assert_eq!(reason, INSUFFICIENT_BALANCE);
                assert_eq!(balance, 100);
                assert_eq!(shortfall, 1);
            }
            other => panic!("expected Skipped, got {:?}", other),
        }
        assert_eq!(client.balance_calls(), 1);
        assert_eq!(client.send_calls(), 0);
        assert_eq!(client.confirm_calls(), 0);
    }

    #[tokio::test]
    async fn test_balance_failure_is_failed_outcome() {
        let mut mock = MockChainClient::new(100);
        mock.fail_balance = true;
        let client = Arc::new(mock);

        let outcome = executor(client.clone()).execute(&request(1)).await;
        assert!(matches!(outcome, TransferOutcome::Failed(Error::Rpc(_))));
        assert_eq!(client.balance_calls(), 1);
        assert_eq!(client.send_calls(), 0);
    }

    #[tokio::test]
    async fn test_send_failure_is_not_retried() {
        let mut mock = MockChainClient::new(1_000);
        mock.fail_send = true;
        let client = Arc::new(mock);

        let outcome = executor(client.clone()).execute(&request(10)).await;
        assert!(matches!(
            outcome,
            TransferOutcome::Failed(Error::TransactionSend(_))
        ));
        assert_eq!(client.send_calls(), 1);
        assert_eq!(client.confirm_calls(), 0);
    }

    #[tokio::test]
    async fn test_confirmation_timeout_is_failed() {
        let mut mock = MockChainClient::new(1_000);
        mock.fail_confirm = true;
        let client = Arc::new(mock);

        let outcome = executor(client.clone()).execute(&request(10)).await;
        assert!(matches!(
            outcome,
            TransferOutcome::Failed(Error::ConfirmationTimeout(_))
        ));
        assert_eq!(client.send_calls(), 1);
        assert_eq!(client.confirm_calls(), 1);
    }

    #[tokio::test]
    async fn test_balance_read_once_per_call() {
        let client = Arc::new(MockChainClient::new(1_000_000));
        let exec = executor(client.clone());
        for _ in 0..3 {
            let _ = exec.execute(&request(10)).await;
        }
        assert_eq!(client.balance_calls(), 3);
    }
}
