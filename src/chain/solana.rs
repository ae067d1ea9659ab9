//! Solana RPC chain client
//!
//! Native SOL transfers through the system program. Confirmation is polled
//! with exponential backoff until the signature has a status or the
//! confirmation timeout elapses.

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
    transaction::Transaction,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::{Address, ChainClient, ConfirmationId, NetworkInfo, PendingId};
use crate::config::RpcConfig;
use crate::error::{Error, Result};

const MAINNET_GENESIS: &str = "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdpKuc147dw2N9d";
const DEVNET_GENESIS: &str = "EtWTRABZaYq6iMfeYKouRu166VU2xqa1wcaWoxPkrZBG";
const TESTNET_GENESIS: &str = "4uhcVJyU9pJkvQyS88uRDiswHXSCkY3zQawwpjk2NsNY";

/// Parse a base58 account address
pub fn parse_pubkey(address: &str) -> Result<Pubkey> {
    Pubkey::from_str(address.trim())
        .map_err(|e| Error::InvalidAddress(format!("{}: {}", address, e)))
}

/// Cluster name for a genesis hash
pub fn cluster_name(genesis_hash: &str) -> &'static str {
    match genesis_hash {
        MAINNET_GENESIS => "mainnet-beta",
        DEVNET_GENESIS => "devnet",
        TESTNET_GENESIS => "testnet",
        _ => "custom",
    }
}

/// Chain client backed by a Solana JSON-RPC endpoint
pub struct SolanaChainClient {
    rpc_client: RpcClient,
    keypair: Keypair,
    sender: Address,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl SolanaChainClient {
    /// Create a new client signing with `keypair`
    pub fn new(config: &RpcConfig, keypair: Keypair) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| Error::MissingEnvVar("RPC_URL".into()))?;

        let rpc_client = RpcClient::new_with_timeout_and_commitment(
            endpoint,
            Duration::from_millis(config.timeout_ms),
            CommitmentConfig::confirmed(),
        );
        let sender = Address::new(keypair.pubkey().to_string());

        Ok(Self {
            rpc_client,
            keypair,
            sender,
            confirm_timeout: Duration::from_secs(config.confirm_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    fn parse_signature(pending: &PendingId) -> Result<Signature> {
        Signature::from_str(&pending.0)
            .map_err(|e| Error::TransactionRejected(format!("bad signature {}: {}", pending, e)))
    }
}

#[async_trait]
impl ChainClient for SolanaChainClient {
    fn sender(&self) -> &Address {
        &self.sender
    }

    async fn get_balance(&self, address: &Address) -> Result<u128> {
        let pubkey = parse_pubkey(address.as_str())?;
        let lamports = self
            .rpc_client
            .get_balance(&pubkey)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get balance: {}", e)))?;
        Ok(lamports as u128)
    }

    async fn get_network_info(&self) -> Result<NetworkInfo> {
        let genesis = self
            .rpc_client
            .get_genesis_hash()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get genesis hash: {}", e)))?
            .to_string();

        Ok(NetworkInfo {
            name: cluster_name(&genesis).to_string(),
            chain_id: genesis,
        })
    }

    async fn send_transfer(&self, destination: &Address, amount: u128) -> Result<PendingId> {
        let to = parse_pubkey(destination.as_str())?;
        let lamports = u64::try_from(amount).map_err(|_| Error::AmountOverflow(amount))?;

        debug!(
            "Executing transfer: {} lamports from {} to {}",
            lamports, self.sender, to
        );

        let instruction = system_instruction::transfer(&self.keypair.pubkey(), &to, lamports);

        let blockhash = self
            .rpc_client
            .get_latest_blockhash()
            .await
            .map_err(|e| Error::TransactionSend(format!("Failed to get blockhash: {}", e)))?;

        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.keypair.pubkey()),
            &[&self.keypair],
            blockhash,
        );

        let signature = self
            .rpc_client
            .send_transaction(&transaction)
            .await
            .map_err(|e| Error::TransactionSend(format!("Transfer failed: {}", e)))?;

        info!("Transfer submitted: {} lamports to {} (sig: {})", lamports, to, signature);

        Ok(PendingId(signature.to_string()))
    }

    async fn await_confirmation(&self, pending: &PendingId) -> Result<ConfirmationId> {
        let signature = Self::parse_signature(pending)?;

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.poll_interval)
            .with_max_interval(self.poll_interval * 8)
            .with_max_elapsed_time(Some(self.confirm_timeout))
            .build();

        let timeout_secs = self.confirm_timeout.as_secs();
        let rpc = &self.rpc_client;
        let sig = &signature;
        let status = backoff::future::retry(policy, || async move {
            match rpc.get_signature_status(sig).await {
                Ok(Some(status)) => Ok(status),
                Ok(None) => Err(backoff::Error::transient(Error::ConfirmationTimeout(
                    timeout_secs,
                ))),
                Err(e) => Err(backoff::Error::transient(Error::Rpc(format!(
                    "Failed to get signature status: {}",
                    e
                )))),
            }
        })
        .await?;

        status.map_err(|e| Error::TransactionRejected(format!("{}: {}", signature, e)))?;

        debug!("Transfer confirmed: {}", signature);
        Ok(ConfirmationId(signature.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_names() {
        assert_eq!(cluster_name(DEVNET_GENESIS), "devnet");
        assert_eq!(cluster_name(TESTNET_GENESIS), "testnet");
        assert_eq!(cluster_name(MAINNET_GENESIS), "mainnet-beta");
        assert_eq!(cluster_name("11111111111111111111111111111111"), "custom");
    }

    #[test]
    fn test_parse_pubkey() {
        assert!(parse_pubkey("11111111111111111111111111111111").is_ok());
        assert!(matches!(
            parse_pubkey("not-a-key"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_amount_rejected_before_rpc() {
        let config = RpcConfig {
            endpoint: Some("http://127.0.0.1:1".into()),
            ..RpcConfig::default()
        };
        let client = SolanaChainClient::new(&config, Keypair::new()).unwrap();
        let destination = Address::new(Pubkey::new_unique().to_string());

        let result = client
            .send_transfer(&destination, u64::MAX as u128 + 1)
            .await;
        assert!(matches!(result, Err(Error::AmountOverflow(_))));
    }

    #[tokio::test]
    async fn test_sender_matches_keypair() {
        let config = RpcConfig {
            endpoint: Some("http://127.0.0.1:1".into()),
            ..RpcConfig::default()
        };
        let keypair = Keypair::new();
        let expected = keypair.pubkey().to_string();
        let client = SolanaChainClient::new(&config, keypair).unwrap();
        assert_eq!(client.sender().as_str(), expected);
    }
}
