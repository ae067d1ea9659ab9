//! Configuration loading and validation
//!
//! Values come from defaults and the process environment (after `.env` is
//! loaded by dotenvy). Prefixed keys use `PACER__SECTION__KEY`; the bare
//! `RPC_URL`, `PRIVATE_KEY`, `KEYPAIR_PATH` and `DEST` variables are honoured
//! as defaults.
//!
//! Environment values stay strings until deserialization, so decimal
//! amounts reach `parse_units` exactly as written.

use anyhow::{Context, Result as AnyResult};
use serde::Deserialize;

use crate::chain::solana::parse_pubkey;
use crate::chain::units::{parse_units, SOL_DECIMALS};
use crate::chain::Address;
use crate::error::{Error, Result};
use crate::schedule::guard::DEFAULT_RESERVE_BPS;
use crate::schedule::types::{AmountRange, BoundedRange};
use crate::schedule::ScheduleSettings;
use crate::telemetry::status::DEFAULT_RECENT_LIMIT;

/// Environment prefix for structured keys
pub const ENV_PREFIX: &str = "PACER";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub sender: SenderConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Give up waiting for a signature status after this long
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
    /// First poll interval for confirmation (grows exponentially)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rpc_endpoint(),
            timeout_ms: default_timeout_ms(),
            confirm_timeout_secs: default_confirm_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenderConfig {
    /// Inline secret key (base58 or JSON byte array)
    #[serde(default = "default_private_key")]
    pub private_key: Option<String>,
    /// Path to a solana-keygen JSON keypair file
    #[serde(default = "default_keypair_path")]
    pub keypair_path: Option<String>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            private_key: default_private_key(),
            keypair_path: default_keypair_path(),
        }
    }
}

impl SenderConfig {
    fn has_credential(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.private_key) || present(&self.keypair_path)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Destination address; the sender's own address when absent or empty
    #[serde(default = "default_destination")]
    pub destination: Option<String>,
    #[serde(default = "default_tx_min_per_day")]
    pub tx_min_per_day: u64,
    #[serde(default = "default_tx_max_per_day")]
    pub tx_max_per_day: u64,
    #[serde(default = "default_delay_min_secs")]
    pub delay_min_secs: u64,
    #[serde(default = "default_delay_max_secs")]
    pub delay_max_secs: u64,
    /// Decimal string in native units
    #[serde(default = "default_amount_min")]
    pub amount_min: String,
    /// Decimal string in native units
    #[serde(default = "default_amount_max")]
    pub amount_max: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Balance reserve in basis points (500 = 5%)
    #[serde(default = "default_reserve_bps")]
    pub reserve_bps: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            tx_min_per_day: default_tx_min_per_day(),
            tx_max_per_day: default_tx_max_per_day(),
            delay_min_secs: default_delay_min_secs(),
            delay_max_secs: default_delay_max_secs(),
            amount_min: default_amount_min(),
            amount_max: default_amount_max(),
            decimals: default_decimals(),
            symbol: default_symbol(),
            reserve_bps: default_reserve_bps(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Log lines kept by the status board
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            recent_limit: default_recent_limit(),
        }
    }
}

// Default value functions
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_rpc_endpoint() -> Option<String> {
    non_empty_env("RPC_URL")
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_confirm_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_private_key() -> Option<String> {
    non_empty_env("PRIVATE_KEY")
}

fn default_keypair_path() -> Option<String> {
    non_empty_env("KEYPAIR_PATH")
}

fn default_destination() -> Option<String> {
    non_empty_env("DEST")
}

fn default_tx_min_per_day() -> u64 {
    3
}

fn default_tx_max_per_day() -> u64 {
    6
}

fn default_delay_min_secs() -> u64 {
    60
}

fn default_delay_max_secs() -> u64 {
    180
}

fn default_amount_min() -> String {
    "0.0001".to_string()
}

fn default_amount_max() -> String {
    "0.001".to_string()
}

fn default_decimals() -> u8 {
    SOL_DECIMALS
}

fn default_symbol() -> String {
    "SOL".to_string()
}

fn default_reserve_bps() -> u32 {
    DEFAULT_RESERVE_BPS
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> AnyResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit environment map (None = process env)
    pub fn load_from(env: Option<config::Map<String, String>>) -> AnyResult<Self> {
        let settings = config::Config::builder()
            // Override with environment variables (prefix PACER__)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(env),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let endpoint = self
            .rpc
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| Error::MissingEnvVar("RPC_URL (or PACER__RPC__ENDPOINT)".into()))?;
        url::Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("Invalid RPC endpoint {}: {}", mask_url(endpoint), e)))?;

        if self.rpc.confirm_timeout_secs == 0 {
            return Err(Error::Config("confirm_timeout_secs must be positive".into()));
        }

        if !self.sender.has_credential() {
            return Err(Error::MissingEnvVar(
                "PRIVATE_KEY (or PACER__SENDER__KEYPAIR_PATH)".into(),
            ));
        }

        if let Some(dest) = self.destination() {
            parse_pubkey(dest)?;
        }

        if self.schedule.reserve_bps > 10_000 {
            return Err(Error::Config("reserve_bps cannot exceed 10000 (100%)".into()));
        }

        if self.telemetry.channel_capacity == 0 {
            return Err(Error::Config("telemetry channel_capacity must be positive".into()));
        }

        self.quota_range()?;
        self.delay_range()?;
        self.amount_range()?;

        Ok(())
    }

    /// Configured destination, if any
    pub fn destination(&self) -> Option<&str> {
        self.schedule
            .destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn quota_range(&self) -> Result<BoundedRange> {
        BoundedRange::new(
            "quota",
            self.schedule.tx_min_per_day,
            self.schedule.tx_max_per_day,
        )
    }

    pub fn delay_range(&self) -> Result<BoundedRange> {
        BoundedRange::new(
            "delay",
            self.schedule.delay_min_secs,
            self.schedule.delay_max_secs,
        )
    }

    pub fn amount_range(&self) -> Result<AmountRange> {
        let min = parse_units(&self.schedule.amount_min, self.schedule.decimals)?;
        let max = parse_units(&self.schedule.amount_max, self.schedule.decimals)?;
        AmountRange::new(min, max)
    }

    /// Typed schedule for a sender; destination falls back to the sender
    pub fn schedule_settings(&self, sender: &Address) -> Result<ScheduleSettings> {
        let destination = match self.destination() {
            Some(dest) => Address::new(parse_pubkey(dest)?.to_string()),
            None => sender.clone(),
        };

        Ok(ScheduleSettings {
            destination,
            quota: self.quota_range()?,
            delay: self.delay_range()?,
            amount: self.amount_range()?,
            decimals: self.schedule.decimals,
            symbol: self.schedule.symbol.clone(),
        })
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  RPC:
    endpoint: {}
    timeout: {}ms
    confirm_timeout: {}s
  Sender:
    private_key: {}
    keypair_path: {}
  Schedule:
    destination: {}
    tx_per_day: {}-{}
    delay: {}-{}s
    amount: {}-{} {}
    reserve: {}bps
  Telemetry:
    channel_capacity: {}
    recent_limit: {}
"#,
            self.rpc
                .endpoint
                .as_deref()
                .map(mask_url)
                .unwrap_or_else(|| "(not set)".into()),
            self.rpc.timeout_ms,
            self.rpc.confirm_timeout_secs,
            if self.sender.private_key.is_some() {
                "***"
            } else {
                "(not set)"
            },
            self.sender.keypair_path.as_deref().unwrap_or("(not set)"),
            self.destination().unwrap_or("(sender)"),
            self.schedule.tx_min_per_day,
            self.schedule.tx_max_per_day,
            self.schedule.delay_min_secs,
            self.schedule.delay_max_secs,
            self.schedule.amount_min,
            self.schedule.amount_max,
            self.schedule.symbol,
            self.schedule.reserve_bps,
            self.telemetry.channel_capacity,
            self.telemetry.recent_limit,
        )
    }
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}
