//! Sender credential loading
//!
//! The secret is accepted inline (base58 or a JSON byte array, as written by
//! `solana-keygen`) or from a keypair file. It is handed to the chain client
//! for signing and used for nothing else.

use std::path::Path;

use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use tracing::{debug, info};

use crate::config::SenderConfig;
use crate::error::{Error, Result};

/// Load the sender keypair from config
pub fn load_sender_keypair(config: &SenderConfig) -> Result<Keypair> {
    let keypair = match (&config.private_key, &config.keypair_path) {
        (Some(secret), _) if !secret.trim().is_empty() => keypair_from_secret(secret)?,
        (_, Some(path)) if !path.trim().is_empty() => keypair_from_file(Path::new(path))?,
        _ => {
            return Err(Error::MissingEnvVar(
                "PRIVATE_KEY (or PACER__SENDER__KEYPAIR_PATH)".into(),
            ))
        }
    };

    info!("Loaded sender keypair: {}", keypair.pubkey());
    Ok(keypair)
}

/// Parse an inline secret: JSON byte array or base58
pub fn keypair_from_secret(secret: &str) -> Result<Keypair> {
    let secret = secret.trim();

    let bytes: Vec<u8> = if secret.starts_with('[') {
        serde_json::from_str(secret)
            .map_err(|e| Error::InvalidKeypair(format!("Failed to parse keypair JSON: {}", e)))?
    } else {
        bs58::decode(secret)
            .into_vec()
            .map_err(|e| Error::InvalidKeypair(format!("Failed to decode base58 secret: {}", e)))?
    };

    Keypair::from_bytes(&bytes)
        .map_err(|e| Error::InvalidKeypair(format!("Invalid keypair bytes: {}", e)))
}

/// Load a JSON byte-array keypair file
pub fn keypair_from_file(path: &Path) -> Result<Keypair> {
    debug!("Loading keypair from: {:?}", path);

    // Validate permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(path) {
            let mode = metadata.permissions().mode();
            if mode & 0o077 != 0 {
                return Err(Error::InsecureKeypair(format!(
                    "Keypair {} has insecure permissions {:o}. Run 'chmod 600 {}'",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }
        }
    }

    let keypair_bytes = std::fs::read(path).map_err(|e| {
        Error::InvalidKeypair(format!("Failed to read keypair {}: {}", path.display(), e))
    })?;

    let keypair_json: Vec<u8> = serde_json::from_slice(&keypair_bytes).map_err(|e| {
        Error::InvalidKeypair(format!(
            "Failed to parse keypair JSON {}: {}",
            path.display(),
            e
        ))
    })?;

    Keypair::from_bytes(&keypair_json)
        .map_err(|e| Error::InvalidKeypair(format!("Invalid keypair bytes: {}", e)))
}
