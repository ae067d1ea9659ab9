//! Sender wallet
//!
//! Credential loading and the guarded transfer executor.

pub mod credentials;
pub mod transfer;

pub use credentials::load_sender_keypair;
pub use transfer::TransferExecutor;
