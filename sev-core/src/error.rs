//! Error types for sev-core
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! Nothing here is fatal to the process: components convert these into state
//! (counters, flags, modals) instead of letting them cross view boundaries.

use thiserror::Error;

/// Main error type for sev-core
///
/// Component failures (fetch, media, wallet) have their own enums below and
/// never reach this type: they are recorded as state where they happen.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(#[from] sev_common::Error),

    /// Action refused because the preloader has not finished
    #[error("Assets still loading: {percent}% complete")]
    NotReady { percent: u8 },
}

/// Asset fetch failures
///
/// Every variant is recorded in the preload state and counted as settled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Server answered with a non-2xx status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Request could not be completed or the body could not be read
    #[error("{0}")]
    Transport(String),

    /// Manifest entry could not be resolved to a URL
    #[error("invalid asset URL: {0}")]
    InvalidUrl(String),
}

/// Media element failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// The runtime rejected unsolicited playback start
    #[error("Playback blocked until user interaction")]
    PlaybackBlocked,
}

/// Wallet provider failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No injected provider in this environment
    #[error("Wallet provider not available")]
    MissingCapability,

    /// The user or the provider rejected the request
    #[error("Wallet request rejected: {0}")]
    Rejected(String),

    /// A connection request is already waiting on the provider
    #[error("Wallet request already pending")]
    Pending,

    /// Provider answered with no accounts
    #[error("Wallet returned no accounts")]
    NoAccounts,
}

/// Convenience Result type using sev-core Error
pub type Result<T> = std::result::Result<T, Error>;
