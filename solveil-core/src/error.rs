//! Error types for solveil.
//!
//! One `thiserror` hierarchy for the whole protocol. Cryptographic failures
//! surface to the caller unchanged; view-tag mismatches and announcement
//! non-matches are silent negatives and never appear here.

use thiserror::Error;

/// Result type alias using `SolveilError`.
pub type Result<T> = std::result::Result<T, SolveilError>;

/// Main error type for all solveil operations.
#[derive(Debug, Error)]
pub enum SolveilError {
    // ═══════════════════════════════════════════════════════════════════════════
    // ENCODING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Meta-address or key string is malformed: missing prefix, bad Base58,
    /// or wrong decoded length.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// 32 bytes do not decompress to a valid, non-identity, non-small-order
    /// Ed25519 point.
    #[error("Invalid curve point: {0}")]
    InvalidPoint(String),

    /// Announcement memo is malformed or tagged as a non-stealth message.
    /// Soft: mixed-memo streams skip these and keep scanning.
    #[error("Invalid announcement: {0}")]
    InvalidAnnouncement(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CRYPTOGRAPHIC ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// The system RNG refused to deliver bytes. Fatal.
    #[error("RNG failure: {0}")]
    RngFailure(String),

    /// A signature failed verification.
    #[error("Signature verification failed: {0}")]
    VerificationFailed(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // FACADE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Withdrawal request exceeds available funds after the fee reserve.
    #[error("Insufficient balance: requested {requested} lamports, {available} available")]
    InsufficientBalance {
        /// Lamports the caller asked to withdraw.
        requested: u64,
        /// Lamports actually spendable after the fee reserve.
        available: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // STORAGE / CHAIN ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Announcement registry is corrupted or rejected the operation.
    #[error("Registry error: {0}")]
    RegistryError(String),

    /// Persisted format version does not match this build.
    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version this build writes and reads.
        expected: u8,
        /// Version found in the data.
        actual: u8,
    },

    /// Chain query (balance, announcement retrieval) failed.
    #[error("Chain query failed: {0}")]
    ChainError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // WRAPPED ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SolveilError {
    /// Returns true if this error came from a cryptographic primitive.
    pub fn is_crypto_error(&self) -> bool {
        matches!(
            self,
            SolveilError::InvalidPoint(_)
                | SolveilError::RngFailure(_)
                | SolveilError::VerificationFailed(_)
        )
    }

    /// Returns true if this is an input-validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            SolveilError::InvalidEncoding(_)
                | SolveilError::InvalidAnnouncement(_)
                | SolveilError::VersionMismatch { .. }
        )
    }

    /// Returns true if this error is recoverable (retrying may succeed).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SolveilError::ChainError(_) | SolveilError::RegistryError(_)
        )
    }
}
