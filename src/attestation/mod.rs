// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote-attestation quotes and EIP-712 score attestations.
//!
//! ## Modules
//!
//! - `quote` - quote acquisition (hardware DCAP or deterministic mock)
//! - `signer` - EIP-712 typed-data signing with self-verification
//! - `nonce` - per-subject replay-protection counters
//! - `service` - the composed "attest a score for subject X" entry point

mod nonce;
mod quote;
mod service;
mod signer;

pub use nonce::NonceRegistry;
pub use quote::{AttestationQuote, QuoteProvider};
pub use service::{AttestationService, ATTESTATION_VALIDITY_SECS};
pub use signer::{AttestationData, SignedAttestation, TypedDataSigner, MAX_SCORE};

use thiserror::Error;

/// Errors raised while producing quotes or signed attestations.
#[derive(Debug, Error)]
pub enum AttestationError {
    /// The real hardware quote path failed or timed out. Never silently
    /// downgraded to the mock path.
    #[error("hardware attestation unavailable: {0}")]
    HardwareUnavailable(String),
    /// Score outside the 0..=100 range.
    #[error("score {0} is outside the valid range 0..=100")]
    InvalidScore(u64),
    /// Deadline not strictly in the future at signing time.
    #[error("deadline {deadline} is not in the future (now {now})")]
    ExpiredDeadline { deadline: u64, now: u64 },
    /// The freshly produced signature did not recover to the enclave
    /// identity. Indicates a cryptographic bug; fatal for the request.
    #[error("signature failed self-verification after signing")]
    SignatureCorruption,
    /// Underlying signer failure.
    #[error("signer error: {0}")]
    Signer(#[from] alloy::signers::Error),
}

impl AttestationError {
    /// Stable error code used in API responses and operator alerts.
    pub fn error_code(&self) -> &'static str {
        match self {
            AttestationError::HardwareUnavailable(_) => "ATTESTATION_HARDWARE_UNAVAILABLE",
            AttestationError::InvalidScore(_) => "INVALID_SCORE",
            AttestationError::ExpiredDeadline { .. } => "EXPIRED_DEADLINE",
            AttestationError::SignatureCorruption => "SIGNATURE_CORRUPTION",
            AttestationError::Signer(_) => "SIGNER_ERROR",
        }
    }
}

/// Current unix time in seconds.
pub(crate) fn now_unix() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
