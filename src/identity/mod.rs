// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Enclave signing identity: derivation, sealing, and startup resolution.
//!
//! The identity is resolved exactly once at startup by [`IdentityStore`] and
//! injected into every component that needs it. Key material never leaves
//! this module except through the [`Identity`] signer handle.

mod keys;
mod sealer;
mod store;

pub use keys::Identity;
pub use sealer::{KeySealer, SealedKeyRecord};
pub use store::IdentityStore;

use thiserror::Error;

/// Errors raised while resolving or persisting the enclave identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The KMS-injected provisioning secret is missing or malformed.
    /// Fatal at startup.
    #[error("KMS injection failure: {0}")]
    KmsInjectionFailure(String),
    /// A sealed key record could not be authenticated or decrypted.
    /// Recoverable: the caller falls back to re-derivation.
    #[error("failed to unseal key material: {0}")]
    UnsealFailed(String),
    /// Key bytes did not form a valid secp256k1 secret key.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
    /// Sealing could not produce a record (randomness or encryption failure).
    #[error("sealing failed: {0}")]
    Sealing(String),
    /// The sealed record could not be written to disk.
    /// Non-fatal: the identity continues in memory-only mode.
    #[error("failed to persist sealed key: {0}")]
    SealWrite(#[from] std::io::Error),
}

impl IdentityError {
    /// Stable error code used in API responses and operator alerts.
    pub fn error_code(&self) -> &'static str {
        match self {
            IdentityError::KmsInjectionFailure(_) => "KMS_INJECTION_FAILURE",
            IdentityError::UnsealFailed(_) => "UNSEAL_FAILED",
            IdentityError::InvalidKeyMaterial(_) => "INVALID_KEY_MATERIAL",
            IdentityError::Sealing(_) => "SEALING_FAILED",
            IdentityError::SealWrite(_) => "SEAL_WRITE_FAILED",
        }
    }
}
