// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup-time resolution of the enclave signing identity.
//!
//! Resolution order, first match wins:
//! 1. A previously sealed key that unseals cleanly is reused, keeping the
//!    identity stable across restarts even after the provisioning secret is
//!    rotated or retired.
//! 2. Otherwise a fresh keypair is derived from the KMS-injected 12-word
//!    mnemonic and sealed for future restarts.
//!
//! A missing or malformed mnemonic on path 2 aborts startup. A failed seal
//! write on path 2 does not: the process continues with an in-memory key and
//! a WARN log (degraded-persistence mode).

use std::str::FromStr;

use alloy::primitives::Address;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::MnemonicBuilder;
use tracing::{info, warn};

use crate::config::Config;

use super::{Identity, IdentityError, KeySealer};

/// Number of recovery words the provisioning secret must contain.
const MNEMONIC_WORD_COUNT: usize = 12;

/// Resolves the process signing identity exactly once at startup.
pub struct IdentityStore {
    secret: Option<String>,
    sealer: KeySealer,
}

impl IdentityStore {
    /// Build a store from runtime configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            secret: config.kms_secret.clone(),
            sealer: KeySealer::new(config.sealed_key_path.clone()),
        }
    }

    /// Build a store from explicit parts (used by tests).
    pub fn with_parts(secret: Option<String>, sealer: KeySealer) -> Self {
        Self { secret, sealer }
    }

    /// Resolve the signing identity.
    ///
    /// Called once, synchronously, before any request serving begins. No
    /// request may observe a partially-resolved identity.
    pub fn resolve(&self) -> Result<Identity, IdentityError> {
        if let Some(record) = self.sealer.load() {
            match self.unseal_record(&record) {
                Ok(identity) => {
                    info!(address = %identity.address(), "reusing sealed enclave identity");
                    return Ok(identity);
                }
                Err(e) => {
                    warn!(
                        error_code = e.error_code(),
                        error = %e,
                        "sealed key unusable, falling back to key derivation"
                    );
                }
            }
        }

        let identity = self.derive_from_secret()?;
        self.seal_identity(&identity);
        Ok(identity)
    }

    /// Unseal a record and verify the recovered key matches its address.
    fn unseal_record(&self, record: &super::SealedKeyRecord) -> Result<Identity, IdentityError> {
        let address = Address::from_str(&record.address)
            .map_err(|_| IdentityError::UnsealFailed("malformed record address".to_string()))?;

        let secret = KeySealer::unseal(record, &address)?;
        let identity = Identity::from_secret_bytes(&secret)
            .map_err(|e| IdentityError::UnsealFailed(e.to_string()))?;

        if identity.address() != address {
            return Err(IdentityError::UnsealFailed(
                "unsealed key does not match the recorded address".to_string(),
            ));
        }
        Ok(identity)
    }

    /// Derive a fresh identity from the provisioning mnemonic.
    fn derive_from_secret(&self) -> Result<Identity, IdentityError> {
        let phrase = self.secret.as_deref().ok_or_else(|| {
            IdentityError::KmsInjectionFailure(
                "no provisioning secret injected and no sealed key available".to_string(),
            )
        })?;

        let words = phrase.split_whitespace().count();
        if words != MNEMONIC_WORD_COUNT {
            return Err(IdentityError::KmsInjectionFailure(format!(
                "provisioning secret must contain exactly {MNEMONIC_WORD_COUNT} words, got {words}"
            )));
        }

        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase.trim())
            .build()
            .map_err(|e| IdentityError::KmsInjectionFailure(e.to_string()))?;

        let identity = Identity::from_signer(signer);
        info!(address = %identity.address(), "derived enclave identity from provisioning secret");
        Ok(identity)
    }

    /// Seal a freshly derived identity for future restarts.
    ///
    /// Failure here is degraded persistence, not a startup failure: the
    /// identity stays valid in memory for the process lifetime.
    fn seal_identity(&self, identity: &Identity) {
        let sealed = KeySealer::seal(&identity.secret_bytes(), &identity.address())
            .and_then(|record| self.sealer.store(&record));

        match sealed {
            Ok(()) => {
                info!(path = %self.sealer.path().display(), "sealed enclave identity to disk");
            }
            Err(e) => {
                warn!(
                    error_code = e.error_code(),
                    error = %e,
                    "failed to seal identity, continuing with in-memory key only"
                );
            }
        }
    }
}
