// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated sealing of private key material to durable storage.
//!
//! The private key is encrypted with AES-256-GCM under a key derived via
//! 100,000-iteration PBKDF2-HMAC-SHA256 from the sealing context (the
//! identity's own address), salted with SHA-256(context || fixed label).
//! One record exists per address; re-sealing a different key under the same
//! address is not supported.
//!
//! The sealed record is a single JSON file with owner-only permissions,
//! stored under the Gramine-encrypted `/data` mount in production. A record
//! that fails authentication on unseal is treated as absent, never partially
//! trusted.

use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce};
use alloy::primitives::Address;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use super::IdentityError;

/// AES-256-GCM with the 16-byte IV the sealed record format mandates.
type SealingCipher = AesGcm<Aes256, U16>;

/// Domain-separation label mixed into the KDF salt.
const SALT_LABEL: &[u8] = b"sovereign-key-sealing-v1";

/// PBKDF2 iteration count for the sealing key derivation.
const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

/// IV length in bytes.
const IV_LEN: usize = 16;

/// GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// A sealed private key as persisted on disk.
///
/// All binary fields are hex-encoded without a `0x` prefix. The `address`
/// field records the sealing context so the record is self-describing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SealedKeyRecord {
    /// 16-byte AES-GCM IV, fresh per seal.
    pub iv: String,
    /// Ciphertext of the 32-byte private key.
    pub encrypted: String,
    /// 16-byte GCM authentication tag.
    pub auth_tag: String,
    /// Lowercase 0x-prefixed address the key was sealed under.
    pub address: String,
}

/// Seals and unseals private key material at a configured path.
#[derive(Debug, Clone)]
pub struct KeySealer {
    path: PathBuf,
}

impl KeySealer {
    /// Create a sealer targeting the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The sealed key file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seal raw private key bytes under the identity's address.
    pub fn seal(secret: &[u8; 32], address: &Address) -> Result<SealedKeyRecord, IdentityError> {
        let context = address_context(address);
        let sealing_key = derive_sealing_key(&context);

        let mut iv = [0u8; IV_LEN];
        SystemRandom::new()
            .fill(&mut iv)
            .map_err(|_| IdentityError::Sealing("system randomness unavailable".to_string()))?;

        let cipher = SealingCipher::new(Key::<SealingCipher>::from_slice(&sealing_key));
        let sealed = cipher
            .encrypt(Nonce::<U16>::from_slice(&iv), secret.as_slice())
            .map_err(|_| IdentityError::Sealing("AES-GCM encryption failed".to_string()))?;

        // aes-gcm appends the tag to the ciphertext; the record stores them apart.
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        Ok(SealedKeyRecord {
            iv: alloy::hex::encode(iv),
            encrypted: alloy::hex::encode(ciphertext),
            auth_tag: alloy::hex::encode(tag),
            address: context,
        })
    }

    /// Unseal a record back into raw private key bytes.
    ///
    /// Authentication happens before any plaintext is released. Every failure
    /// mode collapses into [`IdentityError::UnsealFailed`] so callers treat
    /// the record as absent rather than trusting partial output.
    pub fn unseal(record: &SealedKeyRecord, address: &Address) -> Result<[u8; 32], IdentityError> {
        let context = address_context(address);
        if !record.address.eq_ignore_ascii_case(&context) {
            return Err(IdentityError::UnsealFailed(
                "record was sealed under a different address".to_string(),
            ));
        }

        let iv = decode_field(&record.iv, IV_LEN, "iv")?;
        let tag = decode_field(&record.auth_tag, TAG_LEN, "authTag")?;
        let ciphertext = alloy::hex::decode(&record.encrypted)
            .map_err(|_| IdentityError::UnsealFailed("malformed ciphertext hex".to_string()))?;
        if ciphertext.len() != 32 {
            return Err(IdentityError::UnsealFailed(
                "ciphertext length mismatch".to_string(),
            ));
        }

        let mut combined = Vec::with_capacity(ciphertext.len() + tag.len());
        combined.extend_from_slice(&ciphertext);
        combined.extend_from_slice(&tag);

        let sealing_key = derive_sealing_key(&context);
        let cipher = SealingCipher::new(Key::<SealingCipher>::from_slice(&sealing_key));
        let plaintext = cipher
            .decrypt(Nonce::<U16>::from_slice(&iv), combined.as_slice())
            .map_err(|_| {
                IdentityError::UnsealFailed("authentication tag mismatch".to_string())
            })?;

        let mut secret = [0u8; 32];
        secret.copy_from_slice(&plaintext);
        Ok(secret)
    }

    /// Persist a sealed record, creating parent directories as needed.
    ///
    /// The file is written atomically and restricted to owner read/write.
    pub fn store(&self, record: &SealedKeyRecord) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        let body = serde_json::to_vec_pretty(record)
            .map_err(|e| IdentityError::Sealing(e.to_string()))?;
        fs::write(&tmp, body)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Load the sealed record from disk, if one exists.
    ///
    /// Corrupted or unreadable records are logged and treated as absent so a
    /// damaged file never takes the process down.
    pub fn load(&self) -> Option<SealedKeyRecord> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "sealed key file unreadable, treating as absent");
                return None;
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "sealed key file corrupted, treating as absent");
                None
            }
        }
    }
}

/// Lowercase 0x-prefixed address string used as the sealing context.
fn address_context(address: &Address) -> String {
    format!("{address:#x}")
}

/// Derive the 32-byte AES key for a sealing context.
///
/// Salt is SHA-256(context || label); the KDF input is the context bytes, so
/// the same address always reproduces the same sealing key. Confidentiality
/// of the record at rest comes from the encrypted `/data` mount and the
/// owner-only file mode, not from this derivation alone.
fn derive_sealing_key(context: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(context.as_bytes());
    hasher.update(SALT_LABEL);
    let salt = hasher.finalize();

    let mut key = [0u8; 32];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PBKDF2_ITERATIONS,
        &salt,
        context.as_bytes(),
        &mut key,
    );
    key
}

/// Decode a fixed-length hex field or fail as an unseal error.
fn decode_field(hex: &str, expected_len: usize, name: &str) -> Result<Vec<u8>, IdentityError> {
    let bytes = alloy::hex::decode(hex)
        .map_err(|_| IdentityError::UnsealFailed(format!("malformed {name} hex")))?;
    if bytes.len() != expected_len {
        return Err(IdentityError::UnsealFailed(format!(
            "{name} must be {expected_len} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}
