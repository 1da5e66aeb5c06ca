// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and the [`Config`] struct
//! loaded from the environment at startup. Configuration is read exactly once,
//! before the identity is resolved; nothing re-reads the environment on the
//! request path.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `KMS_SECRET` | 12-word provisioning mnemonic injected by the KMS | Required unless a sealed key exists |
//! | `ATTESTATION_CONTRACT` | EIP-712 verifying contract address | Zero address |
//! | `CHAIN_ID` | EIP-712 chain id | `11155111` (Sepolia) |
//! | `HARDWARE_ATTESTATION_ENABLED` | Attempt real DCAP quotes via Gramine | `false` |
//! | `FORCE_MOCK_ATTESTATION` | Force the mock quote path even with hardware enabled | `false` |
//! | `SEALED_KEY_PATH` | Location of the sealed identity key file | `/data/identity/sealed_key.json` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use alloy::primitives::Address;
use thiserror::Error;

/// Environment variable name for the KMS-injected provisioning mnemonic.
///
/// The value must be exactly 12 space-separated BIP-39 words. Any other word
/// count is rejected at startup as a KMS injection failure.
pub const KMS_SECRET_ENV: &str = "KMS_SECRET";

/// Environment variable name for the EIP-712 verifying contract address.
pub const ATTESTATION_CONTRACT_ENV: &str = "ATTESTATION_CONTRACT";

/// Environment variable name for the EIP-712 chain id.
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";

/// Environment variable name for the hardware attestation toggle.
pub const HARDWARE_ATTESTATION_ENV: &str = "HARDWARE_ATTESTATION_ENABLED";

/// Environment variable name for forcing the mock attestation path.
pub const FORCE_MOCK_ATTESTATION_ENV: &str = "FORCE_MOCK_ATTESTATION";

/// Environment variable name for the sealed identity key file path.
///
/// The default lives under `/data`, which the Gramine manifest mounts as
/// `type = "encrypted"`, so the sealed record gets a second layer of
/// at-rest protection in production.
pub const SEALED_KEY_PATH_ENV: &str = "SEALED_KEY_PATH";

/// Default sealed key location inside the encrypted data mount.
pub const DEFAULT_SEALED_KEY_PATH: &str = "/data/identity/sealed_key.json";

/// Default EIP-712 chain id (Sepolia).
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Configuration error raised during startup validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The verifying contract address did not parse.
    #[error("invalid {ATTESTATION_CONTRACT_ENV}: {0}")]
    InvalidContractAddress(String),
    /// The chain id did not parse as an integer.
    #[error("invalid {CHAIN_ID_ENV}: {0}")]
    InvalidChainId(String),
    /// The port did not parse as an integer.
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
}

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// KMS-injected 12-word provisioning mnemonic, if present.
    pub kms_secret: Option<String>,
    /// EIP-712 verifying contract address.
    pub verifying_contract: Address,
    /// EIP-712 chain id.
    pub chain_id: u64,
    /// Whether real hardware quotes should be attempted.
    pub hardware_attestation_enabled: bool,
    /// Whether the mock quote path is forced regardless of hardware support.
    pub force_mock_attestation: bool,
    /// Path of the sealed identity key file.
    pub sealed_key_path: PathBuf,
    /// Server bind address.
    pub host: String,
    /// Server bind port.
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let kms_secret = env::var(KMS_SECRET_ENV).ok().filter(|s| !s.trim().is_empty());

        let verifying_contract = match env::var(ATTESTATION_CONTRACT_ENV) {
            Ok(raw) => Address::from_str(raw.trim())
                .map_err(|e| ConfigError::InvalidContractAddress(e.to_string()))?,
            Err(_) => Address::ZERO,
        };

        let chain_id = match env::var(CHAIN_ID_ENV) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidChainId(e.to_string()))?,
            Err(_) => DEFAULT_CHAIN_ID,
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidPort(e.to_string()))?,
            Err(_) => 8080,
        };

        Ok(Self {
            kms_secret,
            verifying_contract,
            chain_id,
            hardware_attestation_enabled: env_flag(HARDWARE_ATTESTATION_ENV),
            force_mock_attestation: env_flag(FORCE_MOCK_ATTESTATION_ENV),
            sealed_key_path: env::var(SEALED_KEY_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SEALED_KEY_PATH)),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
        })
    }
}

/// Parse a boolean environment flag. Accepts `1`/`true` (case-insensitive).
fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| {
            let v = v.trim().to_ascii_lowercase();
            v == "1" || v == "true"
        })
        .unwrap_or(false)
}
