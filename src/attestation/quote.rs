// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote-attestation quote acquisition.
//!
//! Two paths, chosen once at construction time from configuration:
//!
//! - **Hardware**: DCAP quotes via Gramine's `/dev/attestation` pseudo-files.
//!   Any failure surfaces as `ATTESTATION_HARDWARE_UNAVAILABLE`; there is no
//!   silent fallback to the mock, because a downgraded quote would defeat the
//!   security signal.
//! - **Mock**: a deterministic buffer laid out like a DCAP v3 SGX quote, so
//!   the measurement and report-data offsets are bit-compatible with code
//!   that parses real quotes. The same identity always yields the same
//!   measurement, which keeps tests reproducible without hardware.

use std::time::Duration;

use alloy::primitives::Address;
use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::time::timeout;
use utoipa::ToSchema;

use crate::identity::Identity;
use crate::config::Config;

use super::AttestationError;

/// Total size of a DCAP v3 quote body: 48-byte header + 384-byte SGX report.
const QUOTE_SIZE: usize = 432;

/// Absolute offset of the MRENCLAVE slot (report-body offset 64).
const MRENCLAVE_OFFSET: usize = 112;

/// Absolute offset of the 64-byte report-data slot (report-body offset 320).
const REPORT_DATA_OFFSET: usize = 368;

/// Intel's well-known QE vendor id, placed in the mock header for layout
/// fidelity.
const QE_VENDOR_ID: [u8; 16] = [
    0x93, 0x9a, 0x72, 0x33, 0xf7, 0x9c, 0x4c, 0xa9, 0x94, 0x0a, 0x0d, 0xb3, 0x95, 0x7f, 0x06,
    0x07,
];

/// Domain-separation label for the mock measurement hash.
const ENCLAVE_LABEL: &[u8] = b"sovereign-enclave-measurement-v1";

/// Gramine pseudo-file accepting the 64-byte user report data.
const GRAMINE_USER_REPORT_DATA: &str = "/dev/attestation/user_report_data";

/// Gramine pseudo-file serving the DCAP quote.
const GRAMINE_QUOTE: &str = "/dev/attestation/quote";

/// Upper bound on a hardware quote round-trip before it fails as unavailable.
const HARDWARE_QUOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// A remote-attestation quote binding the enclave public key to a
/// measurement of the environment that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttestationQuote {
    /// Base64-encoded opaque quote blob.
    pub quote: String,
    /// SEC1 uncompressed public key as `0x04…` hex.
    pub public_key: String,
    /// 32-byte enclave measurement as `0x` + 64 hex characters.
    pub measurement: String,
}

/// Quote acquisition strategy, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteProvider {
    /// Deterministic mock quote in the DCAP v3 layout.
    Mock,
    /// Real DCAP quote via the Gramine attestation pseudo-files.
    Hardware,
}

impl QuoteProvider {
    /// Select the provider from runtime configuration.
    ///
    /// The real path is used only when hardware attestation is enabled and
    /// the mock is not forced.
    pub fn from_config(config: &Config) -> Self {
        if config.hardware_attestation_enabled && !config.force_mock_attestation {
            QuoteProvider::Hardware
        } else {
            QuoteProvider::Mock
        }
    }

    /// Produce a quote for the given identity.
    ///
    /// Repeated calls against the same identity and mode return identical
    /// `public_key` and `measurement` values.
    pub async fn get_quote(&self, identity: &Identity) -> Result<AttestationQuote, AttestationError> {
        match self {
            QuoteProvider::Mock => Ok(mock_quote(identity)),
            QuoteProvider::Hardware => hardware_quote(identity).await,
        }
    }
}

/// Build the deterministic mock quote for an identity.
fn mock_quote(identity: &Identity) -> AttestationQuote {
    let measurement = mock_measurement(&identity.address());
    let report_data = identity.public_key_uncompressed();

    let mut buf = [0u8; QUOTE_SIZE];
    // DCAP v3 header: version 3, ECDSA-P256 attestation key type.
    buf[0..2].copy_from_slice(&3u16.to_le_bytes());
    buf[2..4].copy_from_slice(&2u16.to_le_bytes());
    buf[12..28].copy_from_slice(&QE_VENDOR_ID);
    buf[MRENCLAVE_OFFSET..MRENCLAVE_OFFSET + 32].copy_from_slice(&measurement);
    buf[REPORT_DATA_OFFSET..REPORT_DATA_OFFSET + 64].copy_from_slice(&report_data);

    AttestationQuote {
        quote: Base64::encode_string(&buf),
        public_key: identity.public_key_hex(),
        measurement: format!("0x{}", alloy::hex::encode(measurement)),
    }
}

/// Deterministic per-identity mock measurement:
/// SHA-256(lowercase 0x-address || enclave label).
fn mock_measurement(address: &Address) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(format!("{address:#x}").as_bytes());
    hasher.update(ENCLAVE_LABEL);
    hasher.finalize().into()
}

/// Fetch a real DCAP quote through Gramine, bounded by a timeout.
async fn hardware_quote(identity: &Identity) -> Result<AttestationQuote, AttestationError> {
    let report_data = identity.public_key_uncompressed();
    let public_key = identity.public_key_hex();

    let fetch = tokio::task::spawn_blocking(move || read_gramine_quote(&report_data));

    let raw = timeout(HARDWARE_QUOTE_TIMEOUT, fetch)
        .await
        .map_err(|_| {
            AttestationError::HardwareUnavailable("quote request timed out".to_string())
        })?
        .map_err(|e| AttestationError::HardwareUnavailable(e.to_string()))??;

    if raw.len() < QUOTE_SIZE {
        return Err(AttestationError::HardwareUnavailable(format!(
            "quote too short: {} bytes",
            raw.len()
        )));
    }

    let mut measurement = [0u8; 32];
    measurement.copy_from_slice(&raw[MRENCLAVE_OFFSET..MRENCLAVE_OFFSET + 32]);

    Ok(AttestationQuote {
        quote: Base64::encode_string(&raw),
        public_key,
        measurement: format!("0x{}", alloy::hex::encode(measurement)),
    })
}

/// Blocking Gramine round-trip: submit report data, read back the quote.
fn read_gramine_quote(report_data: &[u8; 64]) -> Result<Vec<u8>, AttestationError> {
    std::fs::write(GRAMINE_USER_REPORT_DATA, report_data).map_err(|e| {
        AttestationError::HardwareUnavailable(format!("writing report data: {e}"))
    })?;
    std::fs::read(GRAMINE_QUOTE)
        .map_err(|e| AttestationError::HardwareUnavailable(format!("reading quote: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn test_identity() -> Identity {
        let mut key = [0u8; 32];
        key[31] = 9;
        Identity::from_secret_bytes(&key).expect("valid key")
    }

    fn test_config(hardware: bool, force_mock: bool) -> Config {
        Config {
            kms_secret: None,
            verifying_contract: Address::ZERO,
            chain_id: crate::config::DEFAULT_CHAIN_ID,
            hardware_attestation_enabled: hardware,
            force_mock_attestation: force_mock,
            sealed_key_path: "/tmp/unused".into(),
            host: "127.0.0.1".into(),
            port: 0,
        }
    }

    #[test]
    fn provider_selection_follows_flags() {
        assert_eq!(
            QuoteProvider::from_config(&test_config(false, false)),
            QuoteProvider::Mock
        );
        assert_eq!(
            QuoteProvider::from_config(&test_config(false, true)),
            QuoteProvider::Mock
        );
        assert_eq!(
            QuoteProvider::from_config(&test_config(true, true)),
            QuoteProvider::Mock
        );
        assert_eq!(
            QuoteProvider::from_config(&test_config(true, false)),
            QuoteProvider::Hardware
        );
    }

    #[tokio::test]
    async fn mock_quote_is_deterministic() {
        let identity = test_identity();
        let provider = QuoteProvider::Mock;

        let one = provider.get_quote(&identity).await.expect("quote");
        let two = provider.get_quote(&identity).await.expect("quote");

        assert_eq!(one.public_key, two.public_key);
        assert_eq!(one.measurement, two.measurement);
        assert_eq!(one.quote, two.quote);
    }

    #[tokio::test]
    async fn mock_quote_decodes_to_dcap_layout() {
        let identity = test_identity();
        let quote = QuoteProvider::Mock.get_quote(&identity).await.expect("quote");

        let raw = STANDARD.decode(&quote.quote).expect("valid base64");
        assert_eq!(raw.len(), QUOTE_SIZE);

        // Header: version 3, key type 2.
        assert_eq!(u16::from_le_bytes([raw[0], raw[1]]), 3);
        assert_eq!(u16::from_le_bytes([raw[2], raw[3]]), 2);
        assert_eq!(&raw[12..28], &QE_VENDOR_ID);
    }

    #[tokio::test]
    async fn measurement_slot_matches_reported_measurement() {
        let identity = test_identity();
        let quote = QuoteProvider::Mock.get_quote(&identity).await.expect("quote");

        let raw = STANDARD.decode(&quote.quote).expect("valid base64");
        let embedded = alloy::hex::encode(&raw[MRENCLAVE_OFFSET..MRENCLAVE_OFFSET + 32]);
        assert_eq!(quote.measurement, format!("0x{embedded}"));
        assert_eq!(quote.measurement.len(), 66);
    }

    #[tokio::test]
    async fn report_data_slot_carries_public_key() {
        let identity = test_identity();
        let quote = QuoteProvider::Mock.get_quote(&identity).await.expect("quote");

        let raw = STANDARD.decode(&quote.quote).expect("valid base64");
        assert_eq!(
            &raw[REPORT_DATA_OFFSET..REPORT_DATA_OFFSET + 64],
            identity.public_key_uncompressed().as_slice()
        );
        assert_eq!(quote.public_key, identity.public_key_hex());
    }

    #[tokio::test]
    async fn different_identities_yield_different_measurements() {
        let a = test_identity();
        let mut key = [0u8; 32];
        key[31] = 10;
        let b = Identity::from_secret_bytes(&key).expect("valid key");

        let qa = QuoteProvider::Mock.get_quote(&a).await.expect("quote");
        let qb = QuoteProvider::Mock.get_quote(&b).await.expect("quote");
        assert_ne!(qa.measurement, qb.measurement);
    }

    #[tokio::test]
    async fn hardware_path_fails_without_gramine() {
        // No /dev/attestation in a plain test environment: the hardware path
        // must surface unavailability, not fall back to the mock.
        let identity = test_identity();
        let err = QuoteProvider::Hardware
            .get_quote(&identity)
            .await
            .expect_err("no gramine device");
        assert_eq!(err.error_code(), "ATTESTATION_HARDWARE_UNAVAILABLE");
    }

    #[test]
    fn quote_serializes_with_camel_case_keys() {
        let quote = AttestationQuote {
            quote: "AAAA".into(),
            public_key: "0x04".into(),
            measurement: "0x00".into(),
        };
        let json = serde_json::to_value(&quote).expect("serialize");
        assert!(json.get("publicKey").is_some());
        assert!(json.get("measurement").is_some());
    }
}
