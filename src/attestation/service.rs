// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The composed attestation entry point.
//!
//! [`AttestationService`] pairs the nonce registry with the typed-data
//! signer. Replay-protection policy (monotonic counters) stays separable
//! from signing mechanics: the signer never consults or mutates the
//! registry, it only signs what it is handed.

use alloy::primitives::Address;

use crate::config::Config;
use crate::identity::Identity;

use super::{
    now_unix, AttestationData, AttestationError, NonceRegistry, SignedAttestation,
    TypedDataSigner,
};

/// Attestations are valid for one hour from issuance.
pub const ATTESTATION_VALIDITY_SECS: u64 = 3600;

/// Issues signed score attestations; the only entry point surrounding code
/// should call.
pub struct AttestationService {
    signer: TypedDataSigner,
    nonces: NonceRegistry,
}

impl AttestationService {
    /// Build the service for an identity and the configured EIP-712 domain.
    pub fn new(identity: &Identity, config: &Config) -> Self {
        Self {
            signer: TypedDataSigner::new(identity, config.chain_id, config.verifying_contract),
            nonces: NonceRegistry::new(),
        }
    }

    /// Issue the next replay-protection nonce for a subject.
    pub fn issue_next_nonce(&self, subject: Address) -> u64 {
        self.nonces.issue_next(subject)
    }

    /// Sign pre-assembled attestation data.
    pub fn sign(&self, data: &AttestationData) -> Result<SignedAttestation, AttestationError> {
        self.signer.sign(data)
    }

    /// Attest an evaluated score for a subject.
    ///
    /// Draws the next nonce, stamps a one-hour deadline, signs, and returns
    /// both the data that was signed and the signature over it.
    pub fn attest_score(
        &self,
        user: Address,
        topic: &str,
        score: u64,
    ) -> Result<(AttestationData, SignedAttestation), AttestationError> {
        let data = AttestationData {
            user,
            topic: topic.to_string(),
            score,
            nonce: self.issue_next_nonce(user),
            deadline: now_unix() + ATTESTATION_VALIDITY_SECS,
        };
        let signed = self.sign(&data)?;
        Ok((data, signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Signature;
    use std::str::FromStr;

    fn test_service() -> (Identity, AttestationService) {
        let mut key = [0u8; 32];
        key[31] = 13;
        let identity = Identity::from_secret_bytes(&key).expect("valid key");
        let config = Config {
            kms_secret: None,
            verifying_contract: Address::from_str("0x5FbDB2315678afecb367f032d93F642f64180aa3")
                .unwrap(),
            chain_id: crate::config::DEFAULT_CHAIN_ID,
            hardware_attestation_enabled: false,
            force_mock_attestation: false,
            sealed_key_path: "/tmp/unused".into(),
            host: "127.0.0.1".into(),
            port: 0,
        };
        let service = AttestationService::new(&identity, &config);
        (identity, service)
    }

    #[test]
    fn attest_score_draws_sequential_nonces() {
        let (_, service) = test_service();
        let user = Address::repeat_byte(0x21);

        let (first, _) = service.attest_score(user, "rust-ownership", 90).expect("attest");
        let (second, _) = service.attest_score(user, "rust-ownership", 95).expect("attest");

        assert_eq!(first.nonce, 1);
        assert_eq!(second.nonce, 2);
    }

    #[test]
    fn attest_score_stamps_one_hour_deadline() {
        let (_, service) = test_service();
        let before = now_unix();

        let (data, _) = service
            .attest_score(Address::repeat_byte(0x22), "solidity-basics", 70)
            .expect("attest");

        assert!(data.deadline >= before + ATTESTATION_VALIDITY_SECS);
        assert!(data.deadline <= now_unix() + ATTESTATION_VALIDITY_SECS);
    }

    #[test]
    fn attest_score_signature_recovers_to_identity() {
        let (identity, service) = test_service();

        let (_, signed) = service
            .attest_score(Address::repeat_byte(0x23), "evm-internals", 100)
            .expect("attest");

        let sig = Signature::from_str(&signed.signature).expect("parse");
        assert_eq!(
            sig.recover_address_from_prehash(&signed.attestation_hash)
                .expect("recover"),
            identity.address()
        );
    }

    #[test]
    fn invalid_score_surfaces_without_consuming_a_signature() {
        let (_, service) = test_service();
        let user = Address::repeat_byte(0x24);

        let err = service.attest_score(user, "topic", 101).expect_err("must fail");
        assert_eq!(err.error_code(), "INVALID_SCORE");

        // The nonce was drawn before validation; the next successful
        // attestation continues the sequence.
        let (data, _) = service.attest_score(user, "topic", 50).expect("attest");
        assert_eq!(data.nonce, 2);
    }

    #[test]
    fn nonces_are_per_subject() {
        let (_, service) = test_service();

        let (a1, _) = service
            .attest_score(Address::repeat_byte(0x25), "topic", 10)
            .expect("attest");
        let (b1, _) = service
            .attest_score(Address::repeat_byte(0x26), "topic", 20)
            .expect("attest");

        assert_eq!(a1.nonce, 1);
        assert_eq!(b1.nonce, 1);
    }
}
