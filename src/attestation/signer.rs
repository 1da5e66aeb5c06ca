// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-712 typed-data signing of score attestations.
//!
//! The domain and the `Attestation` struct layout must match the verifying
//! contract bit-exactly; a signature produced under a different chain id or
//! contract address recovers to a different signer, which is the intended
//! cross-context replay protection.

use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use alloy::sol;
use alloy::sol_types::{Eip712Domain, SolStruct};
use tracing::error;

use crate::identity::Identity;

use super::{now_unix, AttestationError};

/// EIP-712 domain name shared with the verifying contract.
pub const EIP712_DOMAIN_NAME: &str = "RTFM-Sovereign";

/// EIP-712 domain version shared with the verifying contract.
pub const EIP712_DOMAIN_VERSION: &str = "1";

/// Highest admissible score.
pub const MAX_SCORE: u64 = 100;

sol! {
    /// Must match the verifying contract's `Attestation` struct exactly.
    struct Attestation {
        address user;
        string topic;
        uint256 score;
        uint256 nonce;
        uint256 deadline;
    }
}

/// Input to attestation signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationData {
    /// Subject address the score is attested for.
    pub user: Address,
    /// Topic the score was evaluated on.
    pub topic: String,
    /// Evaluated score, 0..=100.
    pub score: u64,
    /// Per-subject replay-protection nonce.
    pub nonce: u64,
    /// Unix-seconds expiry of the attestation.
    pub deadline: u64,
}

/// A signed attestation, self-verified before being returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAttestation {
    /// 65-byte ECDSA signature (r || s || v) as `0x` + 130 hex characters.
    pub signature: String,
    /// The 32-byte EIP-712 signing hash of the attested struct.
    pub attestation_hash: B256,
}

/// Signs `Attestation` structs under a fixed EIP-712 domain.
pub struct TypedDataSigner {
    signer: PrivateKeySigner,
    address: Address,
    domain: Eip712Domain,
}

impl TypedDataSigner {
    /// Bind a signer to the enclave identity and the verifying contract.
    pub fn new(identity: &Identity, chain_id: u64, verifying_contract: Address) -> Self {
        let domain = Eip712Domain::new(
            Some(EIP712_DOMAIN_NAME.into()),
            Some(EIP712_DOMAIN_VERSION.into()),
            Some(U256::from(chain_id)),
            Some(verifying_contract),
            None,
        );
        Self {
            signer: identity.signer().clone(),
            address: identity.address(),
            domain,
        }
    }

    /// The signer's address; recovered signatures must equal this.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The EIP-712 signing hash of an attestation under this domain.
    pub fn signing_hash(&self, data: &AttestationData) -> B256 {
        attestation_struct(data).eip712_signing_hash(&self.domain)
    }

    /// Validate and sign an attestation.
    ///
    /// Validation order: score range, then deadline. Only after both pass is
    /// a signature computed, and it is recovered and checked against the
    /// identity address before being returned.
    pub fn sign(&self, data: &AttestationData) -> Result<SignedAttestation, AttestationError> {
        if data.score > MAX_SCORE {
            return Err(AttestationError::InvalidScore(data.score));
        }
        let now = now_unix();
        if data.deadline <= now {
            return Err(AttestationError::ExpiredDeadline {
                deadline: data.deadline,
                now,
            });
        }

        let hash = self.signing_hash(data);
        let signature = self.signer.sign_hash_sync(&hash)?;

        let recovered = signature
            .recover_address_from_prehash(&hash)
            .map_err(|_| AttestationError::SignatureCorruption)?;
        if recovered != self.address {
            error!(
                expected = %self.address,
                recovered = %recovered,
                "signature self-verification failed, refusing to return signature"
            );
            return Err(AttestationError::SignatureCorruption);
        }

        Ok(SignedAttestation {
            signature: format!("0x{}", alloy::hex::encode(signature.as_bytes())),
            attestation_hash: hash,
        })
    }
}

/// Map the domain type onto the solidity struct.
fn attestation_struct(data: &AttestationData) -> Attestation {
    Attestation {
        user: data.user,
        topic: data.topic.clone(),
        score: U256::from(data.score),
        nonce: U256::from(data.nonce),
        deadline: U256::from(data.deadline),
    }
}
