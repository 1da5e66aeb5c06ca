// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`, `Deserialize`, and `ToSchema` for automatic JSON handling
//! and OpenAPI documentation. Field names serialize in camelCase to match
//! the web front-end and the on-chain tooling.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Identity Endpoint Models
// =============================================================================

/// Response for `GET /identity`: the enclave's public identity plus its
/// remote-attestation evidence.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    /// SEC1 uncompressed public key as `0x04…` hex.
    pub public_key: String,
    /// EIP-55 checksummed EVM address.
    pub address: String,
    /// Attestation evidence binding the key to the enclave.
    pub attestation: QuoteReport,
    /// Service version.
    pub version: String,
}

/// Attestation evidence served with the identity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteReport {
    /// Base64 quote blob as produced by the quote provider.
    pub report: String,
    /// Placeholder until quotes are countersigned by the attestation
    /// verification service.
    pub signature: String,
}

// =============================================================================
// Attest Endpoint Models
// =============================================================================

/// Request body for `POST /attest`: a graded challenge submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttestRequest {
    /// Subject address the attestation is issued for.
    pub user_address: String,
    /// Topic the challenge belongs to.
    pub topic: String,
    /// Identifier of the graded challenge.
    pub challenge_id: String,
    /// Submitted answers, in challenge order.
    pub answers: Vec<String>,
}

/// Response body for `POST /attest`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttestResponse {
    /// Always `true` on a 2xx response.
    pub success: bool,
    /// Evaluated score, 0..=100.
    pub score: u64,
    /// Whether the score clears the pass threshold.
    pub passed: bool,
    /// The signed attestation for on-chain submission.
    pub attestation: AttestationReceipt,
}

/// The signed attestation material a client forwards on-chain.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttestationReceipt {
    /// 65-byte ECDSA signature as `0x` + 130 hex characters.
    pub signature: String,
    /// Replay-protection nonce, stringified for JS number-safety.
    pub nonce: String,
    /// Unix-seconds deadline the signature is valid until.
    pub deadline: u64,
    /// EIP-712 signing hash of the attested struct, `0x` + 64 hex.
    pub attestation_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attest_request_deserializes_camel_case() {
        let request: AttestRequest = serde_json::from_str(
            r#"{
                "userAddress": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
                "topic": "rust-ownership",
                "challengeId": "ch-7",
                "answers": ["a", "b"]
            }"#,
        )
        .expect("deserialize");

        assert_eq!(request.challenge_id, "ch-7");
        assert_eq!(request.answers.len(), 2);
    }

    #[test]
    fn attest_response_serializes_camel_case() {
        let response = AttestResponse {
            success: true,
            score: 85,
            passed: true,
            attestation: AttestationReceipt {
                signature: "0xab".into(),
                nonce: "1".into(),
                deadline: 1_800_000_000,
                attestation_hash: "0xcd".into(),
            },
        };

        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["attestation"]["nonce"], "1");
        assert!(json["attestation"].get("attestationHash").is_some());
    }

    #[test]
    fn identity_response_serializes_camel_case() {
        let response = IdentityResponse {
            public_key: "0x04".into(),
            address: "0xf39F".into(),
            attestation: QuoteReport {
                report: "AAAA".into(),
                signature: "pending".into(),
            },
            version: "0.1.0".into(),
        };

        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json.get("publicKey").is_some());
        assert!(json["attestation"].get("report").is_some());
    }
}
