// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The enclave signing identity: a secp256k1 keypair and its EVM address.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use super::IdentityError;

/// The process-wide signing identity.
///
/// Constructed once at startup and passed explicitly to every component that
/// signs or proves. The wrapped key never appears in logs or API responses;
/// the `Debug` impl prints only the derived address.
pub struct Identity {
    signer: PrivateKeySigner,
}

impl Identity {
    /// Wrap an already-derived local signer.
    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Reconstruct an identity from raw 32-byte secret key material.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, IdentityError> {
        let signer = PrivateKeySigner::from_slice(bytes)
            .map_err(|e| IdentityError::InvalidKeyMaterial(e.to_string()))?;
        Ok(Self { signer })
    }

    /// The EVM address derived from the public key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The uncompressed public key without the `0x04` SEC1 prefix (64 bytes).
    ///
    /// This is the form embedded in the quote's report-data slot.
    pub fn public_key_uncompressed(&self) -> [u8; 64] {
        let point = self.signer.credential().verifying_key().to_encoded_point(false);
        let mut out = [0u8; 64];
        out.copy_from_slice(&point.as_bytes()[1..]);
        out
    }

    /// The full SEC1 uncompressed public key as `0x04…` hex (132 characters).
    pub fn public_key_hex(&self) -> String {
        let point = self.signer.credential().verifying_key().to_encoded_point(false);
        format!("0x{}", alloy::hex::encode(point.as_bytes()))
    }

    /// Raw 32-byte secret key material, used only by the sealer at startup.
    pub(crate) fn secret_bytes(&self) -> [u8; 32] {
        self.signer.credential().to_bytes().into()
    }

    /// The underlying local signer.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
