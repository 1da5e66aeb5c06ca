// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::attestation::{AttestationService, QuoteProvider};
use crate::config::Config;
use crate::grading::{Grader, LocalGrader};
use crate::identity::Identity;

/// Shared application state.
///
/// The identity is resolved once before the router is built; everything in
/// here is read-only after construction except the nonce counters inside
/// the attestation service.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<Identity>,
    pub quotes: Arc<QuoteProvider>,
    pub attestations: Arc<AttestationService>,
    pub grader: Arc<dyn Grader>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the state from a resolved identity and runtime configuration.
    pub fn new(identity: Identity, config: Config) -> Self {
        let attestations = AttestationService::new(&identity, &config);
        let quotes = QuoteProvider::from_config(&config);
        Self {
            identity: Arc::new(identity),
            quotes: Arc::new(quotes),
            attestations: Arc::new(attestations),
            grader: Arc::new(LocalGrader),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use alloy::primitives::Address;
    use std::str::FromStr;

    /// State wired from a synthetic key, for handler tests.
    pub fn test_state() -> AppState {
        let mut key = [0u8; 32];
        key[31] = 17;
        let identity = Identity::from_secret_bytes(&key).expect("valid key");
        let config = Config {
            kms_secret: None,
            verifying_contract: Address::from_str(
                "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            )
            .unwrap(),
            chain_id: crate::config::DEFAULT_CHAIN_ID,
            hardware_attestation_enabled: false,
            force_mock_attestation: false,
            sealed_key_path: std::env::temp_dir().join("sovereign-test-sealed.json"),
            host: "127.0.0.1".into(),
            port: 0,
        };
        AppState::new(identity, config)
    }
}
