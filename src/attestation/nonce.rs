// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-subject replay-protection nonces.
//!
//! Counters live in memory for the process lifetime and reset to zero on
//! restart; the verifying contract's own nonce tracking is what makes that
//! reset safe to tolerate. Issuance is an exclusive atomic increment per
//! subject, and distinct subjects never contend on the same counter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use alloy::primitives::Address;

/// Strictly increasing per-subject nonce issuance.
#[derive(Debug, Default)]
pub struct NonceRegistry {
    counters: RwLock<HashMap<Address, Arc<AtomicU64>>>,
}

impl NonceRegistry {
    /// Create an empty registry; every subject starts at nonce 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next nonce for a subject.
    ///
    /// The first nonce for an unseen subject is 1. Concurrent calls for the
    /// same subject serialize on the atomic counter, so no two callers ever
    /// receive the same value.
    pub fn issue_next(&self, subject: Address) -> u64 {
        let existing = {
            let map = self
                .counters
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            map.get(&subject).cloned()
        };

        let counter = match existing {
            Some(counter) => counter,
            None => {
                let mut map = self
                    .counters
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                Arc::clone(map.entry(subject).or_insert_with(|| Arc::new(AtomicU64::new(0))))
            }
        };

        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The last nonce issued for a subject, 0 if unseen.
    pub fn last_issued(&self, subject: &Address) -> u64 {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}
