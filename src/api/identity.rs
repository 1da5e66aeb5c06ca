// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::{IdentityResponse, QuoteReport},
    state::AppState,
};

/// Placeholder until quotes are countersigned by the attestation
/// verification service.
const REPORT_SIGNATURE_PLACEHOLDER: &str = "unverified";

#[utoipa::path(
    get,
    path = "/identity",
    tag = "Identity",
    responses(
        (status = 200, description = "Enclave identity and attestation evidence", body = IdentityResponse),
        (status = 503, description = "Hardware attestation unavailable")
    )
)]
pub async fn get_identity(
    State(state): State<AppState>,
) -> Result<Json<IdentityResponse>, ApiError> {
    let quote = state.quotes.get_quote(&state.identity).await?;

    Ok(Json(IdentityResponse {
        public_key: quote.public_key,
        address: state.identity.address().to_string(),
        attestation: QuoteReport {
            report: quote.quote,
            signature: REPORT_SIGNATURE_PLACEHOLDER.to_string(),
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;

    #[tokio::test]
    async fn identity_endpoint_returns_key_address_and_quote() {
        let state = test_state();
        let expected_address = state.identity.address().to_string();
        let expected_key = state.identity.public_key_hex();

        let Json(response) = get_identity(State(state)).await.expect("identity");

        assert_eq!(response.address, expected_address);
        assert_eq!(response.public_key, expected_key);
        assert!(!response.attestation.report.is_empty());
        assert_eq!(response.attestation.signature, REPORT_SIGNATURE_PLACEHOLDER);
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn identity_endpoint_is_stable_across_calls() {
        let state = test_state();

        let Json(one) = get_identity(State(state.clone())).await.expect("identity");
        let Json(two) = get_identity(State(state)).await.expect("identity");

        assert_eq!(one.public_key, two.public_key);
        assert_eq!(one.address, two.address);
        assert_eq!(one.attestation.report, two.attestation.report);
    }
}
