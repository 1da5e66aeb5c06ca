// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::str::FromStr;

use alloy::primitives::Address;
use axum::{extract::State, Json};
use tracing::info;

use crate::{
    error::ApiError,
    models::{AttestRequest, AttestResponse, AttestationReceipt},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/attest",
    request_body = AttestRequest,
    tag = "Attestations",
    responses(
        (status = 200, description = "Graded and signed attestation", body = AttestResponse),
        (status = 400, description = "Invalid address, score, or deadline"),
        (status = 500, description = "Signature self-verification failure")
    )
)]
pub async fn attest(
    State(state): State<AppState>,
    Json(request): Json<AttestRequest>,
) -> Result<Json<AttestResponse>, ApiError> {
    let user = Address::from_str(request.user_address.trim()).map_err(|_| {
        ApiError::bad_request("INVALID_ADDRESS", "userAddress must be a valid EVM address")
    })?;

    let outcome = state
        .grader
        .grade(&request.topic, &request.challenge_id, &request.answers);

    let (data, signed) = state
        .attestations
        .attest_score(user, &request.topic, outcome.score)?;

    info!(
        user = %user,
        topic = %request.topic,
        score = outcome.score,
        nonce = data.nonce,
        "issued score attestation"
    );

    Ok(Json(AttestResponse {
        success: true,
        score: outcome.score,
        passed: outcome.passed,
        attestation: AttestationReceipt {
            signature: signed.signature,
            nonce: data.nonce.to_string(),
            deadline: data.deadline,
            attestation_hash: format!("{:#x}", signed.attestation_hash),
        },
    }))
}
