// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::attestation::QuoteProvider;
use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Sealed key storage directory availability.
    pub sealed_storage: String,
    /// Active quote path ("mock" or "hardware").
    pub attestation: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Check that the sealed key's parent directory is present.
///
/// The directory is created when the identity is first sealed; a missing
/// directory means the process is running in memory-only persistence mode.
fn check_sealed_storage(state: &AppState) -> String {
    match state.config.sealed_key_path.parent() {
        Some(parent) if parent.exists() => "ok".to_string(),
        Some(_) => "missing".to_string(),
        None => "ok".to_string(),
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is degraded", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let sealed_storage = check_sealed_storage(&state);
    let all_ok = sealed_storage == "ok";

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            sealed_storage,
            attestation: match *state.quotes {
                QuoteProvider::Mock => "mock".to_string(),
                QuoteProvider::Hardware => "hardware".to_string(),
            },
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use readiness for that.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only if all dependencies are available.
/// Use for Kubernetes readiness probes.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;

    #[tokio::test]
    async fn liveness_always_ok() {
        let Json(response) = liveness().await;
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn health_reports_quote_mode() {
        let state = test_state();
        let (status, Json(response)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.checks.service, "ok");
        assert_eq!(response.checks.attestation, "mock");
    }
}
