// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AttestRequest, AttestResponse, AttestationReceipt, IdentityResponse, QuoteReport,
    },
    state::AppState,
};

pub mod attest;
pub mod health;
pub mod identity;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/identity", get(identity::get_identity))
        .route("/attest", post(attest::attest))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        identity::get_identity,
        attest::attest,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            IdentityResponse,
            QuoteReport,
            AttestRequest,
            AttestResponse,
            AttestationReceipt
        )
    ),
    tags(
        (name = "Identity", description = "Enclave identity and attestation evidence"),
        (name = "Attestations", description = "Signed score attestations"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state());
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }
}
