// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API error envelope and the mapping from domain errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::attestation::AttestationError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }
}

impl From<AttestationError> for ApiError {
    fn from(e: AttestationError) -> Self {
        let code = e.error_code();
        let status = match &e {
            AttestationError::InvalidScore(_) | AttestationError::ExpiredDeadline { .. } => {
                StatusCode::BAD_REQUEST
            }
            AttestationError::HardwareUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AttestationError::SignatureCorruption | AttestationError::Signer(_) => {
                // Operator signal: a signing failure inside the enclave is a
                // cryptographic bug, not a caller mistake.
                error!(error_code = code, error = %e, "attestation signing failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, code, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code.to_string(),
        });
        (self.status, body).into_response()
    }
}
