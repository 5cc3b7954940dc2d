// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiResponse;
use crate::registry::RegistryError;

/// Failure reported through the response envelope.
///
/// Clients read the outcome from the envelope `code`; the HTTP status of the
/// response is always `200 OK`.
#[derive(Debug)]
pub struct ApiError {
    pub code: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation(message) => Self::bad_request(message),
            // Unknown accounts share code 400 with other client errors.
            RegistryError::AccountNotFound(_) => Self::bad_request("Account does not exist"),
            RegistryError::InvalidSignature => Self::unauthorized("Signature verification failed"),
            RegistryError::ChainUnavailable(e) => {
                tracing::warn!(error = %e, "Chain unavailable");
                Self::service_unavailable("Chain is unavailable")
            }
            RegistryError::Store(e) => {
                tracing::error!(error = %e, "Registry storage failure");
                Self::internal("Storage failure")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse {
            code: self.code.as_u16(),
            data: 0,
            msg: self.message,
        });
        (StatusCode::OK, body).into_response()
    }
}
