// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No usable access token; the user must (re)connect.
    #[error("Authentication required")]
    Unauthenticated,

    /// The provider rejected the refresh token. Terminal for the session.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Non-2xx response from Strava.
    #[error("Strava API error (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Network or decoding failure talking to Strava.
    #[error("Strava transport error: {0}")]
    Transport(String),
}

impl AppError {
    /// Whether this error means the session is no longer usable and the
    /// session cookies should be cleared.
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            AppError::Unauthenticated
                | AppError::RefreshFailed(_)
                | AppError::Upstream { status: 401, .. }
        )
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Authentication required. Please log in with Strava.",
                None,
            ),
            AppError::RefreshFailed(msg) => {
                tracing::warn!(error = %msg, "Session refresh rejected");
                (
                    StatusCode::UNAUTHORIZED,
                    "Authentication required",
                    Some("Failed to refresh token".to_string()),
                )
            }
            AppError::Upstream { status: 401, body } => {
                tracing::warn!(body = %body, "Strava rejected access token");
                (
                    StatusCode::UNAUTHORIZED,
                    "Authentication required",
                    Some("Strava rejected the access token".to_string()),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str(), None),
            AppError::Upstream { status, body } => {
                tracing::error!(status, body = %body, "Strava API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch data from Strava",
                    None,
                )
            }
            AppError::Transport(msg) => {
                tracing::error!(error = %msg, "Strava transport error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch data from Strava",
                    None,
                )
            }
            AppError::Configuration(err) => {
                tracing::error!(error = %err, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server is not configured for Strava",
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
