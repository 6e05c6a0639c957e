// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authentication routes.
//!
//! Session lifecycle: `callback` moves an anonymous browser to an
//! authenticated session, `refresh` renews it (or ends it if Strava rejects
//! the refresh token), `logout` ends it. `status` only inspects cookies.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::routes::session_failure;
use crate::session::TokenState;
use crate::time_utils::now_unix;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/auth/refresh", post(refresh))
        .route("/auth/status", get(status))
        .route("/auth/logout", post(logout))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub auth_url: String,
}

/// Build the Strava authorization URL for the frontend to navigate to.
async fn login(State(state): State<Arc<AppState>>) -> Result<Json<LoginResponse>> {
    let credentials = state.config.oauth_credentials()?;
    Ok(Json(LoginResponse {
        auth_url: state.strava.authorize_url(&credentials),
    }))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens and start the session.
async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    let frontend_url = &state.config.frontend_url;

    // User declined on the Strava consent screen
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        let redirect = format!("{}/?error={}", frontend_url, urlencoding::encode(&error));
        return Ok(Redirect::temporary(&redirect).into_response());
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("No code provided".to_string()))?;

    let credentials = state.config.oauth_credentials()?;

    tracing::info!("Exchanging authorization code for tokens");

    let exchange = match state.strava.exchange_code(&credentials, &code).await {
        Ok(exchange) => exchange,
        Err(e) => {
            tracing::error!(error = %e, "Token exchange failed");
            let redirect = format!("{}/?error=token_exchange_failed", frontend_url);
            return Ok(Redirect::temporary(&redirect).into_response());
        }
    };

    let athlete_id = exchange.athlete.id;
    let tokens = TokenState::from_grant(exchange.grant);
    let jar = state.cookies.persist(jar, &tokens, now_unix());
    let jar = state.cookies.persist_athlete(jar, athlete_id);

    tracing::info!(athlete_id, "OAuth successful, session cookies set");

    let redirect = format!("{}/?auth=success", frontend_url);
    Ok((jar, Redirect::temporary(&redirect)).into_response())
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RefreshResponse {
    pub access_token: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub expires_at: i64,
}

/// Exchange the refresh token cookie for new tokens.
async fn refresh(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let tokens = state.cookies.load(&jar);

    let Some(refresh_token) = tokens.refresh_token() else {
        tracing::info!("Refresh requested without a refresh token");
        return session_failure(
            &state.cookies,
            jar,
            AppError::RefreshFailed("No refresh token available".to_string()),
        );
    };

    let credentials = match state.config.oauth_credentials() {
        Ok(c) => c,
        Err(e) => return AppError::from(e).into_response(),
    };

    match state.strava.refresh_token(&credentials, refresh_token).await {
        Ok(grant) => {
            let refreshed = TokenState::from_grant(grant);
            let body = RefreshResponse {
                access_token: refreshed.access_token().unwrap_or_default().to_string(),
                expires_at: refreshed.expires_at().unwrap_or_default(),
            };
            let jar = state.cookies.persist(jar, &refreshed, now_unix());
            (jar, Json(body)).into_response()
        }
        Err(e) => session_failure(&state.cookies, jar, e),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub athlete_id: Option<String>,
}

/// Session status from cookie presence alone (no Strava call).
async fn status(State(state): State<Arc<AppState>>, jar: CookieJar) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        authenticated: state.cookies.load(&jar).is_authenticated(),
        athlete_id: state.cookies.athlete_id(&jar),
    })
}

/// Logout - expire every session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    (state.cookies.clear(jar), StatusCode::NO_CONTENT)
}
