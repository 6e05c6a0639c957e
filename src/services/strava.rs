// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client with token lifecycle handling.
//!
//! Handles:
//! - OAuth authorization URL, code exchange and token refresh
//! - Proactive refresh when the access token is within the safety window
//! - One refresh-and-retry when Strava reports the access token invalid

use crate::config::{Config, OAuthCredentials};
use crate::error::{AppError, Result};
use crate::session::{TokenGrant, TokenState};
use crate::time_utils::now_unix;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;

/// Margin before token expiration when we proactively refresh (5 minutes).
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Scopes requested at login.
pub const OAUTH_SCOPE: &str = "read,activity:read_all,profile:read_all";

/// Strava HTTP transport. Cheap to clone; holds no session state.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
}

impl StravaClient {
    pub fn new(api_base: impl Into<String>, oauth_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            oauth_base: oauth_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.strava_api_base, &config.strava_oauth_base)
    }

    /// Build the Strava authorization URL the browser is sent to.
    pub fn authorize_url(&self, credentials: &OAuthCredentials) -> String {
        format!(
            "{}/authorize?\
             client_id={}&\
             response_type=code&\
             redirect_uri={}&\
             approval_prompt=force&\
             scope={}",
            self.oauth_base,
            urlencoding::encode(&credentials.client_id),
            urlencoding::encode(&credentials.redirect_uri),
            OAUTH_SCOPE
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        credentials: &OAuthCredentials,
        code: &str,
    ) -> Result<TokenExchange> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_base))
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, body = %body, "Strava token exchange failed");
            return Err(AppError::Upstream { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to parse token response: {}", e)))
    }

    /// Exchange a refresh token for a new token triple.
    ///
    /// A non-2xx answer means Strava rejected the refresh token and maps to
    /// [`AppError::RefreshFailed`].
    pub async fn refresh_token(
        &self,
        credentials: &OAuthCredentials,
        refresh_token: &str,
    ) -> Result<TokenGrant> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_base))
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RefreshFailed(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to parse refresh response: {}", e)))
    }

    /// Authenticated GET; returns the status and raw body.
    async fn get(
        &self,
        access_token: &str,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<(u16, String)> {
        let response = self
            .http
            .get(format!("{}{}", self.api_base, endpoint))
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchange {
    #[serde(flatten)]
    pub grant: TokenGrant,
    pub athlete: StravaAthlete,
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Token refresh seam
// ─────────────────────────────────────────────────────────────────────────────

/// Something that can mint a fresh access token.
pub trait TokenRefresher {
    /// `refresh_token` is whatever the session currently holds; refreshers
    /// that keep the refresh token elsewhere may ignore it.
    fn refresh(
        &self,
        refresh_token: Option<&str>,
    ) -> impl Future<Output = Result<TokenGrant>> + Send;
}

/// Refreshes directly against Strava's token endpoint (server side).
#[derive(Clone)]
pub struct ProviderRefresher {
    client: StravaClient,
    credentials: OAuthCredentials,
}

impl ProviderRefresher {
    pub fn new(client: StravaClient, credentials: OAuthCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

impl TokenRefresher for ProviderRefresher {
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenGrant> {
        let refresh_token = refresh_token
            .ok_or_else(|| AppError::RefreshFailed("No refresh token available".to_string()))?;
        self.client
            .refresh_token(&self.credentials, refresh_token)
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Retry policy
// ─────────────────────────────────────────────────────────────────────────────

/// Where a fetch is in its single-retry lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    /// First request with the token on record.
    Attempt,
    /// Request re-issued after a refresh.
    Retry,
}

/// Classified result of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// 401 with Strava's structured "access_token invalid" body.
    TokenInvalid,
    Failure,
}

/// What the fetch loop does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    Done,
    RefreshAndRetry,
    Fatal,
}

impl RetryPhase {
    pub fn next(self, outcome: AttemptOutcome) -> RetryStep {
        match (self, outcome) {
            (_, AttemptOutcome::Success) => RetryStep::Done,
            (RetryPhase::Attempt, AttemptOutcome::TokenInvalid) => RetryStep::RefreshAndRetry,
            (RetryPhase::Retry, AttemptOutcome::TokenInvalid) | (_, AttemptOutcome::Failure) => {
                RetryStep::Fatal
            }
        }
    }
}

/// Strava's error envelope.
#[derive(Debug, Deserialize)]
struct Fault {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<FaultDetail>,
}

#[derive(Debug, Deserialize)]
struct FaultDetail {
    #[serde(default)]
    field: String,
    #[serde(default)]
    code: String,
}

/// Whether a 401 body is Strava's "access token invalid" error, as opposed to
/// any other authorization failure (missing scope, revoked app, ...).
pub fn is_invalid_token_fault(body: &str) -> bool {
    serde_json::from_str::<Fault>(body).is_ok_and(|fault| {
        fault.message == "Authorization Error"
            && fault
                .errors
                .iter()
                .any(|e| e.field == "access_token" && e.code == "invalid")
    })
}

fn classify(status: u16, body: &str) -> AttemptOutcome {
    match status {
        200..=299 => AttemptOutcome::Success,
        401 if is_invalid_token_fault(body) => AttemptOutcome::TokenInvalid,
        _ => AttemptOutcome::Failure,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaSession - per-request client owning one TokenState
// ─────────────────────────────────────────────────────────────────────────────

/// API client bound to one session's tokens.
///
/// Built per request from that request's cookies; never shared. After use,
/// read [`StravaSession::tokens`] and persist them if they changed.
pub struct StravaSession<R> {
    client: StravaClient,
    refresher: R,
    tokens: TokenState,
}

impl<R: TokenRefresher> StravaSession<R> {
    pub fn new(client: StravaClient, refresher: R, tokens: TokenState) -> Self {
        Self {
            client,
            refresher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenState {
        &self.tokens
    }

    /// Return a usable access token, refreshing first if it expires within
    /// [`TOKEN_REFRESH_MARGIN_SECS`].
    pub async fn ensure_valid_token(&mut self) -> Result<String> {
        if !self.tokens.is_authenticated() {
            return Err(AppError::Unauthenticated);
        }

        if self
            .tokens
            .needs_refresh(now_unix(), TOKEN_REFRESH_MARGIN_SECS)
        {
            tracing::info!(
                expires_at = ?self.tokens.expires_at(),
                "Access token expiring, refreshing"
            );
            return self.refresh_access_token().await;
        }

        self.tokens
            .access_token()
            .map(str::to_string)
            .ok_or(AppError::Unauthenticated)
    }

    /// Replace the session's tokens with a fresh grant.
    ///
    /// If the refresh is rejected the token state is cleared.
    pub async fn refresh_access_token(&mut self) -> Result<String> {
        let result = self.refresher.refresh(self.tokens.refresh_token()).await;

        match result {
            Ok(grant) => {
                let access_token = grant.access_token.clone();
                self.tokens.apply_grant(grant);
                tracing::info!("Access token refreshed");
                Ok(access_token)
            }
            Err(e) => {
                if e.is_session_error() {
                    tracing::warn!(error = %e, "Token refresh rejected, clearing session");
                    self.tokens.clear();
                }
                Err(e)
            }
        }
    }

    /// Authenticated GET of `endpoint`, parsed as `T`.
    ///
    /// A 401 carrying the structured invalid-token error triggers exactly one
    /// refresh and one retry. Any other non-2xx fails with
    /// [`AppError::Upstream`].
    pub async fn fetch_resource<T: DeserializeOwned>(
        &mut self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut token = self.ensure_valid_token().await?;
        let mut phase = RetryPhase::Attempt;

        loop {
            let (status, body) = self.client.get(&token, endpoint, query).await?;

            match phase.next(classify(status, &body)) {
                RetryStep::Done => {
                    return serde_json::from_str(&body).map_err(|e| {
                        AppError::Transport(format!("JSON parse error on {}: {}", endpoint, e))
                    });
                }
                RetryStep::RefreshAndRetry => {
                    tracing::info!(endpoint, "Access token invalid, refreshing and retrying");
                    token = self.refresh_access_token().await?;
                    phase = RetryPhase::Retry;
                }
                RetryStep::Fatal => {
                    tracing::warn!(endpoint, status, ?phase, "Strava request failed");
                    return Err(AppError::Upstream { status, body });
                }
            }
        }
    }
}
