// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side session loader.
//!
//! A client that cannot read the HTTP-only token cookies (the browser, or
//! any tool holding only the dashboard's cookie header) reconstructs its
//! token state from `/auth/status` and `/auth/refresh`, then talks to Strava
//! directly. The status endpoint is the single source of truth for whether a
//! session exists; no separate "authenticated" flag is kept.

use crate::error::{AppError, Result};
use crate::services::strava::{StravaClient, StravaSession, TokenRefresher};
use crate::session::{TokenGrant, TokenState};
use axum::http::header;
use axum_extra::extract::cookie::Cookie;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Session status as reported by `/auth/status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStatus {
    pub authenticated: bool,
    pub athlete_id: Option<String>,
}

#[derive(Deserialize)]
struct RelayRefreshResponse {
    access_token: String,
    expires_at: i64,
}

/// Refreshes through the dashboard's `/auth/refresh` endpoint, carrying the
/// session cookies and picking up rotated ones.
pub struct DashboardRelay {
    http: reqwest::Client,
    base_url: String,
    cookies: Mutex<BTreeMap<String, String>>,
}

impl DashboardRelay {
    /// `cookie_header` is a `Cookie:` header value for the dashboard origin.
    pub fn new(base_url: impl Into<String>, cookie_header: &str) -> Self {
        let cookies = Cookie::split_parse(cookie_header.to_string())
            .filter_map(|c| c.ok())
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();

        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookies: Mutex::new(cookies),
        }
    }

    /// Current `Cookie:` header value.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .lock()
            .map(|cookies| {
                cookies
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default()
    }

    pub async fn status(&self) -> Result<RemoteStatus> {
        let response = self
            .http
            .get(format!("{}/auth/status", self.base_url))
            .header(header::COOKIE, self.cookie_header())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream { status, body });
        }

        Ok(response.json().await?)
    }

    /// Rebuild the token state: anonymous if the dashboard reports no
    /// session or the refresh round-trip fails.
    pub async fn load(&self) -> Result<TokenState> {
        if !self.status().await?.authenticated {
            return Ok(TokenState::default());
        }

        match self.refresh(None).await {
            Ok(grant) => Ok(TokenState::from_grant(grant)),
            Err(e) if e.is_session_error() => {
                tracing::info!(error = %e, "Dashboard session could not be refreshed");
                Ok(TokenState::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Load the session and wrap it in a Strava client, or `None` when
    /// there is no usable session.
    pub async fn connect(self, client: StravaClient) -> Result<Option<StravaSession<Self>>> {
        let tokens = self.load().await?;
        if !tokens.is_authenticated() {
            return Ok(None);
        }
        Ok(Some(StravaSession::new(client, self, tokens)))
    }

    fn absorb_set_cookies(&self, headers: &reqwest::header::HeaderMap) {
        let Ok(mut cookies) = self.cookies.lock() else {
            return;
        };

        for value in headers.get_all(reqwest::header::SET_COOKIE) {
            let Some(cookie) = value
                .to_str()
                .ok()
                .and_then(|v| Cookie::parse(v.to_string()).ok())
            else {
                continue;
            };

            let expired = cookie.max_age().is_some_and(|age| age.is_zero()) || cookie.value().is_empty();
            if expired {
                cookies.remove(cookie.name());
            } else {
                cookies.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }
}

impl TokenRefresher for DashboardRelay {
    /// The refresh token lives in an HTTP-only cookie, so the argument is
    /// unused.
    async fn refresh(&self, _refresh_token: Option<&str>) -> Result<TokenGrant> {
        let response = self
            .http
            .post(format!("{}/auth/refresh", self.base_url))
            .header(header::COOKIE, self.cookie_header())
            .send()
            .await?;

        self.absorb_set_cookies(response.headers());

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RefreshFailed(format!("HTTP {}: {}", status, body)));
        }

        let refreshed: RelayRefreshResponse = response.json().await?;
        Ok(TokenGrant {
            access_token: refreshed.access_token,
            refresh_token: None,
            expires_at: refreshed.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_roundtrip() {
        let relay = DashboardRelay::new(
            "http://localhost:3000/",
            "strava_refresh_token=r1; strava_athlete_id=42",
        );
        assert_eq!(
            relay.cookie_header(),
            "strava_athlete_id=42; strava_refresh_token=r1"
        );
    }

    #[test]
    fn test_absorb_set_cookies() {
        let relay = DashboardRelay::new(
            "http://localhost:3000",
            "strava_refresh_token=r1; strava_athlete_id=42",
        );

        let mut headers = reqwest::header::HeaderMap::new();
        headers.append(
            reqwest::header::SET_COOKIE,
            "strava_refresh_token=r2; HttpOnly; Path=/; Max-Age=31536000"
                .parse()
                .unwrap(),
        );
        headers.append(
            reqwest::header::SET_COOKIE,
            "strava_athlete_id=; Path=/; Max-Age=0".parse().unwrap(),
        );
        relay.absorb_set_cookies(&headers);

        assert_eq!(relay.cookie_header(), "strava_refresh_token=r2");
    }
}
