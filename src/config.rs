// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The OAuth credentials are optional at startup so the server can boot and
//! serve `/auth/status` without them. Handlers that need them call
//! [`Config::oauth_credentials`] and surface a configuration error.

use std::env;

const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
const DEFAULT_OAUTH_BASE: &str = "https://www.strava.com/oauth";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- OAuth (required for login/callback/refresh) ---
    /// Strava OAuth client ID
    pub strava_client_id: Option<String>,
    /// Strava OAuth client secret
    pub strava_client_secret: Option<String>,
    /// Redirect URI registered with Strava
    pub strava_redirect_uri: Option<String>,

    // --- Upstream endpoints ---
    /// Strava REST API base URL
    pub strava_api_base: String,
    /// Strava OAuth base URL (authorize + token endpoints)
    pub strava_oauth_base: String,

    // --- Server ---
    /// Prefix for post-auth redirects, empty for same-origin
    pub frontend_url: String,
    /// Whether session cookies carry the `Secure` attribute
    pub cookie_secure: bool,
    /// Server port
    pub port: u16,
}

/// OAuth client credentials, all present.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl Config {
    /// Config for tests, with every OAuth value present.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: Some("test_client_id".to_string()),
            strava_client_secret: Some("test_secret".to_string()),
            strava_redirect_uri: Some("http://localhost:3000/auth/callback".to_string()),
            strava_api_base: DEFAULT_API_BASE.to_string(),
            strava_oauth_base: DEFAULT_OAUTH_BASE.to_string(),
            frontend_url: String::new(),
            cookie_secure: false,
            port: 3000,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self {
            strava_client_id: non_empty_var("STRAVA_CLIENT_ID"),
            strava_client_secret: non_empty_var("STRAVA_CLIENT_SECRET"),
            strava_redirect_uri: non_empty_var("STRAVA_REDIRECT_URI"),
            strava_api_base: non_empty_var("STRAVA_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            strava_oauth_base: non_empty_var("STRAVA_OAUTH_BASE")
                .unwrap_or_else(|| DEFAULT_OAUTH_BASE.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        }
    }

    /// Return the OAuth credentials, or the name of the first missing one.
    pub fn oauth_credentials(&self) -> Result<OAuthCredentials, ConfigError> {
        let client_id = self
            .strava_client_id
            .clone()
            .ok_or(ConfigError::Missing("STRAVA_CLIENT_ID"))?;
        let client_secret = self
            .strava_client_secret
            .clone()
            .ok_or(ConfigError::Missing("STRAVA_CLIENT_SECRET"))?;
        let redirect_uri = self
            .strava_redirect_uri
            .clone()
            .ok_or(ConfigError::Missing("STRAVA_REDIRECT_URI"))?;

        Ok(OAuthCredentials {
            client_id,
            client_secret,
            redirect_uri,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
