// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token store.
//!
//! [`TokenState`] is the in-memory token triple with pure transitions.
//! [`SessionCookies`] is the boundary adapter that projects it to and from
//! the request/response cookie jar.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

pub const ACCESS_TOKEN_COOKIE: &str = "strava_access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "strava_refresh_token";
pub const EXPIRES_AT_COOKIE: &str = "strava_expires_at";
pub const ATHLETE_ID_COOKIE: &str = "strava_athlete_id";

/// Every cookie that makes up a session.
pub const SESSION_COOKIES: [&str; 4] = [
    ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
    EXPIRES_AT_COOKIE,
    ATHLETE_ID_COOKIE,
];

/// Strava access tokens live for six hours.
const DEFAULT_ACCESS_TOKEN_LIFETIME_SECS: i64 = 6 * 60 * 60;

/// Extra lifetime given to the access cookie beyond the token's own expiry,
/// so a nearly-expired token can still be presented for proactive refresh.
const ACCESS_COOKIE_MARGIN_SECS: i64 = 60 * 60;

/// Lifetime of the refresh token, expiry and athlete cookies.
const LONG_COOKIE_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

/// Tokens returned by a refresh or code exchange.
///
/// `refresh_token` is absent when the refresh token never leaves the
/// server (the browser-side relay only sees the access token).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp
    pub expires_at: i64,
}

/// Current access token, refresh token and expiry for one session.
///
/// Every field may be absent; an all-empty state is an anonymous session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

impl TokenState {
    pub fn new(
        access_token: Option<String>,
        refresh_token: Option<String>,
        expires_at: Option<i64>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at,
        }
    }

    pub fn from_grant(grant: TokenGrant) -> Self {
        let mut state = Self::default();
        state.apply_grant(grant);
        state
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Whether the token expires within `window_secs` of `now`.
    /// An unknown expiry counts as expired.
    pub fn needs_refresh(&self, now: i64, window_secs: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at.saturating_sub(now) <= window_secs,
            None => true,
        }
    }

    /// Replace all three fields with a freshly issued grant.
    pub fn apply_grant(&mut self, grant: TokenGrant) {
        *self = Self {
            access_token: Some(grant.access_token),
            refresh_token: grant.refresh_token,
            expires_at: Some(grant.expires_at),
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Cookie encoding of a [`TokenState`].
#[derive(Debug, Clone, Copy)]
pub struct SessionCookies {
    secure: bool,
}

impl SessionCookies {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Rebuild the token state from request cookies. Missing or malformed
    /// cookies yield absent fields.
    pub fn load(&self, jar: &CookieJar) -> TokenState {
        let value = |name: &str| {
            jar.get(name)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty())
        };

        TokenState {
            access_token: value(ACCESS_TOKEN_COOKIE),
            refresh_token: value(REFRESH_TOKEN_COOKIE),
            expires_at: value(EXPIRES_AT_COOKIE).and_then(|v| v.parse().ok()),
        }
    }

    pub fn athlete_id(&self, jar: &CookieJar) -> Option<String> {
        jar.get(ATHLETE_ID_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Write the three server-only token cookies. Absent fields are removed.
    pub fn persist(&self, jar: CookieJar, state: &TokenState, now: i64) -> CookieJar {
        let jar = self.set_access_token(jar, state, now);
        let jar = self.set_refresh_token(jar, state);
        self.set_expires_at(jar, state)
    }

    /// Write only the token cookies whose value differs between `before`
    /// and `after`.
    pub fn persist_changes(
        &self,
        mut jar: CookieJar,
        before: &TokenState,
        after: &TokenState,
        now: i64,
    ) -> CookieJar {
        if before.access_token != after.access_token || before.expires_at != after.expires_at {
            jar = self.set_access_token(jar, after, now);
        }
        if before.refresh_token != after.refresh_token {
            jar = self.set_refresh_token(jar, after);
        }
        if before.expires_at != after.expires_at {
            jar = self.set_expires_at(jar, after);
        }
        jar
    }

    /// Write the script-readable athlete id cookie.
    pub fn persist_athlete(&self, jar: CookieJar, athlete_id: u64) -> CookieJar {
        jar.add(self.cookie(
            ATHLETE_ID_COOKIE,
            athlete_id.to_string(),
            false,
            LONG_COOKIE_MAX_AGE_SECS,
        ))
    }

    /// Expire all four session cookies.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        SESSION_COOKIES
            .into_iter()
            .fold(jar, |jar, name| self.remove(jar, name))
    }

    fn set_access_token(&self, jar: CookieJar, state: &TokenState, now: i64) -> CookieJar {
        match state.access_token() {
            Some(token) => {
                // Expiry may come from a client cookie: clamp the derived lifetime.
                let lifetime = state
                    .expires_at
                    .map(|exp| exp.saturating_sub(now).clamp(0, LONG_COOKIE_MAX_AGE_SECS))
                    .unwrap_or(DEFAULT_ACCESS_TOKEN_LIFETIME_SECS);
                jar.add(self.cookie(
                    ACCESS_TOKEN_COOKIE,
                    token.to_string(),
                    true,
                    lifetime.saturating_add(ACCESS_COOKIE_MARGIN_SECS),
                ))
            }
            None => self.remove(jar, ACCESS_TOKEN_COOKIE),
        }
    }

    fn set_refresh_token(&self, jar: CookieJar, state: &TokenState) -> CookieJar {
        match state.refresh_token() {
            Some(token) => jar.add(self.cookie(
                REFRESH_TOKEN_COOKIE,
                token.to_string(),
                true,
                LONG_COOKIE_MAX_AGE_SECS,
            )),
            None => self.remove(jar, REFRESH_TOKEN_COOKIE),
        }
    }

    fn set_expires_at(&self, jar: CookieJar, state: &TokenState) -> CookieJar {
        match state.expires_at {
            Some(expires_at) => jar.add(self.cookie(
                EXPIRES_AT_COOKIE,
                expires_at.to_string(),
                true,
                LONG_COOKIE_MAX_AGE_SECS,
            )),
            None => self.remove(jar, EXPIRES_AT_COOKIE),
        }
    }

    /// Emit a removal cookie with the same attributes it was created with,
    /// whether or not the request carried it.
    fn remove(&self, jar: CookieJar, name: &'static str) -> CookieJar {
        let mut cookie = self.cookie(name, String::new(), name != ATHLETE_ID_COOKIE, 0);
        cookie.make_removal();
        jar.add(cookie)
    }

    fn cookie(
        &self,
        name: &'static str,
        value: String,
        http_only: bool,
        max_age_secs: i64,
    ) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(http_only)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::seconds(max_age_secs))
            .build()
    }
}
