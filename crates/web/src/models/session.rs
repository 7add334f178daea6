//! Session-related types.
//!
//! The browser session stores the identity provider's tokens and the email
//! they were issued for. Every data-mutating request re-verifies the access
//! token with the identity provider; the refresh token renews it before it
//! expires.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use hitchyard_core::UserId;

/// Bearer token issued by the identity provider.
///
/// Wrapped in a `SecretString` so it never lands in logs.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token for an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Identity returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity provider user ID.
    pub id: UserId,
    /// Email the account was registered with.
    #[serde(default)]
    pub email: Option<String>,
}

/// A caller that passed the session guard.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Who the caller is.
    pub identity: Identity,
    /// Token used to scope reads and writes under row-level security.
    pub token: AccessToken,
}

impl AuthenticatedUser {
    /// The caller's user ID.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.identity.id
    }
}

/// Access tokens this many seconds from expiry are renewed before use.
pub const REFRESH_LEEWAY_SECS: i64 = 60;

/// What the session cookie resolves to.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredAuth {
    /// Raw access token.
    pub access_token: String,
    /// Raw refresh token, when the provider issued one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Email shown in the navigation bar.
    pub email: String,
}

impl StoredAuth {
    /// The stored token as an [`AccessToken`].
    #[must_use]
    pub fn token(&self) -> AccessToken {
        AccessToken::new(self.access_token.clone())
    }

    /// Whether the access token expires within [`REFRESH_LEEWAY_SECS`] of `now`.
    ///
    /// A token with no known expiry is never refreshed.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        let leeway = Duration::seconds(REFRESH_LEEWAY_SECS);
        self.expires_at
            .is_some_and(|expires_at| expires_at - leeway <= now)
    }
}

impl fmt::Debug for StoredAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredAuth")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .field("email", &self.email)
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the signed-in caller's token and email.
    pub const AUTH: &str = "auth";
}
