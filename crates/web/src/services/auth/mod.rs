//! Authentication service.
//!
//! Accounts live with the hosted identity provider. This module defines the
//! provider interface and the session guard every data-mutating flow runs
//! through before touching the store.

mod error;

pub use error::AuthError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use hitchyard_core::{Email, ZipCode};

use crate::models::{AccessToken, AuthenticatedUser, Identity, StoredAuth};

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A validated signup.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: Email,
    pub password: SecretString,
    /// Stored as user metadata on the account.
    pub zip_code: ZipCode,
}

/// Tokens issued by a password sign-in or a refresh.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: AccessToken,
    pub refresh_token: Option<SecretString>,
    /// When `token` expires, if the provider said.
    pub expires_at: Option<DateTime<Utc>>,
    pub identity: Identity,
}

impl AuthSession {
    /// What the browser session keeps, shown in the navigation as `email`.
    #[must_use]
    pub fn into_stored(self, email: String) -> StoredAuth {
        StoredAuth {
            access_token: self.token.expose().to_string(),
            refresh_token: self
                .refresh_token
                .map(|token| token.expose_secret().to_string()),
            expires_at: self.expires_at,
            email,
        }
    }
}

/// Operations the hosted identity provider offers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the user an access token belongs to.
    ///
    /// Returns `Ok(None)` when the provider does not recognise the token.
    async fn current_user(&self, token: &AccessToken) -> Result<Option<Identity>, AuthError>;

    /// Register an account. The provider emails a verification link.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), AuthError>;

    /// Exchange email and password for an access token.
    async fn sign_in(&self, email: &Email, password: &SecretString)
    -> Result<AuthSession, AuthError>;

    /// Exchange a refresh token for a new access token.
    ///
    /// Refresh tokens are single use; the returned session carries the
    /// replacement.
    async fn refresh(&self, refresh_token: &SecretString) -> Result<AuthSession, AuthError>;

    /// Revoke an access token.
    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError>;
}

/// Verifies the caller before any data-mutating action.
///
/// A missing token, a token the provider does not recognise, and a failed
/// lookup all count as "not authenticated". There are no retries.
pub struct SessionGuard<'a> {
    identity: &'a dyn IdentityProvider,
}

impl<'a> SessionGuard<'a> {
    #[must_use]
    pub const fn new(identity: &'a dyn IdentityProvider) -> Self {
        Self { identity }
    }

    /// Resolve the caller behind `token`.
    #[instrument(skip_all)]
    pub async fn verify(&self, token: Option<AccessToken>) -> Option<AuthenticatedUser> {
        let token = token?;

        match self.identity.current_user(&token).await {
            Ok(Some(identity)) => {
                tracing::debug!(user_id = %identity.id, "session verified");
                Some(AuthenticatedUser { identity, token })
            }
            Ok(None) => {
                tracing::debug!("access token not recognised");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity lookup failed");
                None
            }
        }
    }
}
