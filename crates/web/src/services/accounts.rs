//! Signup, sign-in, session refresh and sign-out.

use chrono::Utc;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use hitchyard_core::{Email, ZipCode};

use super::auth::{AuthSession, MIN_PASSWORD_LENGTH, SignUpRequest};
use super::{FlowError, Marketplace};
use crate::models::{AccessToken, StoredAuth};

/// Signup form fields.
#[derive(Clone, Default, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub zip_code: String,
}

/// Login form fields.
#[derive(Clone, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("zip_code", &self.zip_code)
            .finish()
    }
}

impl std::fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SignUpForm {
    fn validate(&self) -> Result<SignUpRequest, FlowError> {
        let email = Email::parse(&self.email)
            .map_err(|_| FlowError::validation("Please enter a valid email address"))?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(FlowError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let zip_code = ZipCode::parse(&self.zip_code)
            .map_err(|_| FlowError::validation("ZIP code must be 5 digits"))?;

        Ok(SignUpRequest {
            email,
            password: SecretString::from(self.password.clone()),
            zip_code,
        })
    }
}

impl Marketplace {
    /// Register an account. The provider sends a verification email.
    ///
    /// Returns the normalized address the email went to.
    ///
    /// # Errors
    ///
    /// [`FlowError::Validation`] for bad input, or the provider's error.
    #[instrument(skip_all)]
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<Email, FlowError> {
        let request = form.validate()?;
        self.identity().sign_up(&request).await?;

        tracing::info!(email = %request.email, "account registered");
        Ok(request.email)
    }

    /// Exchange email and password for an access token.
    ///
    /// # Errors
    ///
    /// [`FlowError::Validation`] for blank fields, or the provider's error
    /// (wrong password, unconfirmed email).
    #[instrument(skip_all)]
    pub async fn sign_in(&self, form: &SignInForm) -> Result<AuthSession, FlowError> {
        if form.email.trim().is_empty() || form.password.is_empty() {
            return Err(FlowError::validation("Email and password are required"));
        }
        let email = Email::parse(&form.email)
            .map_err(|_| FlowError::validation("Please enter a valid email address"))?;
        let password = SecretString::from(form.password.clone());

        let session = self.identity().sign_in(&email, &password).await?;
        tracing::info!(user_id = %session.identity.id, "signed in");
        Ok(session)
    }

    /// Renew a stored session whose access token is about to expire.
    ///
    /// Returns `Ok(None)` while the token is still fresh, so callers only
    /// rewrite the session when something changed.
    ///
    /// # Errors
    ///
    /// [`FlowError::Unauthenticated`] when the session holds no refresh
    /// token, or the provider's error when it refuses the refresh token.
    #[instrument(skip_all)]
    pub async fn refresh_session(
        &self,
        auth: &StoredAuth,
    ) -> Result<Option<StoredAuth>, FlowError> {
        if !auth.needs_refresh(Utc::now()) {
            return Ok(None);
        }
        let refresh_token = auth
            .refresh_token
            .clone()
            .map(SecretString::from)
            .ok_or(FlowError::Unauthenticated)?;

        let session = self.identity().refresh(&refresh_token).await?;
        tracing::debug!(user_id = %session.identity.id, "access token refreshed");
        Ok(Some(session.into_stored(auth.email.clone())))
    }

    /// Revoke the caller's token.
    ///
    /// Failures are logged; the local session is cleared regardless.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, token: Option<AccessToken>) {
        let Some(token) = token else {
            return;
        };
        if let Err(e) = self.identity().sign_out(&token).await {
            tracing::warn!(error = %e, "token revocation failed");
        }
    }
}
