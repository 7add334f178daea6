//! `GoTrue` identity provider.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use url::Url;

use hitchyard_core::Email;

use super::{ErrorBody, SupabaseClient};
use crate::models::{AccessToken, Identity};
use crate::services::auth::{AuthError, AuthSession, IdentityProvider, SignUpRequest};

/// Successful `token?grant_type=...` response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    expires_in: Option<i64>,
    /// Unix timestamp; preferred over `expires_in` when present.
    #[serde(default)]
    expires_at: Option<i64>,
    user: Identity,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        AuthSession {
            token: AccessToken::new(self.access_token),
            refresh_token: self.refresh_token.map(SecretString::from),
            expires_at,
            identity: self.user,
        }
    }
}

impl SupabaseClient {
    fn auth_endpoint(&self, path: &str) -> Result<Url, AuthError> {
        Ok(self.inner.auth_url.join(path)?)
    }

    /// `POST token?grant_type={grant_type}` with `body`.
    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<AuthSession, AuthError> {
        let mut url = self.auth_endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .http()
            .post(url)
            .header(AUTHORIZATION, self.bearer(None))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))?;
        Ok(token.into_session(Utc::now()))
    }
}

async fn rejected(response: reqwest::Response) -> AuthError {
    let body = ErrorBody::read(response).await;
    AuthError::Rejected {
        status: body.status,
        message: body.message,
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    #[instrument(skip_all)]
    async fn current_user(&self, token: &AccessToken) -> Result<Option<Identity>, AuthError> {
        let response = self
            .http()
            .get(self.auth_endpoint("user")?)
            .header(AUTHORIZATION, self.bearer(Some(token)))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => response
                .json::<Identity>()
                .await
                .map(Some)
                .map_err(|e| AuthError::Decode(e.to_string())),
            _ => Err(rejected(response).await),
        }
    }

    #[instrument(skip_all, fields(email = %request.email))]
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), AuthError> {
        let body = json!({
            "email": request.email.as_str(),
            "password": request.password.expose_secret(),
            "data": {
                "zip_code": request.zip_code.as_str(),
            },
        });

        let response = self
            .http()
            .post(self.auth_endpoint("signup")?)
            .header(AUTHORIZATION, self.bearer(None))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(())
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError> {
        let body = json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        });
        self.token_grant("password", body).await
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &SecretString) -> Result<AuthSession, AuthError> {
        let body = json!({ "refresh_token": refresh_token.expose_secret() });
        self.token_grant("refresh_token", body).await
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        let response = self
            .http()
            .post(self.auth_endpoint("logout")?)
            .header(AUTHORIZATION, self.bearer(Some(token)))
            .send()
            .await?;

        // An already-expired token has nothing left to revoke.
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(rejected(response).await)
    }
}
