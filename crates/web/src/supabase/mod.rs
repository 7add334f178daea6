//! Supabase client.
//!
//! One HTTP client serves both halves of the hosted backend:
//!
//! - `rest/v1/{table}` (`PostgREST`) implements [`crate::db::DataStore`]
//! - `auth/v1/*` (`GoTrue`) implements [`crate::services::auth::IdentityProvider`]
//!
//! Every request carries the project's anon key as `apikey`. Requests made on
//! behalf of a signed-in caller send the caller's access token as the bearer
//! so row-level security applies; everything else uses the anon key.

mod auth;
mod rest;

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::SupabaseConfig;
use crate::models::AccessToken;

/// Errors building a [`SupabaseClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client failed to build.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A base URL could not be derived from the project URL.
    #[error("invalid Supabase URL: {0}")]
    Url(#[from] url::ParseError),

    /// The anon key cannot be sent as a header.
    #[error("invalid anon key: {0}")]
    InvalidKey(String),
}

/// Client for a Supabase project.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    rest_url: Url,
    auth_url: Url,
    anon_bearer: String,
}

impl SupabaseClient {
    /// Create a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the project URL
    /// cannot be extended with the API paths.
    pub fn new(config: &SupabaseConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(config.anon_key())
            .map_err(|e| ClientError::InvalidKey(e.to_string()))?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                http,
                rest_url: config.url.join("rest/v1/")?,
                auth_url: config.url.join("auth/v1/")?,
                anon_bearer: format!("Bearer {}", config.anon_key()),
            }),
        })
    }

    fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// `Authorization` value for a request made on behalf of `token`.
    fn bearer(&self, token: Option<&AccessToken>) -> String {
        token.map_or_else(
            || self.inner.anon_bearer.clone(),
            |token| format!("Bearer {}", token.expose()),
        )
    }
}

/// An error answer from either API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ErrorBody {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl ErrorBody {
    /// Read the error out of a failed response.
    async fn read(response: reqwest::Response) -> Self {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Self::parse(status, &text)
    }

    /// Pick the most specific message the body offers.
    ///
    /// `PostgREST` uses `message`, `GoTrue` uses `msg` or
    /// `error_description`, and older endpoints only send `error`.
    fn parse(status: reqwest::StatusCode, text: &str) -> Self {
        let json = serde_json::from_str::<Value>(text).ok();

        let field = |name: &str| {
            json.as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };

        let message = field("message")
            .or_else(|| field("msg"))
            .or_else(|| field("error_description"))
            .or_else(|| field("error"))
            .or_else(|| {
                let text = text.trim();
                (json.is_none() && !text.is_empty()).then(|| text.to_string())
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map_or_else(|| format!("HTTP {}", status.as_u16()), ToString::to_string)
            });

        Self {
            status: status.as_u16(),
            code: field("code").or_else(|| field("error_code")),
            message,
        }
    }
}
