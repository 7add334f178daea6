//! Session extractors.
//!
//! The session cookie only says who the browser *claims* to be. Flows hand
//! the token to [`crate::services::SessionGuard`], which asks the identity
//! provider; these extractors never trust the cookie on their own for data
//! access.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{AccessToken, StoredAuth, session_keys};
use crate::services::{ActionOutcome, FlowError};

/// Where unauthenticated callers are sent.
pub const SIGNUP_PATH: &str = "/signup";

/// What kind of client made the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Full page navigation.
    Page,
    /// HTMX fragment request (`HX-Request: true`).
    Htmx,
    /// JSON API under `/api/`.
    Api,
}

impl RequestKind {
    fn of(parts: &Parts) -> Self {
        // Nested routers see the path with their prefix stripped
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);

        if uri.path().starts_with("/api/") {
            Self::Api
        } else if parts
            .headers
            .get("hx-request")
            .is_some_and(|v| v.as_bytes() == b"true")
        {
            Self::Htmx
        } else {
            Self::Page
        }
    }

    /// The response for a caller that failed authentication.
    #[must_use]
    pub const fn unauthenticated(self) -> AuthRejection {
        match self {
            Self::Page => AuthRejection::RedirectToSignup,
            Self::Htmx => AuthRejection::HxRedirectToSignup,
            Self::Api => AuthRejection::Unauthorized,
        }
    }
}

impl<S> FromRequestParts<S> for RequestKind
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::of(parts))
    }
}

/// Response sent when a caller must sign up or log in first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// `303 See Other` to `/signup`.
    RedirectToSignup,
    /// `200` with `HX-Redirect: /signup`, so HTMX navigates the whole page.
    HxRedirectToSignup,
    /// `401` with a JSON failure outcome.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignup => Redirect::to(SIGNUP_PATH).into_response(),
            Self::HxRedirectToSignup => {
                let mut response = StatusCode::OK.into_response();
                response
                    .headers_mut()
                    .insert("hx-redirect", HeaderValue::from_static(SIGNUP_PATH));
                response
            }
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ActionOutcome::failed(&FlowError::Unauthenticated)),
            )
                .into_response(),
        }
    }
}

async fn stored_auth(parts: &Parts) -> Option<StoredAuth> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<StoredAuth>(session_keys::AUTH)
        .await
        .ok()
        .flatten()
}

/// Whatever the session cookie holds, possibly nothing.
///
/// Flows take the token and decide for themselves.
///
/// ```rust,ignore
/// async fn handler(session: CurrentSession) -> impl IntoResponse {
///     marketplace.dashboard(session.token()).await
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<StoredAuth>);

impl CurrentSession {
    /// The stored access token, if any.
    #[must_use]
    pub fn token(&self) -> Option<AccessToken> {
        self.0.as_ref().map(StoredAuth::token)
    }

    /// Email shown in the navigation bar.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        self.0.as_ref().map(|auth| auth.email.clone())
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(stored_auth(parts).await))
    }
}

/// Requires a session cookie before rendering a page.
///
/// Only gates form pages; submitting the form still goes through the
/// session guard.
#[derive(Debug, Clone)]
pub struct RequireSession(pub StoredAuth);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let kind = RequestKind::of(parts);
        stored_auth(parts)
            .await
            .map(Self)
            .ok_or_else(|| kind.unauthenticated())
    }
}

/// Store the caller's token in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth(
    session: &Session,
    auth: &StoredAuth,
) -> Result<(), tower_sessions::session::Error> {
    // New identity, new session ID
    session.cycle_id().await?;
    session.insert(session_keys::AUTH, auth).await
}

/// Drop the caller's token from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<StoredAuth>(session_keys::AUTH).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, htmx: bool) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if htmx {
            builder = builder.header("hx-request", "true");
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_request_kind() {
        assert_eq!(RequestKind::of(&parts("/dashboard", false)), RequestKind::Page);
        assert_eq!(RequestKind::of(&parts("/loads/table", true)), RequestKind::Htmx);
        assert_eq!(RequestKind::of(&parts("/api/bids", true)), RequestKind::Api);
    }

    #[test]
    fn test_request_kind_inside_nested_router() {
        let mut nested = parts("/bids", false);
        nested
            .extensions
            .insert(OriginalUri("/api/bids".parse().unwrap()));
        assert_eq!(RequestKind::of(&nested), RequestKind::Api);

        let mut nested = parts("/table", true);
        nested
            .extensions
            .insert(OriginalUri("/loads/table".parse().unwrap()));
        assert_eq!(RequestKind::of(&nested), RequestKind::Htmx);
    }

    #[test]
    fn test_rejection_responses() {
        let response = AuthRejection::RedirectToSignup.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/signup");

        let response = AuthRejection::HxRedirectToSignup.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["hx-redirect"], "/signup");

        let response = AuthRejection::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
