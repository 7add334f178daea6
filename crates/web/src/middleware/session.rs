//! Session middleware configuration.
//!
//! Sessions live in process memory and hold only the tokens issued by the
//! identity provider (see [`crate::models::StoredAuth`]). A restart signs
//! everyone out.
//!
//! Access tokens live about an hour while the cookie lives for a week, so
//! [`refresh_session_middleware`] renews an expiring token before the
//! handler reads it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use super::auth::clear_auth;
use crate::config::HitchyardConfig;
use crate::models::{StoredAuth, session_keys};
use crate::services::Marketplace;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "hy_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer.
#[must_use]
pub fn create_session_layer(config: &HitchyardConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Middleware that renews the caller's access token when it is about to
/// expire.
///
/// A refused refresh signs the caller out locally, so protected pages
/// redirect to signup before a form is filled in rather than after.
/// Must run inside the session layer.
pub async fn refresh_session_middleware(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    if let Ok(marketplace) = state.marketplace() {
        refresh_stored_auth(marketplace, &session).await;
    }
    next.run(request).await
}

async fn refresh_stored_auth(marketplace: &Marketplace, session: &Session) {
    let auth = match session.get::<StoredAuth>(session_keys::AUTH).await {
        Ok(Some(auth)) => auth,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read session");
            return;
        }
    };

    match marketplace.refresh_session(&auth).await {
        Ok(None) => {}
        Ok(Some(renewed)) => {
            if let Err(e) = session.insert(session_keys::AUTH, &renewed).await {
                tracing::warn!(error = %e, "failed to store refreshed session");
            }
        }
        Err(e) => {
            tracing::info!(error = %e, "session refresh refused, signing out");
            if let Err(e) = clear_auth(session).await {
                tracing::warn!(error = %e, "failed to clear session");
            }
        }
    }
}
