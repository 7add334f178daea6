//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                      - Landing page
//! GET  /health                - Liveness
//! GET  /health/ready          - Readiness (remote store reachable)
//!
//! # Auth (POSTs rate limited)
//! GET  /signup                - Signup page
//! POST /signup                - Signup action
//! GET  /login                 - Login page
//! POST /login                 - Login action
//! POST /logout                - Logout action
//!
//! # Dashboard
//! GET  /dashboard             - Greeting and vetting status
//! GET  /dashboard/loads       - Caller's loads (HTMX fragment)
//!
//! # Loads
//! GET  /post-load             - Post-load form
//! POST /post-load             - Load submission
//! GET  /loads                 - Bidding surface
//! GET  /loads/table           - Open loads (HTMX fragment)
//! POST /loads/{id}/bids       - Bid submission (HTMX toast)
//!
//! # Vetting
//! GET  /vetting               - Vetting form
//! POST /vetting               - Vetting submission
//!
//! # JSON API
//! POST /api/loads             - Load submission
//! POST /api/bids              - Bid submission
//! POST /api/vetting           - Vetting submission
//! ```

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod home;
pub mod loads;
pub mod post_load;
pub mod vetting;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, Uri},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::AppError;
use crate::middleware::{
    RateLimiterLayer, create_session_layer, csp_nonce_middleware, refresh_session_middleware,
    request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Create the auth routes router.
///
/// The limiter only wraps the POST handlers so the forms stay reachable.
pub fn auth_routes(limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let mut signup = post(auth::signup);
    let mut login = post(auth::login);
    if let Some(limiter) = limiter {
        signup = signup.layer(limiter.clone());
        login = login.layer(limiter);
    }

    Router::new()
        .route("/signup", get(auth::signup_page).merge(signup))
        .route("/login", get(auth::login_page).merge(login))
        .route("/logout", post(auth::logout))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/loads", get(dashboard::my_loads))
}

/// Create the load listing and bidding routes router.
pub fn load_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(loads::index))
        .route("/table", get(loads::table))
        .route("/{id}/bids", post(loads::bid))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/loads", post(api::post_load))
        .route("/bids", post(api::submit_bid))
        .route("/vetting", post(api::submit_vetting))
}

/// Create all page and API routes.
pub fn routes(auth_limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(auth_routes(auth_limiter))
        .nest("/dashboard", dashboard_routes())
        .route("/post-load", get(post_load::form).post(post_load::submit))
        .nest("/loads", load_routes())
        .route("/vetting", get(vetting::form).post(vetting::submit))
        .nest("/api", api_routes())
}

/// Build the full application: routes, static files and middleware.
///
/// Layers are listed innermost first; see [`crate::middleware`] for the
/// resulting order.
pub fn app(state: AppState, auth_limiter: Option<RateLimiterLayer>) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes(auth_limiter))
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), refresh_session_middleware))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// `503` when no Supabase project is configured or it does not answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Ok(marketplace) = state.marketplace() else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };

    match marketplace.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    use crate::config::{HitchyardConfig, WebhookConfig};
    use crate::middleware::auth_rate_limiter;

    fn config() -> HitchyardConfig {
        HitchyardConfig {
            host: [127, 0, 0, 1].into(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            supabase: None,
            webhook: WebhookConfig::from_parts(None, None).unwrap(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    fn login_post() -> Request<Body> {
        Request::post("/login")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("cf-connecting-ip", "203.0.113.7")
            .body(Body::from("email=a%40example.com&password=secret1"))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_posts_are_rate_limited() {
        let app = app(AppState::new(config(), None), Some(auth_rate_limiter()));

        for _ in 0..5 {
            let response = app.clone().oneshot(login_post()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app.clone().oneshot(login_post()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        // The form itself stays reachable
        let response = app
            .oneshot(Request::get("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
