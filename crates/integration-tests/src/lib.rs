//! Integration tests for Hitchyard.
//!
//! Tests drive the full axum router (middleware included) in process with
//! `tower::ServiceExt::oneshot`. The Supabase project and the CRM webhook
//! are replaced by the in-memory doubles from `hitchyard_web::test_support`.
//!
//! ```bash
//! cargo test -p hitchyard-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use tower::ServiceExt;

use hitchyard_core::UserId;
use hitchyard_web::config::{HitchyardConfig, WebhookConfig};
use hitchyard_web::routes;
use hitchyard_web::state::AppState;
use hitchyard_web::test_support::TestBackend;

/// Password used for every registered test account.
pub const TEST_PASSWORD: &str = "hunter22";

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// A response header as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }

    /// `name=value` of the session cookie, if one was set.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("hy_session="))
            .and_then(|v| v.split(';').next())
            .map(String::from)
    }
}

/// The application under test plus its backing doubles.
pub struct TestApp {
    pub backend: TestBackend,
    router: Router,
}

fn test_config() -> HitchyardConfig {
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

impl TestApp {
    /// An app wired to fresh in-memory doubles.
    #[must_use]
    pub fn new() -> Self {
        let backend = TestBackend::new();
        let state = AppState::new(test_config(), Some(backend.marketplace()));
        Self {
            router: routes::app(state, None),
            backend,
        }
    }

    /// An app started without a Supabase project.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            router: routes::app(AppState::new(test_config(), None), None),
            backend: TestBackend::new(),
        }
    }

    /// Send one request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// `GET path`, optionally with a session cookie.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::get(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// `GET path` as an HTMX request.
    pub async fn get_fragment(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::get(path).header("hx-request", "true");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// `POST path` with a urlencoded form body.
    pub async fn post_form(&self, path: &str, body: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// `POST path` with a JSON body.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder =
            Request::post(path).header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Register `email` and log in through `POST /login`.
    ///
    /// Returns the account's user ID and the session cookie.
    pub async fn login(&self, email: &str) -> (UserId, String) {
        let user_id = self.backend.identity.register(email, TEST_PASSWORD);

        let response = self
            .post_form(
                "/login",
                &format!("email={email}&password={TEST_PASSWORD}"),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        assert_eq!(response.header("location"), Some("/dashboard"));

        (user_id, response.session_cookie().unwrap())
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
