//! Unified error handling with Sentry integration.
//!
//! Handlers that cannot render a flow error inline return `AppError`;
//! remote failures are captured to Sentry before responding.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::filters;
use crate::middleware::SIGNUP_PATH;
use crate::services::FlowError;

/// Error page.
///
/// Rendered outside any handler, so there is no nonce and no signed-in
/// email; the page loads no scripts.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
    pub status: u16,
    pub message: String,
}

impl ErrorTemplate {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            nonce: String::new(),
            user_email: None,
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Application-level error type for the web app.
#[derive(Debug, Error)]
pub enum AppError {
    /// A marketplace flow failed; the message is user-facing.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// HTTP status for a flow failure.
#[must_use]
pub const fn flow_status(error: &FlowError) -> StatusCode {
    match error {
        FlowError::MissingConfiguration => StatusCode::SERVICE_UNAVAILABLE,
        FlowError::Unauthenticated => StatusCode::UNAUTHORIZED,
        FlowError::Validation(_) => StatusCode::BAD_REQUEST,
        FlowError::Store(_) | FlowError::Auth(_) => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Flow(err) => flow_status(err),
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Flow(FlowError::Unauthenticated) = self {
            return Redirect::to(SIGNUP_PATH).into_response();
        }

        // Capture server and upstream errors to Sentry
        if matches!(
            self,
            Self::Session(_) | Self::Internal(_) | Self::Flow(FlowError::Store(_) | FlowError::Auth(_))
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Flow messages are written for users; nothing else is
        let message = match &self {
            Self::Flow(err) => err.to_string(),
            Self::NotFound(_) => "Page not found".to_string(),
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
        };

        let status = self.status();
        (status, ErrorTemplate::new(status, message)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after a successful login.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a marketplace action in the Sentry breadcrumb trail.
///
/// ```rust,ignore
/// add_breadcrumb("bids", "Submitted bid", Some(&[("load_id", "…")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_flow_error_statuses() {
        assert_eq!(
            status_of(FlowError::MissingConfiguration.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(FlowError::validation("Invalid load ID").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(FlowError::from(StoreError::rejected(500, "boom")).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(AppError::NotFound("/nope".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthenticated_redirects_to_signup() {
        let response = AppError::from(FlowError::Unauthenticated).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/signup");
    }

    #[test]
    fn test_display_keeps_flow_message() {
        let err = AppError::from(FlowError::MissingConfiguration);
        assert_eq!(err.to_string(), "Supabase configuration is missing");
    }
}
