//! CRM webhook notified of new vetting requests.
//!
//! Delivery is best effort: the vetting flow logs a failed notification and
//! carries on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use hitchyard_core::UserId;

use crate::config::WebhookConfig;

/// Errors that can occur when posting to the webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// HTTP request failed or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("webhook returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VettingNotification {
    pub user_id: UserId,
    pub company_name: String,
    pub dot_number: String,
    pub legal_entity_type: String,
    pub submitted_at: DateTime<Utc>,
}

/// Receives vetting notifications.
#[async_trait]
pub trait VettingNotifier: Send + Sync {
    /// Deliver one notification.
    async fn notify(&self, notification: &VettingNotification) -> Result<(), WebhookError>;
}

/// Posts notifications as JSON to a configured URL.
#[derive(Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: Url,
}

impl WebhookClient {
    /// Create a webhook client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &WebhookConfig) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

impl std::fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Webhook URLs commonly embed a shared secret in the path.
        f.debug_struct("WebhookClient")
            .field("host", &self.url.host_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VettingNotifier for WebhookClient {
    #[instrument(skip_all, fields(user_id = %notification.user_id))]
    async fn notify(&self, notification: &VettingNotification) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(notification)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WebhookError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!("vetting webhook delivered");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::{Json, Router, http::StatusCode, routing::post};
    use tokio::sync::mpsc;

    use super::*;

    fn notification(user_id: UserId) -> VettingNotification {
        VettingNotification {
            user_id,
            company_name: "Acme Freight LLC".to_string(),
            dot_number: "1234567".to_string(),
            legal_entity_type: "LLC".to_string(),
            submitted_at: DateTime::parse_from_rfc3339("2026-10-16T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    /// Serve `app` on a local port and return a client posting to `path`.
    async fn client_for(app: Router, path: &str, timeout: Duration) -> WebhookClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let url = Url::parse(&format!("http://{addr}{path}")).unwrap();
        WebhookClient::new(&WebhookConfig { url, timeout }).unwrap()
    }

    #[tokio::test]
    async fn test_notify_posts_json() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/hooks/vetting",
            post(move |Json(body): Json<serde_json::Value>| async move {
                tx.send(body).unwrap();
                StatusCode::NO_CONTENT
            }),
        );
        let client = client_for(app, "/hooks/vetting", Duration::from_secs(5)).await;
        let user_id = UserId::random();

        client.notify(&notification(user_id)).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received["user_id"], user_id.to_string());
        assert_eq!(received["dot_number"], "1234567");
    }

    #[tokio::test]
    async fn test_notify_non_success_status() {
        let app = Router::new().route(
            "/hooks/vetting",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "crm down") }),
        );
        let client = client_for(app, "/hooks/vetting", Duration::from_secs(5)).await;

        let err = client
            .notify(&notification(UserId::random()))
            .await
            .unwrap_err();

        match err {
            WebhookError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "crm down");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_notify_times_out() {
        let app = Router::new().route(
            "/hooks/vetting",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let client = client_for(app, "/hooks/vetting", Duration::from_millis(100)).await;

        let err = client
            .notify(&notification(UserId::random()))
            .await
            .unwrap_err();

        assert!(matches!(&err, WebhookError::Http(e) if e.is_timeout()), "{err:?}");
    }

    #[test]
    fn test_notification_body() {
        let user_id = UserId::random();
        let notification = notification(user_id);

        let body = serde_json::to_value(&notification).unwrap();
        assert_eq!(body["user_id"], user_id.to_string());
        assert_eq!(body["company_name"], "Acme Freight LLC");
        assert_eq!(body["dot_number"], "1234567");
        assert_eq!(body["legal_entity_type"], "LLC");
        assert_eq!(body["submitted_at"], "2026-10-16T12:00:00Z");
    }

    #[test]
    fn test_debug_hides_path() {
        let config = WebhookConfig::from_parts(
            Some("https://hooks.example.com/secret-path-token".to_string()),
            None,
        )
        .unwrap();
        let client = WebhookClient::new(&config).unwrap();

        let debug = format!("{client:?}");
        assert!(debug.contains("hooks.example.com"));
        assert!(!debug.contains("secret-path-token"));
    }
}
