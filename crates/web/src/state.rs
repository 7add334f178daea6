//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::HitchyardConfig;
use crate::services::{FlowError, Marketplace, WebhookClient, WebhookError};
use crate::supabase::{ClientError, SupabaseClient};

/// Errors wiring the remote clients at startup.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Supabase client error: {0}")]
    Supabase(#[from] ClientError),

    #[error("webhook client error: {0}")]
    Webhook(#[from] WebhookError),
}

/// Application state shared across all handlers.
///
/// Cheap to clone (uses `Arc` internally).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: HitchyardConfig,
    marketplace: Option<Marketplace>,
}

impl AppState {
    /// Create application state from already-built services.
    ///
    /// `marketplace` is `None` when no Supabase project is configured.
    #[must_use]
    pub fn new(config: HitchyardConfig, marketplace: Option<Marketplace>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                marketplace,
            }),
        }
    }

    /// Build the Supabase and webhook clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client fails to build.
    pub fn from_config(config: HitchyardConfig) -> Result<Self, StateError> {
        let marketplace = match &config.supabase {
            Some(supabase) => {
                let client = Arc::new(SupabaseClient::new(supabase)?);
                let notifier = Arc::new(WebhookClient::new(&config.webhook)?);
                Some(Marketplace::new(client.clone(), client, notifier))
            }
            None => None,
        };

        Ok(Self::new(config, marketplace))
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &HitchyardConfig {
        &self.inner.config
    }

    /// The marketplace, if a Supabase project is configured.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::MissingConfiguration`] otherwise.
    pub fn marketplace(&self) -> Result<&Marketplace, FlowError> {
        self.inner
            .marketplace
            .as_ref()
            .ok_or(FlowError::MissingConfiguration)
    }
}
