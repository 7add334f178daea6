//! Flow errors and the outcome shape returned to callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::auth::AuthError;
use crate::db::StoreError;

/// Why a marketplace action did not complete.
///
/// `Display` is exactly the message shown to the user.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Supabase URL or key is not configured. No remote call was made.
    #[error("Supabase configuration is missing")]
    MissingConfiguration,

    /// No verified identity. Callers are sent to `/signup`.
    #[error("User not authenticated")]
    Unauthenticated,

    /// Input failed validation. No remote call was made.
    #[error("{0}")]
    Validation(String),

    /// The store rejected or never answered the call.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The identity provider rejected or never answered the call.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl FlowError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the caller should be redirected to sign up.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

/// Result of a marketplace action, as returned to the browser.
///
/// Exactly one of `message`/`error` is meaningful: `error` is set when
/// `success` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionOutcome {
    /// A success with no message.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// A success carrying a message for the user.
    #[must_use]
    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A failure carrying the error's user-facing message.
    #[must_use]
    pub fn failed(error: &FlowError) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<Result<Option<String>, FlowError>> for ActionOutcome {
    fn from(result: Result<Option<String>, FlowError>) -> Self {
        match result {
            Ok(Some(message)) => Self::ok_with(message),
            Ok(None) => Self::ok(),
            Err(e) => Self::failed(&e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            FlowError::MissingConfiguration.to_string(),
            "Supabase configuration is missing"
        );
        assert_eq!(FlowError::Unauthenticated.to_string(), "User not authenticated");
        assert_eq!(
            FlowError::validation("Bid amount must be greater than zero").to_string(),
            "Bid amount must be greater than zero"
        );
    }

    #[test]
    fn test_store_message_passes_through() {
        let err = FlowError::from(StoreError::rejected(
            403,
            "new row violates row-level security policy for table \"loads\"",
        ));
        assert_eq!(
            err.to_string(),
            "new row violates row-level security policy for table \"loads\""
        );
    }

    #[test]
    fn test_outcome_json_shape() {
        let ok = serde_json::to_value(ActionOutcome::ok()).unwrap();
        assert_eq!(ok, serde_json::json!({ "success": true }));

        let failed = serde_json::to_value(ActionOutcome::failed(&FlowError::Unauthenticated)).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({ "success": false, "error": "User not authenticated" })
        );
    }

    #[test]
    fn test_outcome_from_result() {
        let outcome = ActionOutcome::from(Ok(Some("done".to_string())));
        assert_eq!(outcome, ActionOutcome::ok_with("done"));

        let outcome = ActionOutcome::from(Err(FlowError::MissingConfiguration));
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Supabase configuration is missing"));
    }
}
