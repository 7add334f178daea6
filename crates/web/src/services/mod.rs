//! Marketplace flows.
//!
//! # Services
//!
//! - `auth` - identity provider interface and session guard
//! - `accounts` - signup, sign-in, sign-out
//! - `loads` - load submission
//! - `bids` - bid submission
//! - `vetting` - vetting submission and CRM notification
//! - `listing` - dashboard and load listings
//! - `webhook` - CRM webhook client
//!
//! Every mutating flow runs the same steps in the same order:
//!
//! 1. no access token in the session: [`FlowError::Unauthenticated`]
//! 2. input validation: [`FlowError::Validation`], no remote call
//! 3. identity re-verified with the provider through [`SessionGuard`]
//! 4. the remote write, whose error message is returned verbatim
//!
//! The missing-configuration check happens before all of this, when
//! [`crate::state::AppState::marketplace`] finds no Supabase project.

pub mod accounts;
pub mod auth;
pub mod bids;
mod error;
pub mod listing;
pub mod loads;
pub mod vetting;
pub mod webhook;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};

pub use accounts::{SignInForm, SignUpForm};
pub use auth::{AuthError, IdentityProvider, SessionGuard};
pub use bids::BidSubmission;
pub use error::{ActionOutcome, FlowError};
pub use listing::Dashboard;
pub use loads::LoadSubmission;
pub use vetting::VettingSubmission;
pub use webhook::{VettingNotification, VettingNotifier, WebhookClient, WebhookError};

use crate::db::DataStore;
use crate::models::{AccessToken, AuthenticatedUser};

/// The marketplace service.
///
/// Holds the remote clients, injected at startup. Cheap to clone.
#[derive(Clone)]
pub struct Marketplace {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DataStore>,
    notifier: Arc<dyn VettingNotifier>,
}

impl Marketplace {
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DataStore>,
        notifier: Arc<dyn VettingNotifier>,
    ) -> Self {
        Self {
            identity,
            store,
            notifier,
        }
    }

    /// The identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    /// The remote data store.
    #[must_use]
    pub fn store(&self) -> &dyn DataStore {
        self.store.as_ref()
    }

    fn notifier(&self) -> &dyn VettingNotifier {
        self.notifier.as_ref()
    }

    /// Verify the caller with the identity provider.
    pub(crate) async fn authenticate(
        &self,
        token: AccessToken,
    ) -> Result<AuthenticatedUser, FlowError> {
        SessionGuard::new(self.identity())
            .verify(Some(token))
            .await
            .ok_or(FlowError::Unauthenticated)
    }
}

/// Trim a required text field, or fail with `message`.
pub(crate) fn required(value: &str, message: &str) -> Result<String, FlowError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FlowError::validation(message));
    }
    Ok(value.to_string())
}

/// Accept a field sent as either a JSON string or a JSON number.
///
/// Form posts always send text; the JSON API may send numbers. Numbers in
/// exponent form (`1e21`) are expanded to plain decimals.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => text,
        Some(Raw::Number(number)) => {
            plain_decimal(&number.to_string()).map_err(<D::Error as de::Error>::custom)?
        }
        None => String::new(),
    })
}

fn plain_decimal(number: &str) -> Result<String, &'static str> {
    if !number.contains(['e', 'E']) {
        return Ok(number.to_string());
    }
    Decimal::from_scientific(number)
        .map(|value| value.normalize().to_string())
        .map_err(|_| "number out of range")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Amount {
        #[serde(default, deserialize_with = "string_or_number")]
        value: String,
    }

    #[test]
    fn test_string_or_number() {
        let parsed: Amount = serde_json::from_str(r#"{"value": 250.5}"#).unwrap();
        assert_eq!(parsed.value, "250.5");

        let parsed: Amount = serde_json::from_str(r#"{"value": "250.50"}"#).unwrap();
        assert_eq!(parsed.value, "250.50");

        let parsed: Amount = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(parsed.value, "");

        let parsed: Amount = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.value, "");
    }

    #[test]
    fn test_string_or_number_expands_exponents() {
        let parsed: Amount = serde_json::from_str(r#"{"value": 1e21}"#).unwrap();
        assert_eq!(
            parsed.value.parse::<Decimal>().unwrap(),
            "1000000000000000000000".parse::<Decimal>().unwrap()
        );

        let parsed: Amount = serde_json::from_str(r#"{"value": 2.5e-3}"#).unwrap();
        assert_eq!(parsed.value, "0.0025");

        assert!(serde_json::from_str::<Amount>(r#"{"value": 1e300}"#).is_err());
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  Acme  ", "Company name is required").unwrap(), "Acme");
        assert_eq!(
            required("   ", "Company name is required").unwrap_err().to_string(),
            "Company name is required"
        );
    }
}
