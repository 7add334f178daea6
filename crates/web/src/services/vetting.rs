//! Carrier vetting submission.
//!
//! Three remote steps, strictly in order:
//!
//! 1. insert the `vetting_requests` row
//! 2. flag the caller's profile with `is_vetting_pending = true`
//! 3. notify the CRM webhook
//!
//! A failed step stops the chain and its error is returned. Nothing is rolled
//! back, so a failed profile update leaves the request row in place. The
//! webhook is best effort: its failure is logged and the submission still
//! succeeds.

use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use super::{FlowError, Marketplace, VettingNotification, required};
use crate::db::{ProfileRepository, VettingRepository};
use crate::models::{AccessToken, NewVettingRequest};

/// A carrier's vetting application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VettingSubmission {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub dot_number: String,
    #[serde(default)]
    pub legal_entity_type: String,
}

struct ValidVetting {
    company_name: String,
    dot_number: String,
    legal_entity_type: String,
}

impl VettingSubmission {
    fn validate(&self) -> Result<ValidVetting, FlowError> {
        Ok(ValidVetting {
            company_name: required(&self.company_name, "Company name is required")?,
            dot_number: required(&self.dot_number, "DOT number is required")?,
            legal_entity_type: required(&self.legal_entity_type, "Legal entity type is required")?,
        })
    }
}

impl Marketplace {
    /// Submit the caller's vetting application.
    ///
    /// # Errors
    ///
    /// [`FlowError::Unauthenticated`] without a verified caller,
    /// [`FlowError::Validation`] for a missing field, or the store's error
    /// from the insert or the profile update.
    #[instrument(skip_all)]
    pub async fn submit_vetting(
        &self,
        token: Option<AccessToken>,
        input: &VettingSubmission,
    ) -> Result<(), FlowError> {
        let token = token.ok_or(FlowError::Unauthenticated)?;
        let valid = input.validate()?;
        let user = self.authenticate(token).await?;
        let submitted_at = Utc::now();

        let request = NewVettingRequest {
            user_id: user.id(),
            company_name: valid.company_name,
            dot_number: valid.dot_number,
            legal_entity_type: valid.legal_entity_type,
            created_at: submitted_at,
        };

        VettingRepository::new(self.store(), &user.token)
            .create(&request)
            .await?;

        ProfileRepository::new(self.store(), &user.token)
            .mark_vetting_pending(user.id())
            .await
            .inspect_err(|e| {
                tracing::error!(
                    user_id = %user.id(),
                    error = %e,
                    "vetting request saved but profile update failed"
                );
            })?;

        let notification = VettingNotification {
            user_id: user.id(),
            company_name: request.company_name,
            dot_number: request.dot_number,
            legal_entity_type: request.legal_entity_type,
            submitted_at,
        };
        if let Err(e) = self.notifier().notify(&notification).await {
            tracing::warn!(
                user_id = %user.id(),
                error = %e,
                "vetting webhook notification failed"
            );
        }

        tracing::info!(user_id = %user.id(), "vetting request submitted");
        Ok(())
    }
}
