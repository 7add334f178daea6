//! Load submission.

use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use hitchyard_core::{LoadStatus, Weight, ZipCode};

use super::{FlowError, Marketplace, required, string_or_number};
use crate::db::LoadRepository;
use crate::models::{AccessToken, NewLoad};

/// A shipper's load posting, as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadSubmission {
    #[serde(default)]
    pub origin_zip: String,
    #[serde(default)]
    pub destination_zip: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub load_weight: String,
    #[serde(default)]
    pub commodity_type: String,
}

struct ValidLoad {
    origin_zip: ZipCode,
    destination_zip: ZipCode,
    load_weight: Weight,
    commodity_type: String,
}

impl LoadSubmission {
    fn validate(&self) -> Result<ValidLoad, FlowError> {
        let origin_zip = ZipCode::parse(&self.origin_zip)
            .map_err(|_| FlowError::validation("Origin ZIP must be a 5-digit ZIP code"))?;
        let destination_zip = ZipCode::parse(&self.destination_zip)
            .map_err(|_| FlowError::validation("Destination ZIP must be a 5-digit ZIP code"))?;
        let load_weight = Weight::parse(&self.load_weight)
            .map_err(|_| FlowError::validation("Load weight must be greater than zero"))?;
        let commodity_type = required(&self.commodity_type, "Commodity type is required")?;

        Ok(ValidLoad {
            origin_zip,
            destination_zip,
            load_weight,
            commodity_type,
        })
    }
}

impl Marketplace {
    /// Post a new load owned by the caller, with status `posted`.
    ///
    /// Each call inserts one row; resubmitting creates a duplicate.
    ///
    /// # Errors
    ///
    /// [`FlowError::Unauthenticated`] without a verified caller,
    /// [`FlowError::Validation`] for bad input, or the store's error.
    #[instrument(skip_all)]
    pub async fn post_load(
        &self,
        token: Option<AccessToken>,
        input: &LoadSubmission,
    ) -> Result<(), FlowError> {
        let token = token.ok_or(FlowError::Unauthenticated)?;
        let valid = input.validate()?;
        let user = self.authenticate(token).await?;

        let load = NewLoad {
            user_id: user.id(),
            origin_zip: valid.origin_zip,
            destination_zip: valid.destination_zip,
            load_weight: valid.load_weight,
            commodity_type: valid.commodity_type,
            status: LoadStatus::Posted,
            created_at: Utc::now(),
        };

        LoadRepository::new(self.store(), &user.token)
            .create(&load)
            .await?;

        tracing::info!(user_id = %user.id(), "load posted");
        Ok(())
    }
}
