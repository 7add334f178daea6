//! Load rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hitchyard_core::{LoadId, LoadStatus, UserId, Weight, ZipCode};

/// Columns read back for a load.
pub const LOAD_COLUMNS: &str =
    "id,user_id,origin_zip,destination_zip,load_weight,commodity_type,status,created_at";

/// A load as inserted by the load submission flow.
#[derive(Debug, Clone, Serialize)]
pub struct NewLoad {
    pub user_id: UserId,
    pub origin_zip: ZipCode,
    pub destination_zip: ZipCode,
    pub load_weight: Weight,
    pub commodity_type: String,
    pub status: LoadStatus,
    pub created_at: DateTime<Utc>,
}

/// A load as read from the `loads` table.
///
/// Values coming back from the store are assumed valid and are not
/// re-validated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Load {
    pub id: LoadId,
    pub user_id: UserId,
    pub origin_zip: String,
    pub destination_zip: String,
    pub load_weight: Decimal,
    pub commodity_type: String,
    pub status: LoadStatus,
    pub created_at: DateTime<Utc>,
}

impl Load {
    /// Weight formatted for tables, e.g. `5000 lbs`.
    #[must_use]
    pub fn weight_label(&self) -> String {
        format!("{} lbs", self.load_weight.normalize())
    }

    /// Posting date formatted for tables, e.g. `Oct 16, 2026`.
    #[must_use]
    pub fn posted_on(&self) -> String {
        self.created_at.format("%b %-d, %Y").to_string()
    }
}
