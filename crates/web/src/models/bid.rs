//! Bid rows.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hitchyard_core::{LoadId, UsdAmount, UserId};

/// A bid as inserted by the bid submission flow.
///
/// Bids are immutable once written; there is no accept or reject step.
#[derive(Debug, Clone, Serialize)]
pub struct NewBid {
    pub load_id: LoadId,
    pub carrier_id: UserId,
    pub bid_amount: UsdAmount,
    pub created_at: DateTime<Utc>,
}
