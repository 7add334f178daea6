//! Vetting request rows.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hitchyard_core::UserId;

/// A carrier vetting application as inserted by the vetting flow.
#[derive(Debug, Clone, Serialize)]
pub struct NewVettingRequest {
    pub user_id: UserId,
    pub company_name: String,
    pub dot_number: String,
    pub legal_entity_type: String,
    pub created_at: DateTime<Utc>,
}
