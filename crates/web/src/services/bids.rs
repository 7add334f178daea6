//! Bid submission.

use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use hitchyard_core::{LoadId, UsdAmount};

use super::{FlowError, Marketplace, string_or_number};
use crate::db::BidRepository;
use crate::models::{AccessToken, NewBid};

const BID_NOT_POSITIVE: &str = "Bid amount must be greater than zero";

/// A carrier's bid on an open load.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidSubmission {
    #[serde(default)]
    pub load_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub bid_amount: String,
}

impl BidSubmission {
    fn validate(&self) -> Result<(LoadId, UsdAmount), FlowError> {
        // Blank and unparseable amounts get the same message as zero.
        let amount =
            UsdAmount::parse(&self.bid_amount).map_err(|_| FlowError::validation(BID_NOT_POSITIVE))?;
        let load_id = self
            .load_id
            .parse::<LoadId>()
            .map_err(|_| FlowError::validation("Invalid load ID"))?;
        Ok((load_id, amount))
    }
}

impl Marketplace {
    /// Record a bid by the caller on a load.
    ///
    /// Returns the confirmation shown to the carrier. The load is not
    /// checked for being open, and carriers may bid any number of times.
    ///
    /// # Errors
    ///
    /// [`FlowError::Unauthenticated`] without a verified caller,
    /// [`FlowError::Validation`] for a non-positive amount or bad load ID,
    /// or the store's error.
    #[instrument(skip_all, fields(load_id = %input.load_id))]
    pub async fn submit_bid(
        &self,
        token: Option<AccessToken>,
        input: &BidSubmission,
    ) -> Result<String, FlowError> {
        let token = token.ok_or(FlowError::Unauthenticated)?;
        let (load_id, bid_amount) = input.validate()?;
        let user = self.authenticate(token).await?;

        let bid = NewBid {
            load_id,
            carrier_id: user.id(),
            bid_amount,
            created_at: Utc::now(),
        };

        BidRepository::new(self.store(), &user.token)
            .create(&bid)
            .await?;

        tracing::info!(carrier_id = %user.id(), amount = %bid_amount, "bid submitted");
        Ok(format!(
            "Your bid of {} has been submitted successfully.",
            bid_amount.display()
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::Table;
    use crate::test_support::{StoreOp, TestBackend};

    fn bid(load_id: LoadId, amount: &str) -> BidSubmission {
        BidSubmission {
            load_id: load_id.to_string(),
            bid_amount: amount.to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_bid_message_has_two_decimals() {
        let backend = TestBackend::new();
        let (carrier, token) = backend.sign_in("carrier@example.com");
        let load_id = LoadId::random();

        let message = backend
            .marketplace()
            .submit_bid(Some(token), &bid(load_id, "250.5"))
            .await
            .unwrap();

        assert_eq!(message, "Your bid of $250.50 has been submitted successfully.");

        let rows = backend.store.rows(Table::Bids);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["load_id"], load_id.to_string());
        assert_eq!(rows[0]["carrier_id"], carrier.to_string());
        assert_eq!(rows[0]["bid_amount"], "250.5");
    }

    #[tokio::test]
    async fn test_non_positive_bid_makes_no_remote_call() {
        let backend = TestBackend::new();
        let (_, token) = backend.sign_in("carrier@example.com");
        let marketplace = backend.marketplace();

        for amount in ["0", "-5", "", "abc", "0.00"] {
            let err = marketplace
                .submit_bid(Some(token.clone()), &bid(LoadId::random(), amount))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Bid amount must be greater than zero");
        }

        assert!(backend.store.calls().is_empty());
        assert_eq!(backend.identity.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_load_id() {
        let backend = TestBackend::new();
        let (_, token) = backend.sign_in("carrier@example.com");

        let input = BidSubmission {
            load_id: "not-a-load".to_string(),
            bid_amount: "100".to_string(),
        };
        let err = backend
            .marketplace()
            .submit_bid(Some(token), &input)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid load ID");
        assert!(backend.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unauthenticated_bid() {
        let backend = TestBackend::new();

        let err = backend
            .marketplace()
            .submit_bid(None, &bid(LoadId::random(), "100"))
            .await
            .unwrap_err();

        assert!(err.is_unauthenticated());
        assert!(backend.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bid_store_failure_is_verbatim() {
        let backend = TestBackend::new();
        let (_, token) = backend.sign_in("carrier@example.com");
        backend.store.fail(
            StoreOp::Insert,
            Table::Bids,
            "insert or update on table \"bids\" violates foreign key constraint \"bids_load_id_fkey\"",
        );

        let err = backend
            .marketplace()
            .submit_bid(Some(token), &bid(LoadId::random(), "100"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "insert or update on table \"bids\" violates foreign key constraint \"bids_load_id_fkey\""
        );
    }

    #[tokio::test]
    async fn test_large_json_amount_is_accepted() {
        let backend = TestBackend::new();
        let (_, token) = backend.sign_in("carrier@example.com");
        let load_id = LoadId::random();

        let input: BidSubmission = serde_json::from_value(serde_json::json!({
            "load_id": load_id.to_string(),
            "bid_amount": 1e21
        }))
        .unwrap();

        let message = backend
            .marketplace()
            .submit_bid(Some(token), &input)
            .await
            .unwrap();

        assert!(message.starts_with("Your bid of $1000000000000000000000"));
        assert_eq!(backend.store.rows(Table::Bids).len(), 1);
    }

    #[tokio::test]
    async fn test_repeat_bids_are_allowed() {
        let backend = TestBackend::new();
        let (_, token) = backend.sign_in("carrier@example.com");
        let marketplace = backend.marketplace();
        let load_id = LoadId::random();

        marketplace
            .submit_bid(Some(token.clone()), &bid(load_id, "100"))
            .await
            .unwrap();
        marketplace
            .submit_bid(Some(token), &bid(load_id, "95"))
            .await
            .unwrap();

        assert_eq!(backend.store.rows(Table::Bids).len(), 2);
    }
}
