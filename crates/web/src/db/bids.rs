//! Bid repository.

use super::{DataStore, StoreError, Table, to_row};
use crate::models::{AccessToken, NewBid};

/// Repository for the `bids` table.
pub struct BidRepository<'a> {
    store: &'a dyn DataStore,
    token: &'a AccessToken,
}

impl<'a> BidRepository<'a> {
    /// Create a repository scoped to the caller's token.
    #[must_use]
    pub const fn new(store: &'a dyn DataStore, token: &'a AccessToken) -> Self {
        Self { store, token }
    }

    /// Insert a bid.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the insert is rejected or never answered.
    pub async fn create(&self, bid: &NewBid) -> Result<(), StoreError> {
        let row = to_row(Table::Bids, bid)?;
        self.store.insert(self.token, Table::Bids, row).await
    }
}
