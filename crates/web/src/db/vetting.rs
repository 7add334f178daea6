//! Vetting request repository.

use super::{DataStore, StoreError, Table, to_row};
use crate::models::{AccessToken, NewVettingRequest};

/// Repository for the `vetting_requests` table.
pub struct VettingRepository<'a> {
    store: &'a dyn DataStore,
    token: &'a AccessToken,
}

impl<'a> VettingRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DataStore, token: &'a AccessToken) -> Self {
        Self { store, token }
    }

    /// Insert a vetting application.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the insert is rejected or never answered.
    pub async fn create(&self, request: &NewVettingRequest) -> Result<(), StoreError> {
        let row = to_row(Table::VettingRequests, request)?;
        self.store
            .insert(self.token, Table::VettingRequests, row)
            .await
    }
}
