//! Load repository.

use hitchyard_core::{LoadStatus, UserId};

use super::{DataStore, Filter, Select, StoreError, Table, from_rows, to_row};
use crate::models::load::LOAD_COLUMNS;
use crate::models::{AccessToken, Load, NewLoad};

/// Repository for the `loads` table.
pub struct LoadRepository<'a> {
    store: &'a dyn DataStore,
    token: &'a AccessToken,
}

impl<'a> LoadRepository<'a> {
    /// Create a repository scoped to the caller's token.
    #[must_use]
    pub const fn new(store: &'a dyn DataStore, token: &'a AccessToken) -> Self {
        Self { store, token }
    }

    /// Insert a new load.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the insert is rejected or never answered.
    pub async fn create(&self, load: &NewLoad) -> Result<(), StoreError> {
        let row = to_row(Table::Loads, load)?;
        self.store.insert(self.token, Table::Loads, row).await
    }

    /// Loads posted by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read fails or a row cannot be decoded.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Load>, StoreError> {
        let query = Select::from(Table::Loads)
            .columns(LOAD_COLUMNS)
            .filter(Filter::eq("user_id", owner))
            .order_desc("created_at");

        let rows = self.store.select(self.token, &query).await?;
        from_rows(Table::Loads, rows)
    }

    /// Every load still open for bidding, newest first.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read fails or a row cannot be decoded.
    pub async fn list_open(&self) -> Result<Vec<Load>, StoreError> {
        let query = Select::from(Table::Loads)
            .columns(LOAD_COLUMNS)
            .filter(Filter::eq("status", LoadStatus::Posted))
            .order_desc("created_at");

        let rows = self.store.select(self.token, &query).await?;
        from_rows(Table::Loads, rows)
    }
}
