//! User profile repository.

use hitchyard_core::UserId;
use serde_json::json;

use super::{DataStore, Filter, Select, StoreError, Table, from_rows};
use crate::models::profile::{PROFILE_COLUMNS, PROFILE_OWNER_COLUMN};
use crate::models::{AccessToken, UserProfile};

/// Repository for the `user_profiles` table.
pub struct ProfileRepository<'a> {
    store: &'a dyn DataStore,
    token: &'a AccessToken,
}

impl<'a> ProfileRepository<'a> {
    /// Create a repository scoped to the caller's token.
    #[must_use]
    pub const fn new(store: &'a dyn DataStore, token: &'a AccessToken) -> Self {
        Self { store, token }
    }

    /// Get the profile owned by `user`.
    ///
    /// Returns `None` when no profile row exists yet.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read fails or the row cannot be decoded.
    pub async fn get(&self, user: UserId) -> Result<Option<UserProfile>, StoreError> {
        let query = Select::from(Table::UserProfiles)
            .columns(PROFILE_COLUMNS)
            .filter(Filter::eq(PROFILE_OWNER_COLUMN, user))
            .limit(1);

        let rows = self.store.select(self.token, &query).await?;
        Ok(from_rows(Table::UserProfiles, rows)?.into_iter().next())
    }

    /// Flag `user` as awaiting vetting review.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the update is rejected or never answered.
    pub async fn mark_vetting_pending(&self, user: UserId) -> Result<(), StoreError> {
        self.store
            .update(
                self.token,
                Table::UserProfiles,
                &[Filter::eq(PROFILE_OWNER_COLUMN, user)],
                json!({ "is_vetting_pending": true }),
            )
            .await
    }
}
