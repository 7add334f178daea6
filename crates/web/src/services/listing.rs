//! Dashboard and load listings.

use tracing::instrument;

use super::{FlowError, Marketplace};
use crate::db::{LoadRepository, ProfileRepository};
use crate::models::{AccessToken, AuthenticatedUser, Load, UserProfile};

/// What the dashboard shows about the caller.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub email: Option<String>,
    pub profile: UserProfile,
}

impl Dashboard {
    /// Name used in the greeting.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.profile.display_name()
    }
}

impl Marketplace {
    async fn reader(&self, token: Option<AccessToken>) -> Result<AuthenticatedUser, FlowError> {
        let token = token.ok_or(FlowError::Unauthenticated)?;
        self.authenticate(token).await
    }

    /// The caller's profile for the dashboard greeting.
    ///
    /// A caller without a profile row gets the default profile.
    ///
    /// # Errors
    ///
    /// [`FlowError::Unauthenticated`] without a verified caller, or the
    /// store's error.
    #[instrument(skip_all)]
    pub async fn dashboard(&self, token: Option<AccessToken>) -> Result<Dashboard, FlowError> {
        let user = self.reader(token).await?;
        let profile = ProfileRepository::new(self.store(), &user.token)
            .get(user.id())
            .await?
            .unwrap_or_default();

        Ok(Dashboard {
            email: user.identity.email,
            profile,
        })
    }

    /// Loads the caller posted, newest first.
    ///
    /// # Errors
    ///
    /// [`FlowError::Unauthenticated`] without a verified caller, or the
    /// store's error.
    #[instrument(skip_all)]
    pub async fn my_loads(&self, token: Option<AccessToken>) -> Result<Vec<Load>, FlowError> {
        let user = self.reader(token).await?;
        let loads = LoadRepository::new(self.store(), &user.token)
            .list_for_owner(user.id())
            .await?;

        tracing::debug!(user_id = %user.id(), count = loads.len(), "listed own loads");
        Ok(loads)
    }

    /// Every load open for bidding, newest first. No pagination.
    ///
    /// # Errors
    ///
    /// [`FlowError::Unauthenticated`] without a verified caller, or the
    /// store's error.
    #[instrument(skip_all)]
    pub async fn open_loads(&self, token: Option<AccessToken>) -> Result<Vec<Load>, FlowError> {
        let user = self.reader(token).await?;
        let loads = LoadRepository::new(self.store(), &user.token)
            .list_open()
            .await?;

        tracing::debug!(count = loads.len(), "listed open loads");
        Ok(loads)
    }
}
