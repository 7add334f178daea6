//! User profile rows.

use serde::Deserialize;

/// Column the profile is keyed on.
pub const PROFILE_OWNER_COLUMN: &str = "user_id";

/// Columns read for the dashboard.
pub const PROFILE_COLUMNS: &str = "first_name,is_vetting_pending";

/// The slice of `user_profiles` this application reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub is_vetting_pending: bool,
}

impl UserProfile {
    /// Name used in the dashboard greeting.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("User")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_user() {
        assert_eq!(UserProfile::default().display_name(), "User");

        let blank = UserProfile {
            first_name: Some("  ".to_string()),
            is_vetting_pending: false,
        };
        assert_eq!(blank.display_name(), "User");
    }

    #[test]
    fn test_display_name_uses_first_name() {
        let profile = UserProfile {
            first_name: Some("Dana".to_string()),
            is_vetting_pending: true,
        };
        assert_eq!(profile.display_name(), "Dana");
    }
}
