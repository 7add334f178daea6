//! Load lifecycle status.

use serde::{Deserialize, Serialize};

/// Status of a posted load.
///
/// Loads are created as [`LoadStatus::Posted`]. Nothing in Hitchyard moves a
/// load to another status; `Assigned` and `Other` exist so rows changed
/// out-of-band still deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// Open for bidding.
    #[default]
    Posted,
    /// A carrier has been assigned.
    Assigned,
    /// Any status this application does not know about.
    #[serde(other)]
    Other,
}

impl LoadStatus {
    /// The value stored in the `status` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Posted => "posted",
            Self::Assigned => "assigned",
            Self::Other => "other",
        }
    }

    /// Whether carriers may still bid on the load.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Posted)
    }
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
