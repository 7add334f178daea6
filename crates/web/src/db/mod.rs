//! Remote table access.
//!
//! All persistence lives in the hosted store. This module defines the
//! narrow interface the marketplace needs from it:
//!
//! - insert a row into a named table
//! - select rows filtered by equality and ordered by a column
//! - update rows filtered by equality
//!
//! ## Tables
//!
//! - `user_profiles` - first name and vetting flag, one row per user
//! - `loads` - freight postings
//! - `bids` - carrier offers against a load
//! - `vetting_requests` - carrier applications
//!
//! Every call carries the caller's [`AccessToken`] so the store can apply
//! row-level security. The production implementation is
//! [`crate::supabase::SupabaseClient`]; typed repositories in the submodules
//! sit on top of the [`DataStore`] trait.

pub mod bids;
pub mod loads;
pub mod profiles;
pub mod vetting;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::AccessToken;

pub use bids::BidRepository;
pub use loads::LoadRepository;
pub use profiles::ProfileRepository;
pub use vetting::VettingRepository;

/// Tables the marketplace reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    UserProfiles,
    Loads,
    Bids,
    VettingRequests,
}

impl Table {
    /// The table name in the remote store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserProfiles => "user_profiles",
            Self::Loads => "loads",
            Self::Bids => "bids",
            Self::VettingRequests => "vetting_requests",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An equality filter (`column = value`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    /// Match rows whose `column` equals `value`.
    #[must_use]
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }
}

/// Sort order for a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

/// A select against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub table: Table,
    pub columns: &'static str,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Select {
    /// Select every column of `table`.
    #[must_use]
    pub const fn from(table: Table) -> Self {
        Self {
            table,
            columns: "*",
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Restrict the returned columns (comma separated).
    #[must_use]
    pub const fn columns(mut self, columns: &'static str) -> Self {
        self.columns = columns;
        self
    }

    /// Add an equality filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sort by `column`, newest/largest first.
    #[must_use]
    pub const fn order_desc(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            descending: true,
        });
        self
    }

    /// Return at most `limit` rows.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Errors from the remote store.
///
/// `Display` is the store's own message, unmodified, so flows can hand it
/// straight back to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with an error body.
    #[error("{message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never got an answer.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// A table URL could not be built.
    #[error("invalid store URL: {0}")]
    Url(#[from] url::ParseError),

    /// A row did not match the expected shape.
    #[error("unexpected row from {table}: {message}")]
    Decode { table: Table, message: String },
}

impl StoreError {
    /// Build a rejection from a status and message.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            code: None,
            message: message.into(),
        }
    }
}

/// Row-level operations against the hosted store.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Insert one row into `table`.
    async fn insert(&self, token: &AccessToken, table: Table, row: Value)
    -> Result<(), StoreError>;

    /// Read the rows matching `query`.
    async fn select(&self, token: &AccessToken, query: &Select) -> Result<Vec<Value>, StoreError>;

    /// Apply `patch` to every row of `table` matching all `filters`.
    async fn update(
        &self,
        token: &AccessToken,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<(), StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Serialize a typed row for insertion.
pub(crate) fn to_row<T: serde::Serialize>(table: Table, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Decode {
        table,
        message: e.to_string(),
    })
}

/// Decode rows returned by a select.
pub(crate) fn from_rows<T: DeserializeOwned>(
    table: Table,
    rows: Vec<Value>,
) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| StoreError::Decode {
                table,
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(Table::UserProfiles.as_str(), "user_profiles");
        assert_eq!(Table::Loads.as_str(), "loads");
        assert_eq!(Table::Bids.as_str(), "bids");
        assert_eq!(Table::VettingRequests.as_str(), "vetting_requests");
    }

    #[test]
    fn test_select_builder() {
        let query = Select::from(Table::Loads)
            .columns("id,status")
            .filter(Filter::eq("status", "posted"))
            .order_desc("created_at")
            .limit(10);

        assert_eq!(query.columns, "id,status");
        assert_eq!(query.filters, vec![Filter::eq("status", "posted")]);
        assert_eq!(
            query.order,
            Some(Order {
                column: "created_at",
                descending: true
            })
        );
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_rejection_displays_store_message_verbatim() {
        let err = StoreError::rejected(409, "duplicate key value violates unique constraint");
        assert_eq!(
            err.to_string(),
            "duplicate key value violates unique constraint"
        );
    }
}
