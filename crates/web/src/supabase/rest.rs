//! `PostgREST` table access.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{ErrorBody, SupabaseClient};
use crate::db::{DataStore, Filter, Select, StoreError, Table};
use crate::models::AccessToken;

/// Ask `PostgREST` not to echo written rows back.
const PREFER_MINIMAL: &str = "return=minimal";

impl SupabaseClient {
    fn table_url(&self, table: Table) -> Result<Url, StoreError> {
        Ok(self.inner.rest_url.join(table.as_str())?)
    }
}

/// Append `column=eq.value` for each filter.
fn apply_filters(url: &mut Url, filters: &[Filter]) {
    let mut pairs = url.query_pairs_mut();
    for filter in filters {
        pairs.append_pair(filter.column, &format!("eq.{}", filter.value));
    }
}

/// Encode a select as `PostgREST` query parameters.
fn apply_select(url: &mut Url, query: &Select) {
    url.query_pairs_mut().append_pair("select", query.columns);
    apply_filters(url, &query.filters);

    let mut pairs = url.query_pairs_mut();
    if let Some(order) = query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        pairs.append_pair("order", &format!("{}.{direction}", order.column));
    }
    if let Some(limit) = query.limit {
        pairs.append_pair("limit", &limit.to_string());
    }
}

async fn rejected(response: reqwest::Response) -> StoreError {
    let body = ErrorBody::read(response).await;
    StoreError::Rejected {
        status: body.status,
        code: body.code,
        message: body.message,
    }
}

#[async_trait]
impl DataStore for SupabaseClient {
    #[instrument(skip_all, fields(table = %table))]
    async fn insert(
        &self,
        token: &AccessToken,
        table: Table,
        row: Value,
    ) -> Result<(), StoreError> {
        let response = self
            .http()
            .post(self.table_url(table)?)
            .header(AUTHORIZATION, self.bearer(Some(token)))
            .header("Prefer", PREFER_MINIMAL)
            .json(&row)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(())
    }

    #[instrument(skip_all, fields(table = %query.table))]
    async fn select(&self, token: &AccessToken, query: &Select) -> Result<Vec<Value>, StoreError> {
        let mut url = self.table_url(query.table)?;
        apply_select(&mut url, query);

        let response = self
            .http()
            .get(url)
            .header(AUTHORIZATION, self.bearer(Some(token)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        response.json().await.map_err(|e| StoreError::Decode {
            table: query.table,
            message: e.to_string(),
        })
    }

    #[instrument(skip_all, fields(table = %table))]
    async fn update(
        &self,
        token: &AccessToken,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<(), StoreError> {
        let mut url = self.table_url(table)?;
        apply_filters(&mut url, filters);

        let response = self
            .http()
            .patch(url)
            .header(AUTHORIZATION, self.bearer(Some(token)))
            .header("Prefer", PREFER_MINIMAL)
            .json(&patch)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .http()
            .get(self.inner.rest_url.clone())
            .header(AUTHORIZATION, self.bearer(None))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(())
    }
}
