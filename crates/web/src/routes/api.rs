//! JSON API.
//!
//! Each endpoint runs one flow and answers with an [`ActionOutcome`]. The
//! status code mirrors the outcome: `401` without a verified caller, `400`
//! for validation, `502` when the remote service failed and `503` when no
//! Supabase project is configured.
//!
//! A body that is not JSON, or does not fit the endpoint, is a validation
//! failure like any other and gets the same envelope.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::flow_status;
use crate::middleware::CurrentSession;
use crate::services::{
    ActionOutcome, BidSubmission, FlowError, LoadSubmission, Marketplace, VettingSubmission,
};
use crate::state::AppState;

fn outcome(result: Result<Option<String>, FlowError>) -> Response {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => flow_status(e),
    };
    (status, Json(ActionOutcome::from(result))).into_response()
}

fn malformed_body(rejection: &JsonRejection) -> FlowError {
    tracing::debug!(error = %rejection.body_text(), "rejected API body");

    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        JsonRejection::JsonDataError(_) => "Request body has missing or mistyped fields",
        _ => "Request body could not be read",
    };
    FlowError::validation(message)
}

/// Resolve the marketplace and the body, in flow order.
///
/// Configuration is checked first, then the session token, then the body.
fn accept<'a, T>(
    state: &'a AppState,
    session: &CurrentSession,
    body: Result<Json<T>, JsonRejection>,
) -> Result<(&'a Marketplace, T), FlowError> {
    let marketplace = state.marketplace()?;
    if session.0.is_none() {
        return Err(FlowError::Unauthenticated);
    }
    let Json(body) = body.map_err(|rejection| malformed_body(&rejection))?;
    Ok((marketplace, body))
}

/// `POST /api/loads`
#[instrument(skip_all)]
pub async fn post_load(
    State(state): State<AppState>,
    session: CurrentSession,
    body: Result<Json<LoadSubmission>, JsonRejection>,
) -> Response {
    let result = match accept(&state, &session, body) {
        Ok((marketplace, body)) => marketplace.post_load(session.token(), &body).await,
        Err(e) => Err(e),
    };
    outcome(result.map(|()| None))
}

/// `POST /api/bids`
#[instrument(skip_all)]
pub async fn submit_bid(
    State(state): State<AppState>,
    session: CurrentSession,
    body: Result<Json<BidSubmission>, JsonRejection>,
) -> Response {
    let result = match accept(&state, &session, body) {
        Ok((marketplace, body)) => marketplace.submit_bid(session.token(), &body).await,
        Err(e) => Err(e),
    };
    outcome(result.map(Some))
}

/// `POST /api/vetting`
#[instrument(skip_all)]
pub async fn submit_vetting(
    State(state): State<AppState>,
    session: CurrentSession,
    body: Result<Json<VettingSubmission>, JsonRejection>,
) -> Response {
    let result = match accept(&state, &session, body) {
        Ok((marketplace, body)) => marketplace.submit_vetting(session.token(), &body).await,
        Err(e) => Err(e),
    };
    outcome(result.map(|()| None))
}
