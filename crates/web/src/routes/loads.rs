//! Bidding surface: open loads and bid submission.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{CspNonce, CurrentSession, RequestKind, RequireSession};
use crate::models::Load;
use crate::services::{BidSubmission, FlowError};
use crate::state::AppState;

/// HTMX event fired on the bid form after an accepted bid.
pub const BID_SUBMITTED_EVENT: &str = "bidSubmitted";

/// Loads page shell; the table loads lazily.
#[derive(Template, WebTemplate)]
#[template(path = "loads/index.html")]
pub struct LoadsTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
}

/// Open loads table (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "loads/table.html")]
pub struct LoadsTableTemplate {
    pub loads: Vec<Load>,
    pub error: Option<String>,
}

/// Toast shown after a bid (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "loads/bid_result.html")]
pub struct BidResultTemplate {
    pub success: bool,
    pub message: String,
}

/// Bid form body; the load comes from the path.
#[derive(Debug, Default, Deserialize)]
pub struct BidForm {
    #[serde(default)]
    pub bid_amount: String,
}

/// Display the bidding surface.
#[instrument(skip_all)]
pub async fn index(nonce: CspNonce, RequireSession(auth): RequireSession) -> LoadsTemplate {
    LoadsTemplate {
        nonce: nonce.0,
        user_email: Some(auth.email),
    }
}

/// Render every open load.
#[instrument(skip_all)]
pub async fn table(
    State(state): State<AppState>,
    session: CurrentSession,
    kind: RequestKind,
) -> Response {
    let result = match state.marketplace() {
        Ok(marketplace) => marketplace.open_loads(session.token()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(loads) => LoadsTableTemplate { loads, error: None }.into_response(),
        Err(FlowError::Unauthenticated) => kind.unauthenticated().into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to list open loads");
            LoadsTableTemplate {
                loads: Vec::new(),
                error: Some(e.to_string()),
            }
            .into_response()
        }
    }
}

/// Submit a bid on a load and answer with a toast.
///
/// Failures are still `200` so HTMX swaps the toast in.
#[instrument(skip_all, fields(load_id = %load_id))]
pub async fn bid(
    State(state): State<AppState>,
    session: CurrentSession,
    kind: RequestKind,
    Path(load_id): Path<String>,
    Form(form): Form<BidForm>,
) -> Response {
    let submission = BidSubmission {
        load_id,
        bid_amount: form.bid_amount,
    };

    let result = match state.marketplace() {
        Ok(marketplace) => marketplace.submit_bid(session.token(), &submission).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(message) => {
            add_breadcrumb(
                "bids",
                "Submitted bid",
                Some(&[("load_id", submission.load_id.as_str())]),
            );
            let mut response = BidResultTemplate {
                success: true,
                message,
            }
            .into_response();
            response
                .headers_mut()
                .insert("hx-trigger", HeaderValue::from_static(BID_SUBMITTED_EVENT));
            response
        }
        Err(FlowError::Unauthenticated) => kind.unauthenticated().into_response(),
        Err(e) => BidResultTemplate {
            success: false,
            message: e.to_string(),
        }
        .into_response(),
    }
}
