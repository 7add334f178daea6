//! Post-load form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{CspNonce, CurrentSession, RequestKind, RequireSession};
use crate::services::{FlowError, LoadSubmission};
use crate::state::AppState;

/// Suggestions offered for the free-text commodity field.
pub const COMMODITY_TYPES: &[&str] = &[
    "General Freight",
    "Electronics",
    "Food & Beverage",
    "Building Materials",
    "Machinery",
    "Automotive",
    "Other",
];

/// Post-load form template.
#[derive(Template, WebTemplate)]
#[template(path = "post_load/form.html")]
pub struct PostLoadTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
    pub error: Option<String>,
    pub form: LoadSubmission,
    pub commodity_types: &'static [&'static str],
}

/// Shown after a load is posted; refreshes to the dashboard.
#[derive(Template, WebTemplate)]
#[template(path = "post_load/success.html")]
pub struct PostLoadSuccessTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
}

/// Display the post-load form.
#[instrument(skip_all)]
pub async fn form(nonce: CspNonce, RequireSession(auth): RequireSession) -> PostLoadTemplate {
    PostLoadTemplate {
        nonce: nonce.0,
        user_email: Some(auth.email),
        error: None,
        form: LoadSubmission::default(),
        commodity_types: COMMODITY_TYPES,
    }
}

/// Post a load.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    nonce: CspNonce,
    session: CurrentSession,
    kind: RequestKind,
    Form(form): Form<LoadSubmission>,
) -> Response {
    let result = match state.marketplace() {
        Ok(marketplace) => marketplace.post_load(session.token(), &form).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            add_breadcrumb(
                "loads",
                "Posted load",
                Some(&[("commodity_type", form.commodity_type.as_str())]),
            );
            PostLoadSuccessTemplate {
                nonce: nonce.0,
                user_email: session.email(),
            }
            .into_response()
        }
        Err(FlowError::Unauthenticated) => kind.unauthenticated().into_response(),
        Err(e) => PostLoadTemplate {
            nonce: nonce.0,
            user_email: session.email(),
            error: Some(e.to_string()),
            form,
            commodity_types: COMMODITY_TYPES,
        }
        .into_response(),
    }
}
