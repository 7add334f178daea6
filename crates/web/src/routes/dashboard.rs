//! Dashboard page and the caller's loads fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{CspNonce, CurrentSession, RequestKind};
use crate::models::Load;
use crate::services::FlowError;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
    pub name: String,
    pub is_vetting_pending: bool,
}

/// The caller's loads (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/loads_fragment.html")]
pub struct MyLoadsTemplate {
    pub loads: Vec<Load>,
    pub error: Option<String>,
}

/// Display the dashboard.
///
/// The load list is fetched separately by `GET /dashboard/loads`.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    nonce: CspNonce,
    session: CurrentSession,
) -> Result<DashboardTemplate> {
    let dashboard = state.marketplace()?.dashboard(session.token()).await?;

    Ok(DashboardTemplate {
        nonce: nonce.0,
        user_email: dashboard.email.clone().or_else(|| session.email()),
        name: dashboard.display_name().to_string(),
        is_vetting_pending: dashboard.profile.is_vetting_pending,
    })
}

/// Render the caller's loads, newest first.
#[instrument(skip_all)]
pub async fn my_loads(
    State(state): State<AppState>,
    session: CurrentSession,
    kind: RequestKind,
) -> Response {
    let result = match state.marketplace() {
        Ok(marketplace) => marketplace.my_loads(session.token()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(loads) => MyLoadsTemplate { loads, error: None }.into_response(),
        Err(FlowError::Unauthenticated) => kind.unauthenticated().into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to list own loads");
            MyLoadsTemplate {
                loads: Vec::new(),
                error: Some(e.to_string()),
            }
            .into_response()
        }
    }
}
