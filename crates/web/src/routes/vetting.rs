//! Carrier vetting form.

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
use crate::services::{FlowError, VettingSubmission};
use crate::state::AppState;

/// Legal entity choices offered by the form.
pub const LEGAL_ENTITY_TYPES: &[&str] = &[
    "Sole Proprietorship",
    "Partnership",
    "LLC",
    "Corporation",
];

/// Vetting form template.
#[derive(Template, WebTemplate)]
#[template(path = "vetting/form.html")]
pub struct VettingTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
    pub error: Option<String>,
    pub form: VettingSubmission,
    pub legal_entity_types: &'static [&'static str],
}

/// Shown once the vetting request is recorded.
#[derive(Template, WebTemplate)]
#[template(path = "vetting/success.html")]
pub struct VettingSuccessTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
    pub company_name: String,
}

/// Display the vetting form.
#[instrument(skip_all)]
pub async fn form(nonce: CspNonce, RequireSession(auth): RequireSession) -> VettingTemplate {
    VettingTemplate {
        nonce: nonce.0,
        user_email: Some(auth.email),
        error: None,
        form: VettingSubmission::default(),
        legal_entity_types: LEGAL_ENTITY_TYPES,
    }
}

/// Submit a vetting request.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    nonce: CspNonce,
    session: CurrentSession,
    kind: RequestKind,
    Form(form): Form<VettingSubmission>,
) -> Response {
    let result = match state.marketplace() {
        Ok(marketplace) => marketplace.submit_vetting(session.token(), &form).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            add_breadcrumb("vetting", "Submitted vetting request", None);
            VettingSuccessTemplate {
                nonce: nonce.0,
                user_email: session.email(),
                company_name: form.company_name.trim().to_string(),
            }
            .into_response()
        }
        Err(FlowError::Unauthenticated) => kind.unauthenticated().into_response(),
        Err(e) => VettingTemplate {
            nonce: nonce.0,
            user_email: session.email(),
            error: Some(e.to_string()),
            form,
            legal_entity_types: LEGAL_ENTITY_TYPES,
        }
        .into_response(),
    }
}
