//! Landing page.

use askama::Template;
use askama_web::WebTemplate;
use tracing::instrument;

use crate::filters;
use crate::middleware::{CspNonce, CurrentSession};

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
}

/// Display the landing page.
#[instrument(skip_all)]
pub async fn home(nonce: CspNonce, session: CurrentSession) -> HomeTemplate {
    HomeTemplate {
        nonce: nonce.0,
        user_email: session.email(),
    }
}
