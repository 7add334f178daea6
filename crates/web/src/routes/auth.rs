//! Signup, login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{CspNonce, CurrentSession, clear_auth, set_auth};
use crate::services::{SignInForm, SignUpForm};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
    pub error: Option<String>,
    pub email: String,
    pub zip_code: String,
}

/// "Verification Email Sent" page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup_success.html")]
pub struct SignupSuccessTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
    pub email: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nonce: String,
    pub user_email: Option<String>,
    pub error: Option<String>,
    pub email: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the signup form.
#[instrument(skip_all)]
pub async fn signup_page(nonce: CspNonce, session: CurrentSession) -> SignupTemplate {
    SignupTemplate {
        nonce: nonce.0,
        user_email: session.email(),
        error: None,
        email: String::new(),
        zip_code: String::new(),
    }
}

/// Create an account; the identity provider emails a verification link.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    nonce: CspNonce,
    Form(form): Form<SignUpForm>,
) -> Response {
    let result = match state.marketplace() {
        Ok(marketplace) => marketplace.sign_up(&form).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(email) => SignupSuccessTemplate {
            nonce: nonce.0,
            user_email: None,
            email: email.into_inner(),
        }
        .into_response(),
        Err(e) => SignupTemplate {
            nonce: nonce.0,
            user_email: None,
            error: Some(e.to_string()),
            email: form.email,
            zip_code: form.zip_code,
        }
        .into_response(),
    }
}

/// Display the login form.
#[instrument(skip_all)]
pub async fn login_page(nonce: CspNonce, session: CurrentSession) -> LoginTemplate {
    LoginTemplate {
        nonce: nonce.0,
        user_email: session.email(),
        error: None,
        email: String::new(),
    }
}

/// Sign in with email and password and keep the access token in the session.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    Form(form): Form<SignInForm>,
) -> Result<Response> {
    let result = match state.marketplace() {
        Ok(marketplace) => marketplace.sign_in(&form).await,
        Err(e) => Err(e),
    };

    let auth = match result {
        Ok(auth) => auth,
        Err(e) => {
            return Ok(LoginTemplate {
                nonce: nonce.0,
                user_email: None,
                error: Some(e.to_string()),
                email: form.email,
            }
            .into_response());
        }
    };

    let email = auth
        .identity
        .email
        .clone()
        .unwrap_or_else(|| form.email.trim().to_string());
    let user_id = auth.identity.id;

    set_auth(&session, &auth.into_stored(email.clone())).await?;
    set_sentry_user(&user_id, Some(&email));

    Ok(Redirect::to("/dashboard").into_response())
}

/// Revoke the token (best effort) and clear the session.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    current: CurrentSession,
) -> Result<Redirect> {
    if let Ok(marketplace) = state.marketplace() {
        marketplace.sign_out(current.token()).await;
    }

    clear_auth(&session).await?;
    clear_sentry_user();

    Ok(Redirect::to("/"))
}
