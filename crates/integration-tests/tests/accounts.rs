//! Signup, login, session refresh and logout through the browser forms.

use std::time::Duration;

use axum::http::StatusCode;
use hitchyard_integration_tests::{TEST_PASSWORD, TestApp};
use hitchyard_web::db::Table;

const ELECTRONICS_LOAD: &str =
    "origin_zip=90210&destination_zip=10001&load_weight=5000&commodity_type=Electronics";

#[tokio::test]
async fn test_signup_sends_verification_email() {
    let app = TestApp::new();
    let response = app
        .post_form(
            "/signup",
            "email=Shipper%40Example.com&password=secret1&zip_code=90210",
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Verification Email Sent"));
    assert!(response.body.contains("shipper@example.com"));

    let sign_ups = app.backend.identity.sign_ups();
    assert_eq!(sign_ups.len(), 1);
    assert_eq!(sign_ups[0].email, "shipper@example.com");
    assert_eq!(sign_ups[0].zip_code, "90210");
}

#[tokio::test]
async fn test_signup_validation_keeps_input() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/signup",
            "email=carrier%40example.com&password=short&zip_code=90210",
            None,
        )
        .await;
    assert!(response.body.contains("Password must be at least 6 characters"));
    assert!(response.body.contains("value=\"carrier@example.com\""));

    let response = app
        .post_form(
            "/signup",
            "email=carrier%40example.com&password=secret1&zip_code=9021",
            None,
        )
        .await;
    assert!(response.body.contains("ZIP code must be 5 digits"));

    assert!(app.backend.identity.sign_ups().is_empty());
}

#[tokio::test]
async fn test_signup_surfaces_provider_error() {
    let app = TestApp::new();
    app.backend.identity.fail_sign_up("Signups not allowed for this instance");

    let response = app
        .post_form(
            "/signup",
            "email=carrier%40example.com&password=secret1&zip_code=10001",
            None,
        )
        .await;
    assert!(response.body.contains("Signups not allowed for this instance"));
}

#[tokio::test]
async fn test_signup_without_configuration() {
    let app = TestApp::unconfigured();
    let response = app
        .post_form(
            "/signup",
            "email=carrier%40example.com&password=secret1&zip_code=10001",
            None,
        )
        .await;

    assert!(response.body.contains("Supabase configuration is missing"));
}

#[tokio::test]
async fn test_login_sets_session_and_dashboard_greets() {
    let app = TestApp::new();
    let (_, cookie) = app.login("dispatch@example.com").await;

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Welcome, User"));
    assert!(response.body.contains("dispatch@example.com"));
    assert!(response.body.contains("hx-get=\"/dashboard/loads\""));
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = TestApp::new();
    app.backend.identity.register("dispatch@example.com", TEST_PASSWORD);

    let response = app
        .post_form(
            "/login",
            "email=dispatch%40example.com&password=wrong-password",
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid login credentials"));
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::new();
    let (_, cookie) = app.login("dispatch@example.com").await;

    let response = app.post_form("/logout", "", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/"));

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.header("location"), Some("/signup"));
}

#[tokio::test]
async fn test_revoked_token_is_unauthenticated() {
    let app = TestApp::new();
    let (_, cookie) = app.login("dispatch@example.com").await;

    // The cookie is still there but the provider no longer knows the token
    app.backend.identity.fail_lookups("upstream timeout");

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/signup"));
}

#[tokio::test]
async fn test_expired_token_is_refreshed_before_submission() {
    let app = TestApp::new();
    app.backend.identity.set_token_lifetime(Duration::ZERO);
    let (shipper, cookie) = app.login("shipper@example.com").await;
    app.backend
        .identity
        .set_token_lifetime(Duration::from_secs(3600));

    let response = app
        .post_form("/post-load", ELECTRONICS_LOAD, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert!(response.body.contains("Load posted"));
    assert_eq!(app.backend.identity.refresh_count(), 1);

    let rows = app.backend.store.rows(Table::Loads);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user_id"], shipper.to_string());

    // The renewed token is kept in the session
    let response = app.get("/post-load", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.backend.identity.refresh_count(), 1);
}

#[tokio::test]
async fn test_refused_refresh_redirects_before_the_form() {
    let app = TestApp::new();
    app.backend.identity.set_token_lifetime(Duration::ZERO);
    let (_, cookie) = app.login("carrier@example.com").await;
    app.backend
        .identity
        .fail_refresh("Invalid Refresh Token: Already Used");

    let response = app.get("/vetting", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/signup"));

    let response = app
        .post_form("/post-load", ELECTRONICS_LOAD, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/signup"));
    assert!(app.backend.store.calls().is_empty());
}
