//! Load, bid and vetting flows through the browser forms and HTMX fragments.

use axum::http::StatusCode;
use serde_json::json;

use hitchyard_integration_tests::TestApp;
use hitchyard_web::db::Table;
use hitchyard_web::test_support::{StoreCall, StoreOp};

const ELECTRONICS_LOAD: &str =
    "origin_zip=90210&destination_zip=10001&load_weight=5000&commodity_type=Electronics";

fn open_load_id(app: &TestApp) -> String {
    let rows = app.backend.store.rows(Table::Loads);
    rows[0]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_post_load_creates_one_posted_row() {
    let app = TestApp::new();
    let (shipper, cookie) = app.login("shipper@example.com").await;

    let response = app
        .post_form("/post-load", ELECTRONICS_LOAD, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Load posted"));
    assert!(response.body.contains("2;url=/dashboard"));

    let rows = app.backend.store.rows(Table::Loads);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user_id"], shipper.to_string());
    assert_eq!(rows[0]["origin_zip"], "90210");
    assert_eq!(rows[0]["destination_zip"], "10001");
    assert_eq!(rows[0]["commodity_type"], "Electronics");
    assert_eq!(rows[0]["status"], "posted");
}

#[tokio::test]
async fn test_post_load_without_session_inserts_nothing() {
    let app = TestApp::new();
    let response = app.post_form("/post-load", ELECTRONICS_LOAD, None).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/signup"));
    assert!(app.backend.store.calls().is_empty());
}

#[tokio::test]
async fn test_post_load_validation_rerenders_form() {
    let app = TestApp::new();
    let (_, cookie) = app.login("shipper@example.com").await;

    let response = app
        .post_form(
            "/post-load",
            "origin_zip=90210&destination_zip=10001&load_weight=0&commodity_type=Electronics",
            Some(&cookie),
        )
        .await;

    assert!(response.body.contains("Load weight must be greater than zero"));
    assert!(response.body.contains("value=\"90210\""));
    assert!(app.backend.store.rows(Table::Loads).is_empty());
}

#[tokio::test]
async fn test_commodity_is_free_text() {
    let app = TestApp::new();
    let (_, cookie) = app.login("shipper@example.com").await;

    let form = app.get("/post-load", Some(&cookie)).await;
    assert!(form.body.contains("name=\"commodity_type\" list=\"commodity-suggestions\""));
    assert!(form.body.contains("<option value=\"Electronics\">"));
    assert!(!form.body.contains("<select"));

    let rejected = app
        .post_form(
            "/post-load",
            "origin_zip=90210&destination_zip=1000&load_weight=800&commodity_type=Frozen+Seafood",
            Some(&cookie),
        )
        .await;
    assert!(rejected.body.contains("value=\"Frozen Seafood\""));

    let response = app
        .post_form(
            "/post-load",
            "origin_zip=90210&destination_zip=10001&load_weight=800&commodity_type=Frozen+Seafood",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        app.backend.store.rows(Table::Loads)[0]["commodity_type"],
        "Frozen Seafood"
    );
}

#[tokio::test]
async fn test_dashboard_lists_own_loads_or_empty_state() {
    let app = TestApp::new();
    let (_, cookie) = app.login("shipper@example.com").await;

    let empty = app.get_fragment("/dashboard/loads", Some(&cookie)).await;
    assert!(empty.body.contains("You haven't posted any loads yet"));
    assert!(!empty.body.contains("<table"));

    app.post_form("/post-load", ELECTRONICS_LOAD, Some(&cookie))
        .await;

    let listed = app.get_fragment("/dashboard/loads", Some(&cookie)).await;
    assert!(listed.body.contains("<table"));
    assert!(listed.body.contains("90210"));
    assert!(listed.body.contains("5000 lbs"));
    assert!(listed.body.contains("Electronics"));
}

#[tokio::test]
async fn test_dashboard_fragment_shows_store_error() {
    let app = TestApp::new();
    let (_, cookie) = app.login("shipper@example.com").await;
    app.backend
        .store
        .fail(StoreOp::Select, Table::Loads, "permission denied for table loads");

    let response = app.get_fragment("/dashboard/loads", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("permission denied for table loads"));
}

#[tokio::test]
async fn test_dashboard_uses_profile() {
    let app = TestApp::new();
    let (user, cookie) = app.login("carrier@example.com").await;
    app.backend.store.seed(
        Table::UserProfiles,
        json!({ "user_id": user.to_string(), "first_name": "Dana", "is_vetting_pending": true }),
    );

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert!(response.body.contains("Welcome, Dana"));
    assert!(response.body.contains("Vetting pending review"));
    assert!(!response.body.contains("href=\"/vetting\""));
}

#[tokio::test]
async fn test_bid_on_open_load() {
    let app = TestApp::new();
    let (_, shipper) = app.login("shipper@example.com").await;
    let (carrier_id, carrier) = app.login("carrier@example.com").await;

    app.post_form("/post-load", ELECTRONICS_LOAD, Some(&shipper))
        .await;
    let load_id = open_load_id(&app);

    let table = app.get_fragment("/loads/table", Some(&carrier)).await;
    assert!(table.body.contains("Bid on Load"));
    assert!(table.body.contains(&format!("hx-post=\"/loads/{load_id}/bids\"")));

    let request = axum::http::Request::post(format!("/loads/{load_id}/bids"))
        .header("content-type", "application/x-www-form-urlencoded")
        .header("hx-request", "true")
        .header("cookie", &carrier)
        .body(axum::body::Body::from("bid_amount=250.5"))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .body
            .contains("Your bid of $250.50 has been submitted successfully.")
    );
    assert_eq!(response.header("hx-trigger"), Some("bidSubmitted"));

    let bids = app.backend.store.rows(Table::Bids);
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0]["load_id"], load_id);
    assert_eq!(bids[0]["carrier_id"], carrier_id.to_string());
}

#[tokio::test]
async fn test_non_positive_bid_makes_no_remote_call() {
    let app = TestApp::new();
    let (_, carrier) = app.login("carrier@example.com").await;
    let load_id = "0b5f1c7e-9a51-4c1a-8d55-0a3d6f9f6e01";
    let lookups_before = app.backend.identity.lookup_count();

    for amount in ["0", "-25", ""] {
        let response = app
            .post_form(
                &format!("/loads/{load_id}/bids"),
                &format!("bid_amount={amount}"),
                Some(&carrier),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Bid amount must be greater than zero"));
    }

    assert_eq!(app.backend.identity.lookup_count(), lookups_before);
    assert!(app.backend.store.calls().is_empty());
}

#[tokio::test]
async fn test_empty_open_loads_state() {
    let app = TestApp::new();
    let (_, carrier) = app.login("carrier@example.com").await;

    let response = app.get_fragment("/loads/table", Some(&carrier)).await;
    assert!(response.body.contains("No loads are open for bidding right now"));
}

#[tokio::test]
async fn test_vetting_submission() {
    let app = TestApp::new();
    let (user, cookie) = app.login("carrier@example.com").await;
    app.backend.store.seed(
        Table::UserProfiles,
        json!({ "user_id": user.to_string(), "first_name": null, "is_vetting_pending": false }),
    );

    let response = app
        .post_form(
            "/vetting",
            "company_name=Acme+Freight&dot_number=1234567&legal_entity_type=LLC",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Application received"));

    let requests = app.backend.store.rows(Table::VettingRequests);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["company_name"], "Acme Freight");

    let profiles = app.backend.store.rows(Table::UserProfiles);
    assert_eq!(profiles[0]["is_vetting_pending"], true);

    let sent = app.backend.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, user);
    assert_eq!(sent[0].dot_number, "1234567");
}

#[tokio::test]
async fn test_vetting_succeeds_when_webhook_fails() {
    let app = TestApp::new();
    let (_, cookie) = app.login("carrier@example.com").await;
    app.backend.notifier.fail_with("bad gateway");

    let response = app
        .post_form(
            "/vetting",
            "company_name=Acme+Freight&dot_number=1234567&legal_entity_type=LLC",
            Some(&cookie),
        )
        .await;

    assert!(response.body.contains("Application received"));
    assert_eq!(app.backend.store.rows(Table::VettingRequests).len(), 1);
}

#[tokio::test]
async fn test_vetting_insert_failure_skips_update() {
    let app = TestApp::new();
    let (_, cookie) = app.login("carrier@example.com").await;
    app.backend.store.fail(
        StoreOp::Insert,
        Table::VettingRequests,
        "duplicate key value violates unique constraint",
    );

    let response = app
        .post_form(
            "/vetting",
            "company_name=Acme+Freight&dot_number=1234567&legal_entity_type=LLC",
            Some(&cookie),
        )
        .await;

    assert!(
        response
            .body
            .contains("duplicate key value violates unique constraint")
    );
    assert!(!app.backend.store.calls().contains(&StoreCall {
        op: StoreOp::Update,
        table: Table::UserProfiles,
    }));
    assert!(app.backend.notifier.sent().is_empty());
}
