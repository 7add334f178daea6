//! JSON API: every flow answers with `{ success, message?, error? }`.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;

use hitchyard_integration_tests::TestApp;
use hitchyard_web::db::Table;

#[tokio::test]
async fn test_api_requires_session() {
    let app = TestApp::new();

    for path in ["/api/loads", "/api/bids", "/api/vetting"] {
        let response = app.post_json(path, &json!({}), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(
            response.json(),
            json!({ "success": false, "error": "User not authenticated" })
        );
    }
    assert!(app.backend.store.calls().is_empty());
}

#[tokio::test]
async fn test_api_without_configuration() {
    let app = TestApp::unconfigured();
    let response = app
        .post_json("/api/loads", &json!({ "origin_zip": "90210" }), None)
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json(),
        json!({ "success": false, "error": "Supabase configuration is missing" })
    );
}

#[tokio::test]
async fn test_api_post_load_and_bid() {
    let app = TestApp::new();
    let (_, shipper) = app.login("shipper@example.com").await;
    let (_, carrier) = app.login("carrier@example.com").await;

    let response = app
        .post_json(
            "/api/loads",
            &json!({
                "origin_zip": "90210",
                "destination_zip": "10001",
                "load_weight": 5000,
                "commodity_type": "Electronics"
            }),
            Some(&shipper),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "success": true }));

    let load_id = app.backend.store.rows(Table::Loads)[0]["id"].clone();
    let response = app
        .post_json(
            "/api/bids",
            &json!({ "load_id": load_id, "bid_amount": 250.5 }),
            Some(&carrier),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({
            "success": true,
            "message": "Your bid of $250.50 has been submitted successfully."
        })
    );
}

#[tokio::test]
async fn test_api_validation_errors() {
    let app = TestApp::new();
    let (_, cookie) = app.login("carrier@example.com").await;

    let response = app
        .post_json(
            "/api/bids",
            &json!({ "load_id": "not-a-uuid", "bid_amount": 100 }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid load ID");

    let response = app
        .post_json(
            "/api/vetting",
            &json!({ "company_name": "Acme", "dot_number": "", "legal_entity_type": "LLC" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "DOT number is required");
}

#[tokio::test]
async fn test_api_surfaces_store_message() {
    let app = TestApp::new();
    let (_, cookie) = app.login("carrier@example.com").await;
    app.backend.store.fail(
        hitchyard_web::test_support::StoreOp::Update,
        Table::UserProfiles,
        "profile update blocked",
    );

    let response = app
        .post_json(
            "/api/vetting",
            &json!({
                "company_name": "Acme Freight",
                "dot_number": "1234567",
                "legal_entity_type": "LLC"
            }),
            Some(&cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.json()["error"], "profile update blocked");
    // The vetting row is not rolled back
    assert_eq!(app.backend.store.rows(Table::VettingRequests).len(), 1);
}

#[tokio::test]
async fn test_api_malformed_body_gets_outcome() {
    let app = TestApp::new();
    let (_, cookie) = app.login("carrier@example.com").await;

    let response = app
        .post_json(
            "/api/bids",
            &json!({ "load_id": "x", "bid_amount": true }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "success": false, "error": "Request body has missing or mistyped fields" })
    );

    let request = Request::post("/api/loads")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from("{\"origin_zip\": "))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Request body is not valid JSON");

    let request = Request::post("/api/vetting")
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::COOKIE, &cookie)
        .body(Body::from("company_name=Acme"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "success": false, "error": "Expected a JSON request body" })
    );

    assert!(app.backend.store.calls().is_empty());
}

#[tokio::test]
async fn test_api_malformed_body_without_session_is_unauthorized() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/bids", &json!({ "bid_amount": true }), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "User not authenticated");
}
