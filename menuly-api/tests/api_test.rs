/// Integration tests for the Menuly API
///
/// These drive the full router (middleware included) against the in-memory
/// backend and assert both the HTTP outcome and which backend calls were
/// made.

mod common;

use axum::body::Body;
use axum::http::StatusCode;
use common::{body_json, json_request, request, TestContext, ADMIN_KEY, OWNER_TOKEN, STAFF_TOKEN};
use menuly_shared::baas::{BaasCall, MockFailure};
use menuly_shared::models::{ProfileRole, QrCode, QrDesign};
use serde_json::json;

fn staff_payload(email: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "kitchen-2024",
        "full_name": "Sam Carter"
    })
}

// Health

#[tokio::test]
async fn test_health_reports_backend_status() {
    let ctx = TestContext::new().await;

    let response = ctx.send(request("GET", "/health", None).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["backend"], "connected");

    ctx.baas.set_failure(Some(MockFailure::Offline)).await;
    let response = ctx.send(request("GET", "/health", None).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "degraded");
}

// Session

#[tokio::test]
async fn test_session_requires_credentials() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("GET", "/api/session", None).body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "unauthorized");

    // No credentials means no backend lookup
    assert!(ctx.baas.calls().await.is_empty());
}

#[tokio::test]
async fn test_session_from_bearer_token() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("GET", "/api/session", Some(OWNER_TOKEN)).body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["user_id"], ctx.owner_id.to_string());
    assert_eq!(json["email"], "owner@bistro.example");
    assert!(json.get("access_token").is_none());
}

#[tokio::test]
async fn test_session_from_cookie() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(
            request("GET", "/api/session", None)
                .header("cookie", format!("theme=dark; sb-access-token={}", OWNER_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_token_is_401() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("GET", "/api/session", Some("forged")).body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// Staff deletion

#[tokio::test]
async fn test_delete_staff_without_session_is_401() {
    let ctx = TestContext::new().await;

    let uri = format!("/api/staff/{}", ctx.staff_id);
    let response = ctx.send(request("DELETE", &uri, None).body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(ctx.baas.write_calls().await.is_empty());
    assert!(ctx.baas.stored_profile(ctx.staff_id).await.is_some());
}

#[tokio::test]
async fn test_delete_other_owners_staff_is_403_without_delete() {
    let ctx = TestContext::new().await;

    let uri = format!("/api/staff/{}", ctx.other_staff_id);
    let response = ctx
        .send(request("DELETE", &uri, Some(OWNER_TOKEN)).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(ctx.baas.write_calls().await.is_empty());
    assert!(ctx.baas.stored_profile(ctx.other_staff_id).await.is_some());
}

#[tokio::test]
async fn test_delete_missing_staff_is_403() {
    let ctx = TestContext::new().await;

    let uri = format!("/api/staff/{}", uuid::Uuid::new_v4());
    let response = ctx
        .send(request("DELETE", &uri, Some(OWNER_TOKEN)).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(ctx.baas.write_calls().await.is_empty());
}

#[tokio::test]
async fn test_delete_owner_row_is_403() {
    let ctx = TestContext::new().await;

    // An owner profile is never deletable through the staff endpoint
    let uri = format!("/api/staff/{}", ctx.owner_id);
    let response = ctx
        .send(request("DELETE", &uri, Some(OWNER_TOKEN)).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_invalid_id() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("DELETE", "/api/staff/not-a-uuid", Some(OWNER_TOKEN)).body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Authentication is checked first
    let response = ctx
        .send(request("DELETE", "/api/staff/not-a-uuid", None).body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_own_staff() {
    let ctx = TestContext::new().await;

    let uri = format!("/api/staff/{}", ctx.staff_id);
    let response = ctx
        .send(request("DELETE", &uri, Some(OWNER_TOKEN)).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["deleted"], true);

    assert_eq!(
        ctx.baas.calls().await,
        vec![
            BaasCall::GetUser,
            BaasCall::GetProfile(ctx.staff_id),
            BaasCall::DeleteProfile(ctx.staff_id),
        ]
    );
    assert!(ctx.baas.stored_profile(ctx.staff_id).await.is_none());
}

#[tokio::test]
async fn test_delete_upstream_failure_is_reported() {
    let ctx = TestContext::new().await;
    ctx.baas
        .set_failure(Some(MockFailure::Api {
            status: 503,
            message: "database is restarting".to_string(),
        }))
        .await;

    let uri = format!("/api/staff/{}", ctx.staff_id);
    let response = ctx
        .send(request("DELETE", &uri, Some(OWNER_TOKEN)).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["message"], "database is restarting");
}

// Staff creation

#[tokio::test]
async fn test_create_staff_missing_fields_is_400_before_backend() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(json_request("POST", "/api/staff", Some(OWNER_TOKEN), json!({ "email": "sam@bistro.example" })))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "validation_error");
    let fields: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["full_name", "password"]);

    assert!(ctx.baas.calls().await.is_empty());
}

#[tokio::test]
async fn test_create_staff_malformed_body_is_400() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(
            request("POST", "/api/staff", Some(OWNER_TOKEN))
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(ctx.baas.calls().await.is_empty());
}

#[tokio::test]
async fn test_create_staff_without_session_is_401() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(json_request("POST", "/api/staff", None, staff_payload("sam@bistro.example")))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(ctx.baas.write_calls().await.is_empty());
}

#[tokio::test]
async fn test_create_staff_as_staff_is_403() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(json_request("POST", "/api/staff", Some(STAFF_TOKEN), staff_payload("sam@bistro.example")))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(ctx.baas.write_calls().await.is_empty());
}

#[tokio::test]
async fn test_create_staff_as_owner() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(json_request("POST", "/api/staff", Some(OWNER_TOKEN), staff_payload("sam@bistro.example")))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["role"], "staff");
    assert_eq!(json["owner_id"], ctx.owner_id.to_string());

    let new_id: uuid::Uuid = json["id"].as_str().unwrap().parse().unwrap();
    let profile = ctx.baas.stored_profile(new_id).await.unwrap();
    assert_eq!(profile.role, ProfileRole::Staff);
    assert!(profile.is_owned_by(ctx.owner_id));
    assert_eq!(profile.full_name.as_deref(), Some("Sam Carter"));
}

#[tokio::test]
async fn test_create_staff_duplicate_email_passes_through() {
    let ctx = TestContext::new().await;

    // Already registered by the fixture
    let response = ctx
        .send(json_request("POST", "/api/staff", Some(OWNER_TOKEN), staff_payload("staff@bistro.example")))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"], "upstream_error");
    assert!(json["message"].as_str().unwrap().contains("already been registered"));
}

// Listings

#[tokio::test]
async fn test_list_staff_only_returns_own() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("GET", "/api/staff", Some(OWNER_TOKEN)).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let staff = json["staff"].as_array().unwrap();
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0]["id"], ctx.staff_id.to_string());
}

#[tokio::test]
async fn test_list_qr_codes() {
    let ctx = TestContext::new().await;
    let now = chrono::Utc::now();
    let code = |owner_id, name: &str| QrCode {
        id: uuid::Uuid::new_v4(),
        menu_id: uuid::Uuid::new_v4(),
        owner_id,
        name: Some(name.to_string()),
        design: QrDesign::default(),
        views: 3,
        created_at: now,
        updated_at: now,
    };
    ctx.baas.insert_qr_code(code(ctx.owner_id, "Table 1")).await;
    ctx.baas.insert_qr_code(code(ctx.other_owner_id, "Elsewhere")).await;

    let response = ctx
        .send(request("GET", "/api/qr-codes", Some(OWNER_TOKEN)).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let codes = json["qr_codes"].as_array().unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0]["name"], "Table 1");
    assert_eq!(codes[0]["design"]["error_correction"], "M");
}

#[tokio::test]
async fn test_backend_outage_is_500() {
    let ctx = TestContext::new().await;
    ctx.baas.set_failure(Some(MockFailure::Offline)).await;

    let response = ctx
        .send(request("GET", "/api/staff", Some(OWNER_TOKEN)).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// Admin

#[tokio::test]
async fn test_admin_wrong_key_is_401_without_backend_call() {
    let ctx = TestContext::new().await;

    for uri in [
        "/api/admin/users",
        "/api/admin/users?key=",
        "/api/admin/users?key=wrong",
        "/api/admin/users?key=test-admin-key-but-longer",
    ] {
        let response = ctx.send(request("GET", uri, None).body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let response = ctx
        .send(json_request(
            "POST",
            "/api/admin/users?key=wrong",
            None,
            staff_payload("x@bistro.example"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(ctx.baas.calls().await.is_empty());
}

#[tokio::test]
async fn test_admin_disabled_without_configured_key() {
    let ctx = TestContext::with_admin_key(None).await;

    let response = ctx
        .send(request("GET", "/api/admin/users?key=", None).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(ctx.baas.calls().await.is_empty());
}

#[tokio::test]
async fn test_admin_list_users() {
    let ctx = TestContext::new().await;

    let uri = format!("/api/admin/users?key={}&page=1&per_page=10", ADMIN_KEY);
    let response = ctx.send(request("GET", &uri, None).body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["users"].as_array().unwrap().len(), 2);
    assert_eq!(json["per_page"], 10);
    assert_eq!(
        ctx.baas.calls().await,
        vec![BaasCall::ListUsers { page: 1, per_page: 10 }]
    );
}

#[tokio::test]
async fn test_admin_list_users_page_size_limit() {
    let ctx = TestContext::new().await;

    let uri = format!("/api/admin/users?key={}&per_page=101", ADMIN_KEY);
    let response = ctx.send(request("GET", &uri, None).body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(ctx.baas.calls().await.is_empty());
}

#[tokio::test]
async fn test_admin_create_user() {
    let ctx = TestContext::new().await;

    let uri = format!("/api/admin/users?key={}", ADMIN_KEY);
    let response = ctx
        .send(json_request(
            "POST",
            &uri,
            None,
            json!({
                "email": "new-owner@bistro.example",
                "password": "Welcome-2024",
                "full_name": "New Owner"
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["role"], "owner");
    assert_eq!(json["confirmed"], true);
}

#[tokio::test]
async fn test_admin_create_staff_needs_owner() {
    let ctx = TestContext::new().await;

    let uri = format!("/api/admin/users?key={}", ADMIN_KEY);
    let response = ctx
        .send(json_request(
            "POST",
            &uri,
            None,
            json!({
                "email": "orphan@bistro.example",
                "password": "Welcome-2024",
                "full_name": "Orphan",
                "role": "staff"
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(ctx.baas.write_calls().await.is_empty());
}

// Middleware

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("GET", "/api/session", None).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    assert_eq!(response.headers().get("cache-control").unwrap(), "no-store");
    assert!(response.headers().get("strict-transport-security").is_none());
}
