/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory backend seeded with:
/// - an owner with one staff member (the caller, signed in as `OWNER_TOKEN`)
/// - a second owner with their own staff member
/// - a staff member signed in as `STAFF_TOKEN`

use axum::body::Body;
use axum::http::{Request, Response};
use menuly_api::app::{build_router, AppState};
use menuly_api::config::Config;
use menuly_shared::baas::MockBaas;
use menuly_shared::models::ProfileRole;
use std::sync::Arc;
use tower::Service as _;
use uuid::Uuid;

pub const OWNER_TOKEN: &str = "owner-access-token";
pub const STAFF_TOKEN: &str = "staff-access-token";
pub const ADMIN_KEY: &str = "test-admin-key";

/// Test context containing all necessary resources
pub struct TestContext {
    pub baas: Arc<MockBaas>,
    pub app: axum::Router,
    pub owner_id: Uuid,
    pub staff_id: Uuid,
    pub other_owner_id: Uuid,
    pub other_staff_id: Uuid,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_admin_key(Some(ADMIN_KEY)).await
    }

    /// Creates a context whose `ADMIN_API_KEY` is `admin_key`
    pub async fn with_admin_key(admin_key: Option<&str>) -> Self {
        let owner_id = Uuid::new_v4();
        let staff_id = Uuid::new_v4();
        let other_owner_id = Uuid::new_v4();
        let other_staff_id = Uuid::new_v4();

        let baas = MockBaas::new()
            .with_session(OWNER_TOKEN, MockBaas::auth_user(owner_id, "owner@bistro.example"))
            .with_session(STAFF_TOKEN, MockBaas::auth_user(staff_id, "staff@bistro.example"))
            .with_profile(MockBaas::profile(owner_id, ProfileRole::Owner, None))
            .with_profile(MockBaas::profile(staff_id, ProfileRole::Staff, Some(owner_id)))
            .with_profile(MockBaas::profile(other_owner_id, ProfileRole::Owner, None))
            .with_profile(MockBaas::profile(other_staff_id, ProfileRole::Staff, Some(other_owner_id)));
        let baas = Arc::new(baas);

        let state = AppState::new(baas.clone(), test_config(admin_key));

        Self {
            baas,
            app: build_router(state),
            owner_id,
            staff_id,
            other_owner_id,
            other_staff_id,
        }
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }
}

/// Configuration pointing at a backend that is never contacted
pub fn test_config(admin_key: Option<&str>) -> Config {
    let admin_key = admin_key.map(str::to_string);
    Config::from_lookup(move |name| match name {
        "SUPABASE_URL" => Some("https://test.supabase.co".to_string()),
        "SUPABASE_ANON_KEY" => Some("anon".to_string()),
        "SUPABASE_SERVICE_ROLE_KEY" => Some("service".to_string()),
        "ADMIN_API_KEY" => admin_key.clone(),
        _ => None,
    })
    .unwrap()
}

/// Request builder with an optional bearer token
pub fn request(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("authorization", format!("Bearer {}", token)),
        None => builder,
    }
}

/// JSON request with an optional bearer token
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    request(method, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
