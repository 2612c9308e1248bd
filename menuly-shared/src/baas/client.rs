/// Supabase HTTP client
///
/// One handle per execution context:
///
/// - [`ClientContext::Browser`]: authenticates with the anon key; row level
///   security applies. Used wherever code acts on behalf of a visitor.
/// - [`ClientContext::Server`]: authenticates with the service-role key and
///   may call the admin user endpoints. Handlers authorize callers
///   themselves before using it.
///
/// # Wire Format
///
/// ```text
/// GET    /auth/v1/health
/// GET    /auth/v1/user                      (Authorization: Bearer <user token>)
/// GET    /auth/v1/admin/users?page=&per_page=
/// POST   /auth/v1/admin/users
/// GET    /rest/v1/profiles?id=eq.<id>&select=*
/// DELETE /rest/v1/profiles?id=eq.<id>
/// GET    /rest/v1/qr_codes?owner_id=eq.<id>&order=created_at.desc
/// ```
///
/// Every request carries the `apikey` header.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use uuid::Uuid;

use super::{Baas, BaasConfig, BaasError, BaasResult};
use crate::models::{AuthUser, NewAuthUser, Profile, QrCode};

/// Where a client handle runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientContext {
    /// Visitor-facing, anon key
    Browser,

    /// Trusted server code, service-role key
    Server,
}

/// Supabase client handle
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    context: ClientContext,
}

/// Admin user listing envelope
#[derive(Debug, Deserialize)]
struct UserList {
    #[serde(default)]
    users: Vec<AuthUser>,
}

impl SupabaseClient {
    /// Builds the client for an execution context
    ///
    /// # Errors
    ///
    /// Returns `BaasError::Config` if the context's key is not configured or
    /// the HTTP client cannot be constructed.
    pub fn for_context(config: &BaasConfig, context: ClientContext) -> BaasResult<Self> {
        let api_key = config.key_for(context)?.to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BaasError::Config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(url = %config.url, ?context, "Backend client created");

        Ok(Self {
            http,
            base_url: config.url.clone(),
            api_key,
            context,
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Request authenticated as this client
    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.request_as(method, url, &self.api_key)
    }

    /// Request carrying the project key plus an explicit bearer token
    fn request_as(&self, method: Method, url: String, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    fn require_server(&self, operation: &str) -> BaasResult<()> {
        if self.context != ClientContext::Server {
            return Err(BaasError::Config(format!(
                "{} requires the service-role client",
                operation
            )));
        }
        Ok(())
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> BaasResult<T> {
        let response = check_status(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(builder: RequestBuilder) -> BaasResult<()> {
        check_status(builder.send().await?).await?;
        Ok(())
    }
}

/// Turns a non-success response into `BaasError::Api`
async fn check_status(response: Response) -> BaasResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    tracing::debug!(status = status.as_u16(), %message, "Backend request rejected");

    Err(BaasError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Extracts a human-readable message from a GoTrue or PostgREST error body
pub(crate) fn parse_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    ["message", "msg", "error_description", "error"]
        .iter()
        .filter_map(|field| value.get(*field))
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// PostgREST equality filter value
fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl Baas for SupabaseClient {
    fn context(&self) -> ClientContext {
        self.context
    }

    async fn health(&self) -> BaasResult<()> {
        Self::send_empty(self.request(Method::GET, self.auth_url("health"))).await
    }

    async fn get_user(&self, access_token: &str) -> BaasResult<AuthUser> {
        Self::send_json(self.request_as(Method::GET, self.auth_url("user"), access_token)).await
    }

    async fn get_profile(&self, id: Uuid) -> BaasResult<Option<Profile>> {
        let rows: Vec<Profile> = Self::send_json(
            self.request(Method::GET, self.rest_url("profiles"))
                .query(&[("id", eq(id)), ("select", "*".to_string())]),
        )
        .await?;

        Ok(rows.into_iter().next())
    }

    async fn list_staff(&self, owner_id: Uuid) -> BaasResult<Vec<Profile>> {
        Self::send_json(self.request(Method::GET, self.rest_url("profiles")).query(&[
            ("owner_id", eq(owner_id)),
            ("role", eq("staff")),
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ]))
        .await
    }

    async fn delete_profile(&self, id: Uuid) -> BaasResult<()> {
        Self::send_empty(
            self.request(Method::DELETE, self.rest_url("profiles"))
                .header("Prefer", "return=minimal")
                .query(&[("id", eq(id))]),
        )
        .await
    }

    async fn create_user(&self, user: NewAuthUser) -> BaasResult<AuthUser> {
        self.require_server("Creating users")?;
        Self::send_json(
            self.request(Method::POST, self.auth_url("admin/users"))
                .json(&user),
        )
        .await
    }

    async fn list_users(&self, page: u32, per_page: u32) -> BaasResult<Vec<AuthUser>> {
        self.require_server("Listing users")?;
        let list: UserList = Self::send_json(
            self.request(Method::GET, self.auth_url("admin/users"))
                .query(&[("page", page), ("per_page", per_page)]),
        )
        .await?;

        Ok(list.users)
    }

    async fn list_qr_codes(&self, owner_id: Uuid) -> BaasResult<Vec<QrCode>> {
        Self::send_json(self.request(Method::GET, self.rest_url("qr_codes")).query(&[
            ("owner_id", eq(owner_id)),
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ]))
        .await
    }
}
