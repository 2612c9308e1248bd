/// Backend-as-a-service layer
///
/// Every record Menuly touches lives in a hosted backend (Supabase: GoTrue
/// auth + PostgREST). This module defines the contract the rest of the
/// workspace programs against and provides two implementations:
///
/// - [`SupabaseClient`]: the real HTTP client, one handle per execution context
/// - [`MockBaas`]: in-memory backend that records every call, for tests and demos
///
/// # Contract
///
/// All operations are single requests. Nothing here retries, batches or
/// caches; a failed call is returned to the caller as-is so handlers can
/// report it verbatim.
///
/// # Example
///
/// ```no_run
/// use menuly_shared::baas::{Baas, BaasConfig, ClientContext, SupabaseClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BaasConfig::from_env()?;
/// let client = SupabaseClient::for_context(&config, ClientContext::Server)?;
/// client.health().await?;
/// # Ok(())
/// # }
/// ```

pub mod client;
pub mod config;
pub mod mock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{AuthUser, NewAuthUser, Profile, QrCode};

pub use client::{ClientContext, SupabaseClient};
pub use config::BaasConfig;
pub use mock::{BaasCall, MockBaas, MockFailure};

/// Backend error types
#[derive(Debug, thiserror::Error)]
pub enum BaasError {
    /// Missing or invalid configuration (URL, keys)
    #[error("Backend configuration error: {0}")]
    Config(String),

    /// Network failure, timeout, TLS error
    #[error("Backend request failed: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

impl BaasError {
    /// HTTP status reported by the backend, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            BaasError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend rejected the caller's credentials
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<reqwest::Error> for BaasError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BaasError::Decode(err.to_string())
        } else {
            BaasError::Transport(err.to_string())
        }
    }
}

/// Backend result type alias
pub type BaasResult<T> = Result<T, BaasError>;

/// Operations the application performs against the backend
#[async_trait]
pub trait Baas: Send + Sync {
    /// Execution context this handle was built for
    fn context(&self) -> ClientContext;

    /// Checks the backend is reachable
    async fn health(&self) -> BaasResult<()>;

    /// Looks up the auth user owning `access_token`
    ///
    /// An invalid or expired token is reported as `BaasError::Api` with
    /// status 401 or 403.
    async fn get_user(&self, access_token: &str) -> BaasResult<AuthUser>;

    /// Fetches one profile row
    async fn get_profile(&self, id: Uuid) -> BaasResult<Option<Profile>>;

    /// Lists staff rows created by `owner_id`, newest first
    async fn list_staff(&self, owner_id: Uuid) -> BaasResult<Vec<Profile>>;

    /// Deletes one profile row
    async fn delete_profile(&self, id: Uuid) -> BaasResult<()>;

    /// Creates a confirmed auth user (service role only)
    async fn create_user(&self, user: NewAuthUser) -> BaasResult<AuthUser>;

    /// Lists auth users, 1-based pages (service role only)
    async fn list_users(&self, page: u32, per_page: u32) -> BaasResult<Vec<AuthUser>>;

    /// Lists QR codes owned by `owner_id`, newest first
    async fn list_qr_codes(&self, owner_id: Uuid) -> BaasResult<Vec<QrCode>>;
}
