/// Backend configuration
///
/// # Environment Variables
///
/// - `SUPABASE_URL`: Project URL (required, `NEXT_PUBLIC_SUPABASE_URL` accepted)
/// - `SUPABASE_ANON_KEY`: Public anon key (required, `NEXT_PUBLIC_SUPABASE_ANON_KEY` accepted)
/// - `SUPABASE_SERVICE_ROLE_KEY`: Service-role key (required for server context)
/// - `SUPABASE_TIMEOUT_SECS`: Request timeout (default: 10)
///
/// # Example
///
/// ```no_run
/// use menuly_shared::baas::BaasConfig;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BaasConfig::from_env()?;
/// println!("Backend: {}", config.url);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

use super::{BaasError, ClientContext};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaasConfig {
    /// Project URL without trailing slash
    pub url: String,

    /// Public anon key
    pub anon_key: String,

    /// Service-role key, bypasses row level security
    ///
    /// IMPORTANT: never ship this to a browser.
    #[serde(skip_serializing)]
    pub service_role_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BaasConfig {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `BaasError::Config` if the URL or anon key is missing, or the
    /// URL is not http(s).
    pub fn from_env() -> Result<Self, BaasError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BaasError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |names: &[&str]| {
            names
                .iter()
                .filter_map(|&name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let url = get(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]).ok_or_else(|| {
            BaasError::Config("SUPABASE_URL environment variable is required".to_string())
        })?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(BaasError::Config(format!(
                "SUPABASE_URL must be an http(s) URL, got {}",
                url
            )));
        }

        let anon_key = get(&["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]).ok_or_else(|| {
            BaasError::Config("SUPABASE_ANON_KEY environment variable is required".to_string())
        })?;

        let service_role_key = get(&["SUPABASE_SERVICE_ROLE_KEY"]);

        let timeout_secs = match get(&["SUPABASE_TIMEOUT_SECS"]) {
            Some(value) => value.parse::<u64>().map_err(|_| {
                BaasError::Config(format!("SUPABASE_TIMEOUT_SECS must be a number, got {}", value))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            service_role_key,
            timeout_secs,
        })
    }

    /// Returns the key a client in `context` authenticates with
    ///
    /// # Errors
    ///
    /// Server context requires the service-role key.
    pub fn key_for(&self, context: ClientContext) -> Result<&str, BaasError> {
        match context {
            ClientContext::Browser => Ok(&self.anon_key),
            ClientContext::Server => self.service_role_key.as_deref().ok_or_else(|| {
                BaasError::Config(
                    "SUPABASE_SERVICE_ROLE_KEY is required for server-side clients".to_string(),
                )
            }),
        }
    }
}
