/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `SUPABASE_*`: Backend settings, see [`BaasConfig`]
/// - `ADMIN_API_KEY`: Shared secret for `/api/admin/*` (unset disables them)
/// - `SENTRY_DSN`: Error monitoring DSN (carried, not wired)
/// - `RUST_LOG`: Log level
///
/// # Example
///
/// ```no_run
/// use menuly_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use menuly_shared::baas::BaasConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Backend configuration
    pub baas: BaasConfig,

    /// Operational endpoints
    pub admin: AdminConfig,

    /// Error monitoring
    pub monitoring: MonitoringConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins, `*` for any
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS on)
    pub production: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Shared secret for admin endpoints
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub sentry_dsn: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required backend variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = get("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT must be a port number: {}", e))?;

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let production = match get("PRODUCTION").as_deref() {
            None => false,
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            Some(other) => anyhow::bail!("PRODUCTION must be true or false, got {}", other),
        };

        let baas = BaasConfig::from_lookup(&lookup)?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            baas,
            admin: AdminConfig {
                api_key: get("ADMIN_API_KEY"),
            },
            monitoring: MonitoringConfig {
                sentry_dsn: get("SENTRY_DSN"),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
