/// `verify-env`: configuration report
///
/// Checks every variable the services read, then contacts the backend with
/// both keys. Any failed check makes the command exit non-zero.

use menuly_shared::baas::{Baas, BaasConfig, ClientContext, SupabaseClient};
use std::fmt;
use uuid::Uuid;

use super::mask;

/// Variables that must be set
pub const REQUIRED_VARS: [&str; 3] = ["SUPABASE_URL", "SUPABASE_ANON_KEY", "SUPABASE_SERVICE_ROLE_KEY"];

/// Variables that change behavior when set
pub const OPTIONAL_VARS: [&str; 6] = [
    "ADMIN_API_KEY",
    "SENTRY_DSN",
    "API_HOST",
    "API_PORT",
    "CORS_ORIGINS",
    "PRODUCTION",
];

/// Variables whose values are never printed in full
const SECRET_VARS: [&str; 3] = ["SUPABASE_ANON_KEY", "SUPABASE_SERVICE_ROLE_KEY", "ADMIN_API_KEY"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass(String),
    Warn(String),
    Fail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: String,
    pub outcome: Outcome,
}

impl Check {
    fn new(name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }

    pub fn failed(&self) -> bool {
        matches!(self.outcome, Outcome::Fail(_))
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tag, detail) = match &self.outcome {
            Outcome::Pass(detail) => ("ok  ", detail),
            Outcome::Warn(detail) => ("warn", detail),
            Outcome::Fail(detail) => ("FAIL", detail),
        };
        write!(f, "[{}] {:<26} {}", tag, self.name, detail)
    }
}

/// Checks presence of every known variable
pub fn check_variables<F>(lookup: F) -> Vec<Check>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let shown = |name: &str, v: &str| {
        if SECRET_VARS.contains(&name) {
            mask(v)
        } else {
            v.to_string()
        }
    };

    let required = REQUIRED_VARS.iter().map(|&name| match value(name) {
        Some(v) => Check::new(name, Outcome::Pass(shown(name, &v))),
        None => Check::new(name, Outcome::Fail("not set".to_string())),
    });

    let optional = OPTIONAL_VARS.iter().map(|&name| match value(name) {
        Some(v) => Check::new(name, Outcome::Pass(shown(name, &v))),
        None if name == "ADMIN_API_KEY" => Check::new(
            name,
            Outcome::Warn("not set, admin endpoints will reject every request".to_string()),
        ),
        None => Check::new(name, Outcome::Pass("default".to_string())),
    });

    required.chain(optional).collect()
}

/// Contacts the backend with the anon and service-role clients
pub async fn check_backend(browser: &dyn Baas, server: Option<&dyn Baas>) -> Vec<Check> {
    let mut checks = Vec::new();

    checks.push(match browser.health().await {
        Ok(()) => Check::new("backend health", Outcome::Pass("reachable".to_string())),
        Err(e) => Check::new("backend health", Outcome::Fail(e.to_string())),
    });

    // Row level security may hide every row; a successful query is what counts
    checks.push(match browser.list_qr_codes(Uuid::nil()).await {
        Ok(_) => Check::new("anon key access", Outcome::Pass("query accepted".to_string())),
        Err(e) => Check::new("anon key access", Outcome::Fail(e.to_string())),
    });

    checks.push(match server {
        Some(server) => match server.list_users(1, 1).await {
            Ok(_) => Check::new("service role access", Outcome::Pass("admin API accepted".to_string())),
            Err(e) => Check::new("service role access", Outcome::Fail(e.to_string())),
        },
        None => Check::new("service role access", Outcome::Fail("no service-role key".to_string())),
    });

    checks
}

/// Runs every check against the process environment
pub async fn run() -> Vec<Check> {
    let mut checks = check_variables(|name| std::env::var(name).ok());

    let config = match BaasConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            checks.push(Check::new("backend config", Outcome::Fail(e.to_string())));
            return checks;
        }
    };

    let browser = match SupabaseClient::for_context(&config, ClientContext::Browser) {
        Ok(client) => client,
        Err(e) => {
            checks.push(Check::new("backend client", Outcome::Fail(e.to_string())));
            return checks;
        }
    };
    let server = SupabaseClient::for_context(&config, ClientContext::Server).ok();

    checks.extend(check_backend(&browser, server.as_ref().map(|s| s as &dyn Baas)).await);
    checks
}
