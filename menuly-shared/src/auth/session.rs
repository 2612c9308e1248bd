/// Session resolution
///
/// A session is the backend's proof that a request comes from a signed-in
/// user. Menuly never mints sessions; it only finds the caller's credentials
/// and asks the backend who they belong to.
///
/// # Credential Sources
///
/// Server context ([`SessionCredentials::from_headers`]), first match wins:
///
/// 1. `Authorization: Bearer <access token>`
/// 2. `sb-access-token` cookie
/// 3. `sb-<project ref>-auth-token` cookie holding the session JSON
///    (`{"access_token": ..., "expires_at": <unix seconds>, ...}`), raw or
///    `base64-` prefixed or percent-encoded. Large sessions are split into
///    `sb-<ref>-auth-token.0`, `.1`, ... and joined back in index order. The
///    legacy array form `["<access>", "<refresh>", ...]` is also accepted.
///
/// Client context: a stored access token ([`SessionCredentials::from_access_token`]).
///
/// # Resolution Outcomes
///
/// | Situation | Result | Backend called |
/// |---|---|---|
/// | No credentials | `Ok(None)` | no |
/// | Known expiry in the past | `Ok(None)` | no |
/// | Backend rejects token (401/403) | `Ok(None)` | yes |
/// | Backend unreachable / other error | `Err(BaasError)` | yes |
/// | Token accepted | `Ok(Some(Session))` | yes |

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::baas::{Baas, BaasResult};
use crate::models::{AuthUser, ProfileRole};

/// Cookie carrying a bare access token
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Prefix marking a base64-encoded session cookie
const BASE64_PREFIX: &str = "base64-";

/// Credentials presented by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    /// Backend access token (JWT)
    pub access_token: String,

    /// Expiry, when the credential source carries one
    pub expires_at: Option<DateTime<Utc>>,
}

/// Session JSON stored in `sb-<ref>-auth-token`
#[derive(Debug, Deserialize)]
struct StoredSessionCookie {
    access_token: String,

    #[serde(default)]
    expires_at: Option<i64>,
}

impl SessionCredentials {
    /// Credentials from a stored access token (client context)
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            expires_at: None,
        }
    }

    /// Sets a known expiry
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Extracts credentials from request headers (server context)
    ///
    /// Returns `None` when the request carries no usable credentials.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        if let Some(token) = bearer_token(headers) {
            return Some(Self::from_access_token(token));
        }

        let cookies = cookie_pairs(headers);

        if let Some((_, token)) = cookies
            .iter()
            .find(|(name, value)| name == ACCESS_TOKEN_COOKIE && !value.is_empty())
        {
            return Some(Self::from_access_token(token.clone()));
        }

        session_cookie_values(&cookies)
            .iter()
            .find_map(|value| parse_session_cookie(value))
    }

    /// True if the credentials carry an expiry at or before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn cookie_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn is_session_cookie(name: &str) -> bool {
    name.starts_with("sb-") && name.ends_with("-auth-token")
}

/// Session cookie values, whole cookies first, then reassembled chunks
///
/// Chunks are joined from `.0` upwards and stop at the first missing index.
fn session_cookie_values(cookies: &[(String, String)]) -> Vec<String> {
    let mut values: Vec<String> = cookies
        .iter()
        .filter(|(name, _)| is_session_cookie(name))
        .map(|(_, value)| value.clone())
        .collect();

    let mut chunked: BTreeMap<&str, BTreeMap<usize, &str>> = BTreeMap::new();
    for (name, value) in cookies {
        let Some((base, index)) = name.rsplit_once('.') else {
            continue;
        };
        if let (true, Ok(index)) = (is_session_cookie(base), index.parse::<usize>()) {
            chunked.entry(base).or_default().entry(index).or_insert(value.as_str());
        }
    }

    for chunks in chunked.values() {
        let joined: String = (0..)
            .map_while(|index| chunks.get(&index).copied())
            .collect();
        if !joined.is_empty() {
            values.push(joined);
        }
    }

    values
}

/// Parses the value of an `sb-<ref>-auth-token` cookie
pub(crate) fn parse_session_cookie(value: &str) -> Option<SessionCredentials> {
    let json = match value.strip_prefix(BASE64_PREFIX) {
        Some(encoded) => {
            let bytes = general_purpose::URL_SAFE_NO_PAD
                .decode(encoded.trim_end_matches('='))
                .or_else(|_| general_purpose::STANDARD.decode(encoded))
                .ok()?;
            String::from_utf8(bytes).ok()?
        }
        None => percent_decode_str(value).decode_utf8().ok()?.into_owned(),
    };

    let parsed: serde_json::Value = serde_json::from_str(&json).ok()?;

    match parsed {
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|v| v.as_str())
            .filter(|token| !token.is_empty())
            .map(SessionCredentials::from_access_token),
        serde_json::Value::Object(_) => {
            let stored: StoredSessionCookie = serde_json::from_value(parsed).ok()?;
            if stored.access_token.is_empty() {
                return None;
            }

            let credentials = SessionCredentials::from_access_token(stored.access_token);
            match stored.expires_at.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
                Some(expires_at) => Some(credentials.with_expiry(expires_at)),
                None => Some(credentials),
            }
        }
        _ => None,
    }
}

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: Uuid,

    pub email: Option<String>,

    /// Application role from the user's metadata, if recorded
    pub role: Option<ProfileRole>,

    pub expires_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    pub access_token: String,
}

impl Session {
    fn new(user: &AuthUser, credentials: &SessionCredentials) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.app_role(),
            expires_at: credentials.expires_at,
            access_token: credentials.access_token.clone(),
        }
    }
}

/// Resolves credentials to a session through the backend
#[derive(Clone)]
pub struct SessionResolver {
    baas: Arc<dyn Baas>,
}

impl SessionResolver {
    /// Creates a resolver backed by `baas`
    pub fn new(baas: Arc<dyn Baas>) -> Self {
        Self { baas }
    }

    /// Resolves credentials to the current session
    ///
    /// # Errors
    ///
    /// Only for backend failures other than a token rejection. A missing,
    /// expired or rejected credential is `Ok(None)`.
    pub async fn resolve(
        &self,
        credentials: Option<&SessionCredentials>,
    ) -> BaasResult<Option<Session>> {
        let Some(credentials) = credentials else {
            tracing::trace!("No session credentials presented");
            return Ok(None);
        };

        if credentials.is_expired_at(Utc::now()) {
            tracing::debug!(expires_at = ?credentials.expires_at, "Session expired");
            return Ok(None);
        }

        match self.baas.get_user(&credentials.access_token).await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "Session resolved");
                Ok(Some(Session::new(&user, credentials)))
            }
            Err(e) if e.is_auth_rejection() => {
                tracing::debug!(error = %e, "Session rejected by backend");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed");
                Err(e)
            }
        }
    }

    /// Resolves the session carried by request headers
    pub async fn resolve_headers(&self, headers: &HeaderMap) -> BaasResult<Option<Session>> {
        let credentials = SessionCredentials::from_headers(headers);
        self.resolve(credentials.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baas::{BaasCall, BaasError, MockBaas, MockFailure};
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_header_wins() {
        let h = headers(&[
            (header::AUTHORIZATION, "Bearer header-token"),
            (header::COOKIE, "sb-access-token=cookie-token"),
        ]);

        let creds = SessionCredentials::from_headers(&h).unwrap();
        assert_eq!(creds.access_token, "header-token");
    }

    #[test]
    fn test_access_token_cookie() {
        let h = headers(&[(header::COOKIE, "theme=dark; sb-access-token=abc.def.ghi")]);

        let creds = SessionCredentials::from_headers(&h).unwrap();
        assert_eq!(creds.access_token, "abc.def.ghi");
        assert!(creds.expires_at.is_none());
    }

    #[test]
    fn test_session_json_cookie() {
        let json = r#"{"access_token":"jwt-1","refresh_token":"r","expires_at":1900000000}"#;
        let cookie = format!("sb-abcd-auth-token={}", json);
        let h = headers(&[(header::COOKIE, cookie.as_str())]);

        let creds = SessionCredentials::from_headers(&h).unwrap();
        assert_eq!(creds.access_token, "jwt-1");
        assert_eq!(creds.expires_at.unwrap().timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_base64_session_cookie() {
        let json = r#"{"access_token":"jwt-2","expires_at":1900000000}"#;
        let encoded = general_purpose::URL_SAFE_NO_PAD.encode(json);
        let value = format!("base64-{}", encoded);

        let creds = parse_session_cookie(&value).unwrap();
        assert_eq!(creds.access_token, "jwt-2");
    }

    #[test]
    fn test_chunked_session_cookie() {
        let json = r#"{"access_token":"jwt-4","expires_at":1900000000,"user":{"id":"u"}}"#;
        let value = format!("base64-{}", general_purpose::URL_SAFE_NO_PAD.encode(json));
        let (first, rest) = value.split_at(20);

        // Chunks may arrive out of order
        let cookie = format!("sb-abcd-auth-token.1={}; theme=dark; sb-abcd-auth-token.0={}", rest, first);
        let h = headers(&[(header::COOKIE, cookie.as_str())]);

        let creds = SessionCredentials::from_headers(&h).unwrap();
        assert_eq!(creds.access_token, "jwt-4");
        assert_eq!(creds.expires_at.unwrap().timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_chunks_stop_at_missing_index() {
        let json = r#"{"access_token":"jwt-5"}"#;
        let (first, rest) = json.split_at(10);
        let cookie = format!("sb-abcd-auth-token.0={}; sb-abcd-auth-token.2={}", first, rest);
        let h = headers(&[(header::COOKIE, cookie.as_str())]);

        assert!(SessionCredentials::from_headers(&h).is_none());
    }

    #[test]
    fn test_percent_encoded_session_cookie() {
        let creds = parse_session_cookie("%7B%22access_token%22%3A%22jwt%22%7D").unwrap();
        assert_eq!(creds.access_token, "jwt");

        let cookie = "sb-abcd-auth-token=%7B%22access_token%22%3A%22jwt-6%22%2C%22expires_at%22%3A1900000000%7D";
        let h = headers(&[(header::COOKIE, cookie)]);
        let creds = SessionCredentials::from_headers(&h).unwrap();
        assert_eq!(creds.access_token, "jwt-6");
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        for value in ["bearer tok", "BEARER tok", "Bearer   tok"] {
            let h = headers(&[(header::AUTHORIZATION, value)]);
            let creds = SessionCredentials::from_headers(&h).unwrap();
            assert_eq!(creds.access_token, "tok", "{}", value);
        }

        let h = headers(&[(header::AUTHORIZATION, "Bearer")]);
        assert!(SessionCredentials::from_headers(&h).is_none());
    }

    #[test]
    fn test_legacy_array_cookie() {
        let creds = parse_session_cookie(r#"["jwt-3","refresh",null,null,null]"#).unwrap();
        assert_eq!(creds.access_token, "jwt-3");
    }

    #[test]
    fn test_garbage_cookies_ignored() {
        assert!(parse_session_cookie("base64-!!!").is_none());
        assert!(parse_session_cookie("not json").is_none());
        assert!(parse_session_cookie(r#"{"access_token":""}"#).is_none());

        let h = headers(&[(header::COOKIE, "sb-access-token=; other=1")]);
        assert!(SessionCredentials::from_headers(&h).is_none());

        let h = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert!(SessionCredentials::from_headers(&h).is_none());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let creds = SessionCredentials::from_access_token("t");
        assert!(!creds.is_expired_at(now));

        let creds = creds.with_expiry(now - Duration::seconds(1));
        assert!(creds.is_expired_at(now));
    }

    #[tokio::test]
    async fn test_no_credentials_skips_backend() {
        let baas = Arc::new(MockBaas::new());
        let resolver = SessionResolver::new(baas.clone());

        let session = resolver.resolve_headers(&HeaderMap::new()).await.unwrap();
        assert!(session.is_none());
        assert!(baas.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_expired_credentials_skip_backend() {
        let user_id = Uuid::new_v4();
        let baas = Arc::new(MockBaas::new().with_session("t", MockBaas::auth_user(user_id, "a@b.co")));
        let resolver = SessionResolver::new(baas.clone());

        let creds = SessionCredentials::from_access_token("t").with_expiry(Utc::now() - Duration::minutes(5));
        assert!(resolver.resolve(Some(&creds)).await.unwrap().is_none());
        assert!(baas.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_valid_token_resolves() {
        let user_id = Uuid::new_v4();
        let baas = Arc::new(MockBaas::new().with_session("t", MockBaas::auth_user(user_id, "a@b.co")));
        let resolver = SessionResolver::new(baas.clone());

        let session = resolver
            .resolve(Some(&SessionCredentials::from_access_token("t")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.email.as_deref(), Some("a@b.co"));
        assert_eq!(baas.calls().await, vec![BaasCall::GetUser]);
    }

    #[tokio::test]
    async fn test_rejected_token_is_no_session() {
        let resolver = SessionResolver::new(Arc::new(MockBaas::new()));

        let session = resolver
            .resolve(Some(&SessionCredentials::from_access_token("forged")))
            .await
            .unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_is_surfaced() {
        let baas = Arc::new(MockBaas::new());
        baas.set_failure(Some(MockFailure::Offline)).await;
        let resolver = SessionResolver::new(baas);

        let err = resolver
            .resolve(Some(&SessionCredentials::from_access_token("t")))
            .await
            .unwrap_err();
        assert!(matches!(err, BaasError::Transport(_)));
    }
}
