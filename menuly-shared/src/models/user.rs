/// Backend auth users
///
/// `AuthUser` mirrors the user object returned by `GET /auth/v1/user` and the
/// admin user endpoints. `NewAuthUser` is the admin-create payload; the
/// profile row for the new user is created by a database trigger that reads
/// `user_metadata`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::profile::ProfileRole;

/// Auth user as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,

    #[serde(default)]
    pub email: Option<String>,

    /// Backend auth role (usually `authenticated`)
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub user_metadata: JsonValue,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// Application role recorded in `user_metadata.role`
    pub fn app_role(&self) -> Option<ProfileRole> {
        self.user_metadata
            .get("role")
            .and_then(|v| v.as_str())
            .and_then(ProfileRole::parse)
    }
}

/// Admin-create payload for `POST /auth/v1/admin/users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuthUser {
    pub email: String,

    pub password: String,

    /// Skip the confirmation email
    pub email_confirm: bool,

    pub user_metadata: JsonValue,
}

impl NewAuthUser {
    /// Builds a confirmed user with the application metadata the profile
    /// trigger expects
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        full_name: impl Into<String>,
        role: ProfileRole,
        owner_id: Option<Uuid>,
    ) -> Self {
        let mut metadata = serde_json::json!({
            "full_name": full_name.into(),
            "role": role.as_str(),
        });
        if let Some(owner_id) = owner_id {
            metadata["owner_id"] = serde_json::json!(owner_id);
        }

        Self {
            email: email.into(),
            password: password.into(),
            email_confirm: true,
            user_metadata: metadata,
        }
    }
}
