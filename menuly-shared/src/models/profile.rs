/// Profile model
///
/// One row per auth user, keyed by the user id. Staff rows point at the owner
/// that created them through `owner_id`; owners and admins have no parent.
///
/// # Schema (external)
///
/// ```sql
/// CREATE TYPE profile_role AS ENUM ('admin', 'owner', 'staff');
///
/// CREATE TABLE profiles (
///     id UUID PRIMARY KEY REFERENCES auth.users(id) ON DELETE CASCADE,
///     email TEXT,
///     full_name TEXT,
///     role profile_role NOT NULL DEFAULT 'owner',
///     owner_id UUID REFERENCES profiles(id) ON DELETE CASCADE,
///     restaurant_id UUID,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role stored on a profile row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileRole {
    /// Platform operator
    Admin,

    /// Restaurant owner, manages menus and staff
    Owner,

    /// Staff member created by an owner
    Staff,
}

impl ProfileRole {
    /// Converts role to string for display and metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileRole::Admin => "admin",
            ProfileRole::Owner => "owner",
            ProfileRole::Staff => "staff",
        }
    }

    /// Parses a role name, case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(ProfileRole::Admin),
            "owner" => Some(ProfileRole::Owner),
            "staff" => Some(ProfileRole::Staff),
            _ => None,
        }
    }

    /// Checks if this role has the permission level of the required role
    ///
    /// Hierarchy: Admin > Owner > Staff
    pub fn has_permission(&self, required: &ProfileRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    /// Can create and remove staff members
    pub fn can_manage_staff(&self) -> bool {
        self.has_permission(&ProfileRole::Owner)
    }

    fn permission_level(&self) -> u8 {
        match self {
            ProfileRole::Admin => 3,
            ProfileRole::Owner => 2,
            ProfileRole::Staff => 1,
        }
    }
}

/// Profile row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Auth user id
    pub id: Uuid,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub full_name: Option<String>,

    pub role: ProfileRole,

    /// Owning profile (staff only)
    #[serde(default)]
    pub owner_id: Option<Uuid>,

    #[serde(default)]
    pub restaurant_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Returns true if `user_id` is the owner this row belongs to
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Returns true if this row is a staff member
    pub fn is_staff(&self) -> bool {
        self.role == ProfileRole::Staff
    }
}
