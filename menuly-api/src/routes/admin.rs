/// Operational user management
///
/// Mounted under `/api/admin` behind [`admin_key_layer`]; a request only
/// reaches these handlers with a valid `?key=`.
///
/// # Endpoints
///
/// - `GET /api/admin/users?key=&page=&per_page=` - List auth users
/// - `POST /api/admin/users?key=` - Create a confirmed auth user
///
/// [`admin_key_layer`]: crate::middleware::admin_key::admin_key_layer

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use chrono::{DateTime, Utc};
use menuly_shared::models::{AuthUser, NewAuthUser, ProfileRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Largest accepted `per_page`
pub const MAX_PER_PAGE: u32 = 100;

const DEFAULT_PER_PAGE: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<ProfileRole>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub confirmed: bool,
}

impl From<AuthUser> for AdminUser {
    fn from(user: AuthUser) -> Self {
        Self {
            role: user.app_role(),
            confirmed: user.email_confirmed_at.is_some(),
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            last_sign_in_at: user.last_sign_in_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<AdminUser>,
    pub page: u32,
    pub per_page: u32,
}

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,

    /// Defaults to `owner`
    #[serde(default)]
    pub role: Option<ProfileRole>,

    /// Required for staff
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

/// List auth users
///
/// # Errors
///
/// - `400 Bad Request`: `page` is 0 or `per_page` outside 1-100
/// - `401 Unauthorized`: Missing or wrong admin key
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> ApiResult<Json<ListUsersResponse>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);

    let mut errors = Vec::new();
    if page == 0 {
        errors.push(ValidationErrorDetail {
            field: "page".to_string(),
            message: "Page starts at 1".to_string(),
        });
    }
    if per_page == 0 || per_page > MAX_PER_PAGE {
        errors.push(ValidationErrorDetail {
            field: "per_page".to_string(),
            message: format!("per_page must be 1-{}", MAX_PER_PAGE),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::ValidationError(errors));
    }

    let users = state.baas.list_users(page, per_page).await?;

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(AdminUser::from).collect(),
        page,
        per_page,
    }))
}

/// Create auth user
///
/// # Errors
///
/// - `400 Bad Request`: Invalid fields, or a staff user without `owner_id`
/// - `401 Unauthorized`: Missing or wrong admin key
/// - Backend errors are passed through
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<Json<AdminUser>> {
    let Json(req) = payload?;
    req.validate()?;

    let role = req.role.unwrap_or(ProfileRole::Owner);
    if role == ProfileRole::Staff && req.owner_id.is_none() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "owner_id".to_string(),
            message: "Staff users need an owner".to_string(),
        }]));
    }

    let user = state
        .baas
        .create_user(NewAuthUser::new(
            req.email,
            req.password,
            req.full_name.trim(),
            role,
            req.owner_id,
        ))
        .await?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "User created via admin API");

    Ok(Json(AdminUser::from(user)))
}
