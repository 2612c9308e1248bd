/// Staff management endpoints
///
/// Staff accounts belong to the owner recorded in their profile's
/// `owner_id`. Every handler resolves the caller, performs one
/// authorization lookup, then forwards a single call to the backend.
///
/// # Endpoints
///
/// - `GET /api/staff` - List the caller's staff
/// - `POST /api/staff` - Create a staff account
/// - `DELETE /api/staff/:id` - Delete a staff profile

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use menuly_shared::{
    auth::authorization::{require_owned_staff, require_role},
    models::{NewAuthUser, Profile, ProfileRole},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create staff request
///
/// Missing fields deserialize as empty and fail validation, so every
/// problem is reported in one 400 response.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStaffRequest {
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct ListStaffResponse {
    pub staff: Vec<Profile>,
}

#[derive(Debug, Serialize)]
pub struct CreateStaffResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: ProfileRole,
    pub owner_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DeleteStaffResponse {
    pub deleted: bool,
    pub id: Uuid,
}

/// List staff
///
/// # Errors
///
/// - `401 Unauthorized`: No session
pub async fn list_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ListStaffResponse>> {
    let session = state.require_session(&headers).await?;
    let staff = state.baas.list_staff(session.user_id).await?;

    Ok(Json(ListStaffResponse { staff }))
}

/// Create staff account
///
/// # Endpoint
///
/// ```text
/// POST /api/staff
/// Content-Type: application/json
///
/// {
///   "email": "sam@bistro.example",
///   "password": "at-least-8",
///   "full_name": "Sam Carter"
/// }
/// ```
///
/// The account is created confirmed, with metadata
/// `{ full_name, role: "staff", owner_id: <caller> }`; the backend's
/// profile trigger turns that into the staff row.
///
/// # Errors
///
/// - `400 Bad Request`: Missing or invalid fields (checked before the backend is contacted)
/// - `401 Unauthorized`: No session
/// - `403 Forbidden`: Caller is not an owner or admin
/// - Backend errors are passed through (e.g. `422` for a duplicate email)
pub async fn create_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateStaffRequest>, JsonRejection>,
) -> ApiResult<Json<CreateStaffResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let session = state.require_session(&headers).await?;
    require_role(state.baas.as_ref(), &session, ProfileRole::Owner).await?;

    let full_name = req.full_name.trim().to_string();
    let user = state
        .baas
        .create_user(NewAuthUser::new(
            req.email.clone(),
            req.password,
            full_name.clone(),
            ProfileRole::Staff,
            Some(session.user_id),
        ))
        .await?;

    tracing::info!(staff_id = %user.id, owner_id = %session.user_id, "Staff account created");

    Ok(Json(CreateStaffResponse {
        id: user.id,
        email: user.email.unwrap_or(req.email),
        full_name,
        role: ProfileRole::Staff,
        owner_id: session.user_id,
    }))
}

/// Delete staff profile
///
/// # Errors
///
/// - `401 Unauthorized`: No session
/// - `400 Bad Request`: `id` is not a UUID
/// - `403 Forbidden`: No such staff row, or it belongs to another owner
pub async fn delete_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteStaffResponse>> {
    let session = state.require_session(&headers).await?;

    let staff_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid staff id: {}", id)))?;

    let staff = require_owned_staff(state.baas.as_ref(), &session, staff_id).await?;
    state.baas.delete_profile(staff.id).await?;

    tracing::info!(staff_id = %staff.id, owner_id = %session.user_id, "Staff profile deleted");

    Ok(Json(DeleteStaffResponse {
        deleted: true,
        id: staff.id,
    }))
}
