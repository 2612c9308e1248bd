/// Session endpoint
///
/// ```text
/// GET /api/session
/// Authorization: Bearer <access_token>   (or the sb-* session cookie)
/// ```
///
/// Returns the caller's id, email, role and expiry; 401 when signed out.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::HeaderMap, Json};
use menuly_shared::auth::session::Session;

pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Session>> {
    let session = state.require_session(&headers).await?;
    Ok(Json(session))
}
