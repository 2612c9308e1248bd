/// Admin key middleware
///
/// Guards `/api/admin/*`. The request must carry `?key=<ADMIN_API_KEY>`;
/// anything else (missing, wrong, malformed query, secret not configured)
/// is rejected with 401 before the handler runs, so no backend call is made.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use menuly_shared::auth::admin_key::verify_admin_key;
use std::collections::HashMap;

use crate::{app::AppState, error::ApiError};

/// Query parameter carrying the admin key
pub const ADMIN_KEY_PARAM: &str = "key";

pub async fn admin_key_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = Query::<HashMap<String, String>>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(mut params)| params.remove(ADMIN_KEY_PARAM));

    let configured = state.config.admin.api_key.as_deref();
    if configured.is_none() {
        tracing::warn!("Admin request rejected: ADMIN_API_KEY is not configured");
    }

    if !verify_admin_key(provided.as_deref(), configured) {
        tracing::warn!(path = %req.uri().path(), "Admin request with invalid key");
        return Err(ApiError::Unauthorized("Invalid admin key".to_string()));
    }

    Ok(next.run(req).await)
}
