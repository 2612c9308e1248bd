/// QR code listing
///
/// ```text
/// GET /api/qr-codes
/// ```
///
/// Lists the caller's QR codes, newest first.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::HeaderMap, Json};
use menuly_shared::models::QrCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ListQrCodesResponse {
    pub qr_codes: Vec<QrCode>,
}

pub async fn list_qr_codes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ListQrCodesResponse>> {
    let session = state.require_session(&headers).await?;
    let qr_codes = state.baas.list_qr_codes(session.user_id).await?;

    Ok(Json(ListQrCodesResponse { qr_codes }))
}
