use crate::{
    auth::AuthUser, errors::ServiceError, services::import::ImportSummary, ApiResponse, ApiResult,
    AppState,
};
use axum::{
    extract::{Extension, State},
    response::Json,
};

/// Bulk material creation from a CSV body with columns
/// name, location, manufacturer, productCategory, distributor, currentPrice.
pub async fn bulk_upload_materials(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    body: String,
) -> ApiResult<ImportSummary> {
    if body.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "No CSV content provided".to_string(),
        ));
    }

    let summary = state
        .import_service()
        .import_materials(&body, &principal)
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// Historical price-change backfill from a CSV body with columns
/// materialName, distributor, location, oldPrice, newPrice, changeDate,
/// changeReason.
pub async fn import_price_history(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    body: String,
) -> ApiResult<ImportSummary> {
    if body.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "No CSV content provided".to_string(),
        ));
    }

    let summary = state
        .import_service()
        .import_price_history(&body, &principal)
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}
