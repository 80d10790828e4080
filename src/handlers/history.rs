use crate::{
    entities::price_history,
    errors::ServiceError,
    handlers::materials::MaterialResponse,
    models::pricing::ReviewStatus,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Price-history entry as served to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub id: Uuid,
    pub material_id: Uuid,
    pub old_price: Option<Decimal>,
    pub new_price: Decimal,
    pub change_percent: Option<Decimal>,
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub status: ReviewStatus,
    pub notes: Option<String>,
}

impl From<price_history::Model> for HistoryEntryResponse {
    fn from(model: price_history::Model) -> Self {
        Self {
            id: model.id,
            material_id: model.material_id,
            old_price: model.old_price,
            new_price: model.new_price,
            change_percent: model.change_percent.map(|p| p.round_dp(2)),
            submitted_by: model.submitted_by,
            submitted_at: model.submitted_at,
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            status: model.status,
            notes: model.notes,
        }
    }
}

/// A recent price change joined with its material.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentChangeResponse {
    #[serde(flatten)]
    pub entry: HistoryEntryResponse,
    pub material: MaterialResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryWindowQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecentQuery {
    pub limit: Option<u64>,
}

pub async fn material_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<HistoryWindowQuery>,
) -> ApiResult<Vec<HistoryEntryResponse>> {
    if state.material_service().get_material(id).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Material {} not found",
            id
        )));
    }

    let days = query.days.unwrap_or(30).max(1);
    let entries = state.history_service().get_history(id, days).await?;
    let items = entries
        .into_iter()
        .map(HistoryEntryResponse::from)
        .collect();
    Ok(Json(ApiResponse::success(items)))
}

pub async fn recent_changes(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Vec<RecentChangeResponse>> {
    let limit = query.limit.unwrap_or(5).clamp(1, 100);
    let changes = state.history_service().recent_changes(limit).await?;

    let items = changes
        .into_iter()
        .map(|(entry, material)| RecentChangeResponse {
            entry: HistoryEntryResponse::from(entry),
            material: MaterialResponse::from(material),
        })
        .collect();
    Ok(Json(ApiResponse::success(items)))
}

/// Full history feed backing the price-history page.
pub async fn all_history(State(state): State<AppState>) -> ApiResult<Vec<RecentChangeResponse>> {
    let changes = state.history_service().recent_changes(100).await?;

    let items = changes
        .into_iter()
        .map(|(entry, material)| RecentChangeResponse {
            entry: HistoryEntryResponse::from(entry),
            material: MaterialResponse::from(material),
        })
        .collect();
    Ok(Json(ApiResponse::success(items)))
}
