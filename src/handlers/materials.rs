use crate::{
    auth::AuthUser,
    entities::material,
    errors::ServiceError,
    models::{
        catalog::{Distributor, Location, Manufacturer, ProductCategory},
        pricing::{self, ChangeDirection},
    },
    services::materials::{NewMaterial, UpdateMaterial},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

/// Material as served to clients, with the computed movement against the
/// previous price. Percent is rounded to display precision here only.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MaterialResponse {
    pub id: Uuid,
    pub name: String,
    pub location: Location,
    pub manufacturer: Manufacturer,
    pub product_category: ProductCategory,
    pub distributor: Distributor,
    pub ticker_symbol: String,
    pub current_price: Decimal,
    pub previous_price: Option<Decimal>,
    pub last_updated: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub change_percent: Option<Decimal>,
    pub change_direction: ChangeDirection,
}

impl From<material::Model> for MaterialResponse {
    fn from(model: material::Model) -> Self {
        let change = pricing::evaluate(model.previous_price, model.current_price);
        Self {
            id: model.id,
            name: model.name,
            location: model.location,
            manufacturer: model.manufacturer,
            product_category: model.product_category,
            distributor: model.distributor,
            ticker_symbol: model.ticker_symbol,
            current_price: model.current_price,
            previous_price: model.previous_price,
            last_updated: model.last_updated,
            updated_by: model.updated_by,
            change_percent: change.percent.map(|p| p.round_dp(2)),
            change_direction: change.direction,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TrendingQuery {
    pub days: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/materials",
    tag = "Materials",
    responses(
        (status = 200, description = "All materials with computed change", body = ApiResponse<Vec<MaterialResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_materials(State(state): State<AppState>) -> ApiResult<Vec<MaterialResponse>> {
    let materials = state.material_service().list_materials().await?;
    let items = materials.into_iter().map(MaterialResponse::from).collect();
    Ok(Json(ApiResponse::success(items)))
}

pub async fn search_materials(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<MaterialResponse>> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ServiceError::InvalidInput("Search query required".to_string()))?;

    let materials = state.material_service().search_materials(term).await?;
    let items = materials.into_iter().map(MaterialResponse::from).collect();
    Ok(Json(ApiResponse::success(items)))
}

pub async fn trending_materials(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> ApiResult<Vec<MaterialResponse>> {
    let days = query.days.unwrap_or(7).max(1);
    let trending = state.material_service().trending_materials(days).await?;

    let items = trending
        .into_iter()
        .map(|(model, percent)| {
            let mut response = MaterialResponse::from(model);
            response.change_direction = if percent > Decimal::ZERO {
                ChangeDirection::Up
            } else {
                ChangeDirection::Down
            };
            response.change_percent = Some(percent.round_dp(2));
            response
        })
        .collect();
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/api/v1/materials/{id}",
    tag = "Materials",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material retrieved", body = ApiResponse<MaterialResponse>),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<MaterialResponse> {
    match state.material_service().get_material(id).await? {
        Some(model) => Ok(Json(ApiResponse::success(MaterialResponse::from(model)))),
        None => Err(ServiceError::NotFound(format!(
            "Material {} not found",
            id
        ))),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/materials",
    tag = "Materials",
    request_body = NewMaterial,
    responses(
        (status = 200, description = "Material created", body = ApiResponse<MaterialResponse>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_material(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Json(payload): Json<NewMaterial>,
) -> ApiResult<MaterialResponse> {
    let created = state
        .material_service()
        .create_material(payload, &principal)
        .await?;
    Ok(Json(ApiResponse::success(MaterialResponse::from(created))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/materials/{id}",
    tag = "Materials",
    params(("id" = Uuid, Path, description = "Material ID")),
    request_body = UpdateMaterial,
    responses(
        (status = 200, description = "Material updated", body = ApiResponse<MaterialResponse>),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_material(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMaterial>,
) -> ApiResult<MaterialResponse> {
    let updated = state
        .material_service()
        .update_material(id, payload, &principal)
        .await?;
    Ok(Json(ApiResponse::success(MaterialResponse::from(updated))))
}

pub async fn delete_material(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let deleted = state
        .material_service()
        .delete_material(id, &principal)
        .await?;
    if !deleted {
        return Err(ServiceError::NotFound(format!(
            "Material {} not found",
            id
        )));
    }
    Ok(Json(ApiResponse::success(json!({ "deleted": true }))))
}
