use crate::{
    auth::AuthUser,
    entities::price_change_request,
    handlers::materials::MaterialResponse,
    models::{catalog::Distributor, pricing::ReviewStatus},
    services::requests::NewPriceChangeRequest,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Price-change request as served to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestResponse {
    pub id: Uuid,
    pub material_name: String,
    pub distributor: Distributor,
    pub requested_price: Decimal,
    pub current_price: Option<Decimal>,
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub status: ReviewStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl From<price_change_request::Model> for RequestResponse {
    fn from(model: price_change_request::Model) -> Self {
        Self {
            id: model.id,
            material_name: model.material_name,
            distributor: model.distributor,
            requested_price: model.requested_price,
            current_price: model.current_price,
            submitted_by: model.submitted_by,
            submitted_at: model.submitted_at,
            status: model.status,
            reviewed_by: model.reviewed_by,
            reviewed_at: model.reviewed_at,
            notes: model.notes,
        }
    }
}

/// Approval result: the reviewed request plus whether a material price
/// was actually applied.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApprovalResponse {
    pub request: RequestResponse,
    pub applied: bool,
    pub material: Option<MaterialResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestListQuery {
    pub status: Option<ReviewStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectBody {
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/price-change-requests",
    tag = "Price Change Requests",
    request_body = NewPriceChangeRequest,
    responses(
        (status = 200, description = "Request submitted", body = ApiResponse<RequestResponse>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn submit_request(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Json(payload): Json<NewPriceChangeRequest>,
) -> ApiResult<RequestResponse> {
    let created = state.request_service().submit(payload, &principal).await?;
    Ok(Json(ApiResponse::success(RequestResponse::from(created))))
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<Vec<RequestResponse>> {
    let requests = state.request_service().list(query.status).await?;
    let items = requests.into_iter().map(RequestResponse::from).collect();
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    post,
    path = "/api/v1/price-change-requests/{id}/approve",
    tag = "Price Change Requests",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request approved", body = ApiResponse<ApprovalResponse>),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Request already reviewed", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn approve_request(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<ApprovalResponse> {
    let outcome = state.request_service().approve(id, &principal).await?;
    Ok(Json(ApiResponse::success(ApprovalResponse {
        request: RequestResponse::from(outcome.request),
        applied: outcome.applied,
        material: outcome.material.map(MaterialResponse::from),
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/price-change-requests/{id}/reject",
    tag = "Price Change Requests",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = RejectBody,
    responses(
        (status = 200, description = "Request rejected", body = ApiResponse<RequestResponse>),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Request already reviewed", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn reject_request(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    body: Option<Json<RejectBody>>,
) -> ApiResult<RequestResponse> {
    let notes = body.and_then(|Json(body)| body.notes);
    let rejected = state
        .request_service()
        .reject(id, &principal, notes)
        .await?;
    Ok(Json(ApiResponse::success(RequestResponse::from(rejected))))
}
