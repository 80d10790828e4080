use crate::{
    services::analytics::{DashboardStats, DistributorPerformance, LocationPerformance},
    ApiResponse, ApiResult, AppState,
};
use axum::{extract::State, response::Json};
use rust_decimal::Decimal;

pub async fn stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let mut stats = state.dashboard_service().stats().await?;
    stats.avg_price_change = stats.avg_price_change.round_dp(2);
    Ok(Json(ApiResponse::success(stats)))
}

pub async fn location_performance(
    State(state): State<AppState>,
) -> ApiResult<Vec<LocationPerformance>> {
    let mut performance = state.dashboard_service().location_performance().await?;
    for entry in &mut performance {
        entry.change_percent = round_display(entry.change_percent);
    }
    Ok(Json(ApiResponse::success(performance)))
}

pub async fn distributor_performance(
    State(state): State<AppState>,
) -> ApiResult<Vec<DistributorPerformance>> {
    let mut performance = state.dashboard_service().distributor_performance().await?;
    for entry in &mut performance {
        entry.change_percent = round_display(entry.change_percent);
    }
    Ok(Json(ApiResponse::success(performance)))
}

fn round_display(value: Decimal) -> Decimal {
    value.round_dp(2)
}
