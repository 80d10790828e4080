use crate::{
    auth::{NewUser, UserProfile},
    ApiResponse, ApiResult, AppState,
};
use axum::{extract::State, response::Json};

/// Create a user account (admin only; gated by the router).
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ApiResult<UserProfile> {
    let account = state.services.auth.create_user(payload).await?;
    Ok(Json(ApiResponse::success(UserProfile::from(account))))
}
