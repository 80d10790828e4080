//! Pricedesk API Library
//!
//! Backend service for the construction-materials pricing dashboard:
//! materials catalog, price history, the price-change request workflow,
//! Slack notifications, and CSV bulk import.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod notifications;
pub mod openapi;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::AuthRouterExt;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn material_service(&self) -> Arc<services::materials::MaterialService> {
        self.services.materials.clone()
    }

    pub fn history_service(&self) -> Arc<services::price_history::PriceHistoryService> {
        self.services.history.clone()
    }

    pub fn request_service(&self) -> Arc<services::requests::PriceChangeRequestService> {
        self.services.requests.clone()
    }

    pub fn import_service(&self) -> Arc<services::import::BulkImportService> {
        self.services.imports.clone()
    }

    pub fn dashboard_service(&self) -> Arc<services::analytics::DashboardService> {
        self.services.dashboard.clone()
    }
}

// Common response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// Versioned API routes
pub fn api_v1_routes() -> Router<AppState> {
    // Read endpoints available to every authenticated user
    let read = Router::new()
        .route("/materials", get(handlers::materials::list_materials))
        .route(
            "/materials/search",
            get(handlers::materials::search_materials),
        )
        .route(
            "/materials/trending",
            get(handlers::materials::trending_materials),
        )
        .route("/materials/:id", get(handlers::materials::get_material))
        .route(
            "/materials/:id/history",
            get(handlers::history::material_history),
        )
        .route("/price-changes/recent", get(handlers::history::recent_changes))
        .route("/price-history/all", get(handlers::history::all_history))
        .route(
            "/price-change-requests",
            get(handlers::requests::list_requests),
        )
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .route(
            "/dashboard/location-performance",
            get(handlers::dashboard::location_performance),
        )
        .route(
            "/dashboard/distributor-performance",
            get(handlers::dashboard::distributor_performance),
        )
        .with_auth();

    // Any authenticated user may propose a price change
    let submit = Router::new()
        .route(
            "/price-change-requests",
            axum::routing::post(handlers::requests::submit_request),
        )
        .with_auth();

    // Mutations are restricted to admins
    let admin = Router::new()
        .route(
            "/materials",
            axum::routing::post(handlers::materials::create_material),
        )
        .route(
            "/materials/:id",
            axum::routing::patch(handlers::materials::update_material)
                .delete(handlers::materials::delete_material),
        )
        .route(
            "/materials/bulk-upload",
            axum::routing::post(handlers::imports::bulk_upload_materials),
        )
        .route(
            "/price-history/import",
            axum::routing::post(handlers::imports::import_price_history),
        )
        .route(
            "/price-change-requests/:id/approve",
            axum::routing::post(handlers::requests::approve_request),
        )
        .route(
            "/price-change-requests/:id/reject",
            axum::routing::post(handlers::requests::reject_request),
        )
        .route("/users", axum::routing::post(handlers::users::create_user))
        .with_role("admin");

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(read)
        .merge(submit)
        .merge(admin)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_time = option_env!("BUILD_TIME").unwrap_or("unknown");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "git": git,
        "build_time": build_time,
        "service": "pricedesk-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
