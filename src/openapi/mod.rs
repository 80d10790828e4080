use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pricedesk API",
        version = "0.3.0",
        description = r#"
# Pricedesk Materials Pricing API

Backend for the construction-materials pricing dashboard.

## Features

- **Materials Catalog**: Search and browse materials with current and previous prices
- **Price History**: Every price change is recorded with its percent movement
- **Change Requests**: Standard users propose price changes; admins approve or reject
- **Slack Notifications**: Requests and price edits are announced to the team channel
- **CSV Import**: Bulk material creation and historical price backfill

## Authentication

All API endpoints require a JWT bearer token obtained from `/auth/login`:

```
Authorization: Bearer <your-jwt-token>
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Materials", description = "Materials catalog endpoints"),
        (name = "Price Change Requests", description = "Request workflow endpoints"),
        (name = "Dashboard", description = "Dashboard analytics endpoints"),
        (name = "Imports", description = "CSV bulk import endpoints")
    ),
    paths(
        crate::handlers::materials::list_materials,
        crate::handlers::materials::get_material,
        crate::handlers::materials::create_material,
        crate::handlers::materials::update_material,
        crate::handlers::requests::submit_request,
        crate::handlers::requests::approve_request,
        crate::handlers::requests::reject_request,
        // Dashboard, history, and import paths intentionally omitted from
        // OpenAPI for now
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::errors::ErrorResponse,
            crate::handlers::materials::MaterialResponse,
            crate::handlers::history::HistoryEntryResponse,
            crate::handlers::history::RecentChangeResponse,
            crate::handlers::requests::RequestResponse,
            crate::handlers::requests::ApprovalResponse,
            crate::services::materials::NewMaterial,
            crate::services::materials::UpdateMaterial,
            crate::services::requests::NewPriceChangeRequest,
            crate::services::import::ImportSummary,
            crate::services::import::RowError,
            crate::services::analytics::DashboardStats,
            crate::services::analytics::LocationPerformance,
            crate::services::analytics::DistributorPerformance,
            crate::models::catalog::Location,
            crate::models::catalog::Manufacturer,
            crate::models::catalog::ProductCategory,
            crate::models::catalog::Distributor,
            crate::models::pricing::ReviewStatus,
            crate::models::pricing::ChangeDirection
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_generates() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Pricedesk API"));
        assert!(json.contains("/api/v1/materials"));
    }
}
