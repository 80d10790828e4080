use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::material,
    errors::ServiceError,
    models::catalog::{Distributor, Location, Manufacturer, ProductCategory},
    models::pricing::ReviewStatus,
    services::{
        materials::{MaterialService, NewMaterial},
        price_history::{NewHistoryEntry, PriceHistoryService},
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

/// Per-row failure in a bulk import.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RowError {
    /// File row number; the first data row is 2 because of the header.
    pub row: usize,
    pub error: String,
}

/// Aggregate result of a bulk import. Failed rows never abort the rest
/// of the file.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportSummary {
    pub total: usize,
    pub success: usize,
    pub errors: Vec<RowError>,
}

/// CSV row for material creation.
#[derive(Debug, Deserialize)]
struct MaterialRow {
    name: String,
    location: String,
    manufacturer: String,
    #[serde(rename = "productCategory")]
    product_category: String,
    distributor: String,
    #[serde(rename = "currentPrice")]
    current_price: String,
}

/// CSV row for historical price-change backfill.
#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(rename = "materialName")]
    material_name: String,
    distributor: String,
    location: String,
    #[serde(rename = "oldPrice")]
    old_price: String,
    #[serde(rename = "newPrice")]
    new_price: String,
    #[serde(rename = "changeDate")]
    change_date: String,
    #[serde(rename = "changeReason")]
    change_reason: String,
}

/// Service for CSV bulk imports
#[derive(Clone)]
pub struct BulkImportService {
    db_pool: Arc<DbPool>,
    materials: Arc<MaterialService>,
}

impl BulkImportService {
    pub fn new(db_pool: Arc<DbPool>, materials: Arc<MaterialService>) -> Self {
        Self { db_pool, materials }
    }

    /// Import materials row by row. Each valid row creates a material
    /// immediately; a later failure never undoes an earlier success.
    #[instrument(skip(self, csv_content, actor))]
    pub async fn import_materials(
        &self,
        csv_content: &str,
        actor: &AuthUser,
    ) -> Result<ImportSummary, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Admin access required for bulk import".to_string(),
            ));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv_content.as_bytes());

        let mut summary = ImportSummary {
            total: 0,
            success: 0,
            errors: Vec::new(),
        };

        for (index, record) in reader.deserialize::<MaterialRow>().enumerate() {
            summary.total += 1;
            // +2: the header row plus 1-based numbering
            let row_number = index + 2;

            let outcome = match record {
                Ok(row) => self.import_material_row(row, actor).await,
                Err(e) => Err(ServiceError::InvalidInput(format!("Malformed row: {}", e))),
            };

            match outcome {
                Ok(()) => summary.success += 1,
                Err(e) => summary.errors.push(RowError {
                    row: row_number,
                    error: e.to_string(),
                }),
            }
        }

        info!(
            total = summary.total,
            success = summary.success,
            failed = summary.errors.len(),
            "Material import finished"
        );
        Ok(summary)
    }

    async fn import_material_row(
        &self,
        row: MaterialRow,
        actor: &AuthUser,
    ) -> Result<(), ServiceError> {
        let name = row.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "name: Material name is required".to_string(),
            ));
        }

        let distributor = Distributor::parse_normalized(&row.distributor).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "distributor: '{}' is not a recognized distributor",
                row.distributor.trim()
            ))
        })?;

        let current_price = parse_price(&row.current_price, "currentPrice")?;

        let new_material = NewMaterial {
            name,
            location: Location::normalize(&row.location),
            manufacturer: Manufacturer::normalize(&row.manufacturer),
            product_category: ProductCategory::normalize(&row.product_category),
            distributor,
            current_price,
        };

        self.materials.create_material(new_material, actor).await?;
        Ok(())
    }

    /// Import historical price changes. Materials are matched by
    /// name + distributor + location; the supplied change date becomes the
    /// entry's submission timestamp so backfill preserves true chronology.
    #[instrument(skip(self, csv_content, actor))]
    pub async fn import_price_history(
        &self,
        csv_content: &str,
        actor: &AuthUser,
    ) -> Result<ImportSummary, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Admin access required for bulk import".to_string(),
            ));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv_content.as_bytes());

        let mut summary = ImportSummary {
            total: 0,
            success: 0,
            errors: Vec::new(),
        };

        for (index, record) in reader.deserialize::<HistoryRow>().enumerate() {
            summary.total += 1;
            let row_number = index + 2;

            let outcome = match record {
                Ok(row) => self.import_history_row(row, actor).await,
                Err(e) => Err(ServiceError::InvalidInput(format!("Malformed row: {}", e))),
            };

            match outcome {
                Ok(()) => summary.success += 1,
                Err(e) => summary.errors.push(RowError {
                    row: row_number,
                    error: e.to_string(),
                }),
            }
        }

        info!(
            total = summary.total,
            success = summary.success,
            failed = summary.errors.len(),
            "Price history import finished"
        );
        Ok(summary)
    }

    async fn import_history_row(
        &self,
        row: HistoryRow,
        actor: &AuthUser,
    ) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let distributor = Distributor::parse_normalized(&row.distributor).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "distributor: '{}' is not a recognized distributor",
                row.distributor.trim()
            ))
        })?;
        let location = Location::normalize(&row.location);

        let target = material::Entity::find()
            .filter(material::Column::Name.eq(row.material_name.trim()))
            .filter(material::Column::Distributor.eq(distributor))
            .filter(material::Column::Location.eq(location))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No material named '{}' for {} at {}",
                    row.material_name.trim(),
                    distributor.as_str(),
                    location.as_str()
                ))
            })?;

        let old_price = if row.old_price.trim().is_empty() {
            None
        } else {
            Some(parse_price(&row.old_price, "oldPrice")?)
        };
        let new_price = parse_price(&row.new_price, "newPrice")?;
        let change_date = parse_change_date(&row.change_date)?;

        let reason = row.change_reason.trim();
        PriceHistoryService::insert_entry(
            db,
            NewHistoryEntry {
                material_id: target.id,
                old_price,
                new_price,
                submitted_by: actor.user_id,
                submitted_at: Some(change_date),
                approved_by: Some(actor.user_id),
                status: ReviewStatus::Approved,
                notes: (!reason.is_empty()).then(|| reason.to_string()),
            },
        )
        .await?;

        Ok(())
    }
}

fn parse_price(raw: &str, field: &str) -> Result<Decimal, ServiceError> {
    let cleaned = raw.trim().trim_start_matches('$');
    let price = Decimal::from_str(cleaned).map_err(|_| {
        ServiceError::ValidationError(format!("{}: '{}' is not a valid price", field, raw.trim()))
    })?;
    if price <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "{}: price must be a positive amount",
            field
        )));
    }
    Ok(price)
}

/// Accepts `YYYY-MM-DD` and `M/D/YYYY` change dates.
fn parse_change_date(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let trimmed = raw.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .map_err(|_| {
            ServiceError::ValidationError(format!(
                "changeDate: '{}' is not a valid date (expected YYYY-MM-DD or M/D/YYYY)",
                trimmed
            ))
        })?;

    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
        ServiceError::ValidationError(format!("changeDate: '{}' is out of range", trimmed))
    })?;
    Ok(DateTime::from_naive_utc_and_offset(midnight, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_both_accepted_date_formats() {
        let iso = parse_change_date("2025-01-05").unwrap();
        let us = parse_change_date("1/5/2025").unwrap();
        assert_eq!(iso, us);
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert!(parse_change_date("Jan 5 2025").is_err());
        assert!(parse_change_date("2025-13-40").is_err());
    }

    #[test]
    fn price_parsing_strips_currency_symbol_and_requires_positive() {
        assert_eq!(parse_price("$125.50", "p").unwrap(), dec!(125.50));
        assert_eq!(parse_price(" 99.99 ", "p").unwrap(), dec!(99.99));
        assert!(parse_price("free", "p").is_err());
        assert!(parse_price("-1.00", "p").is_err());
        assert!(parse_price("0", "p").is_err());
    }
}
