use crate::{
    db::DbPool,
    entities::{material, price_history},
    errors::ServiceError,
    models::pricing::{self, ReviewStatus},
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// A price movement to be recorded against a material.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub material_id: Uuid,
    pub old_price: Option<Decimal>,
    pub new_price: Decimal,
    pub submitted_by: Uuid,
    /// Defaults to now; historical imports supply the true change date.
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub status: ReviewStatus,
    pub notes: Option<String>,
}

/// Service for reading and recording price history
#[derive(Clone)]
pub struct PriceHistoryService {
    db_pool: Arc<DbPool>,
}

impl PriceHistoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Inserts a history row, computing the change percent from the prices.
    ///
    /// Takes any connection so the material-update transaction can write
    /// its history entry on the same unit of work.
    pub async fn insert_entry<C: ConnectionTrait>(
        db: &C,
        entry: NewHistoryEntry,
    ) -> Result<price_history::Model, ServiceError> {
        let change_percent = pricing::change_percent(entry.old_price, entry.new_price);
        let submitted_at = entry.submitted_at.unwrap_or_else(Utc::now);
        let approved_at = entry.approved_by.map(|_| submitted_at);

        let row = price_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            material_id: Set(entry.material_id),
            old_price: Set(entry.old_price),
            new_price: Set(entry.new_price),
            change_percent: Set(change_percent),
            submitted_by: Set(entry.submitted_by),
            submitted_at: Set(submitted_at),
            approved_by: Set(entry.approved_by),
            approved_at: Set(approved_at),
            status: Set(entry.status),
            notes: Set(entry.notes),
        };

        row.insert(db).await.map_err(ServiceError::DatabaseError)
    }

    /// History for one material within the trailing window.
    #[instrument(skip(self))]
    pub async fn get_history(
        &self,
        material_id: Uuid,
        days: i64,
    ) -> Result<Vec<price_history::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        let cutoff = Utc::now() - Duration::days(days);

        price_history::Entity::find()
            .filter(price_history::Column::MaterialId.eq(material_id))
            .filter(price_history::Column::SubmittedAt.gte(cutoff))
            .order_by_desc(price_history::Column::SubmittedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Most recent approved price changes joined with their materials.
    #[instrument(skip(self))]
    pub async fn recent_changes(
        &self,
        limit: u64,
    ) -> Result<Vec<(price_history::Model, material::Model)>, ServiceError> {
        let db = self.db_pool.as_ref();

        let rows = price_history::Entity::find()
            .filter(price_history::Column::Status.eq(ReviewStatus::Approved))
            .order_by_desc(price_history::Column::SubmittedAt)
            .limit(limit)
            .find_also_related(material::Entity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, material)| material.map(|m| (entry, m)))
            .collect())
    }
}
