use crate::{
    db::DbPool,
    entities::{material, price_change_request, price_history},
    errors::ServiceError,
    models::{catalog::Distributor, pricing::ReviewStatus},
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Headline dashboard numbers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_materials: u64,
    /// Average percent change across entries recorded in the last 24h
    pub avg_price_change: Decimal,
    /// History entries recorded in the last 24h
    pub recent_updates: u64,
    pub pending_requests: u64,
}

/// 30-day average change and coverage for one location.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocationPerformance {
    pub location: String,
    pub change_percent: Decimal,
    pub material_count: u64,
}

/// 30-day average change and coverage for one distributor.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DistributorPerformance {
    pub distributor: String,
    pub ticker_symbol: String,
    pub change_percent: Decimal,
    pub material_count: u64,
}

/// Service for dashboard analytics
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

struct GroupAccumulator {
    sum: Decimal,
    samples: u64,
    materials: Vec<Uuid>,
}

impl GroupAccumulator {
    fn new() -> Self {
        Self {
            sum: Decimal::ZERO,
            samples: 0,
            materials: Vec::new(),
        }
    }

    fn record(&mut self, material_id: Uuid, percent: Option<Decimal>) {
        if let Some(percent) = percent {
            self.sum += percent;
            self.samples += 1;
        }
        if !self.materials.contains(&material_id) {
            self.materials.push(material_id);
        }
    }

    fn average(&self) -> Decimal {
        if self.samples == 0 {
            Decimal::ZERO
        } else {
            self.sum / Decimal::from(self.samples)
        }
    }
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Headline counts plus the average change over the last 24 hours.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let db = self.db_pool.as_ref();

        let total_materials = material::Entity::find()
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let pending_requests = price_change_request::Entity::find()
            .filter(price_change_request::Column::Status.eq(ReviewStatus::Pending))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let cutoff = Utc::now() - Duration::hours(24);
        let recent = price_history::Entity::find()
            .filter(price_history::Column::SubmittedAt.gte(cutoff))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let recent_updates = recent.len() as u64;
        let changes: Vec<Decimal> = recent.iter().filter_map(|e| e.change_percent).collect();
        let avg_price_change = if changes.is_empty() {
            Decimal::ZERO
        } else {
            changes.iter().copied().sum::<Decimal>() / Decimal::from(changes.len() as u64)
        };

        Ok(DashboardStats {
            total_materials,
            avg_price_change,
            recent_updates,
            pending_requests,
        })
    }

    /// Average change per location over the trailing 30 days.
    #[instrument(skip(self))]
    pub async fn location_performance(&self) -> Result<Vec<LocationPerformance>, ServiceError> {
        let joined = self.recent_history_with_materials(30).await?;

        let mut groups: HashMap<String, GroupAccumulator> = HashMap::new();
        for (entry, mat) in &joined {
            groups
                .entry(mat.location.as_str().to_string())
                .or_insert_with(GroupAccumulator::new)
                .record(mat.id, entry.change_percent);
        }

        let mut performance: Vec<LocationPerformance> = groups
            .into_iter()
            .map(|(location, acc)| LocationPerformance {
                location,
                change_percent: acc.average(),
                material_count: acc.materials.len() as u64,
            })
            .collect();
        performance.sort_by(|a, b| a.location.cmp(&b.location));
        Ok(performance)
    }

    /// Average change per distributor over the trailing 30 days.
    #[instrument(skip(self))]
    pub async fn distributor_performance(
        &self,
    ) -> Result<Vec<DistributorPerformance>, ServiceError> {
        let joined = self.recent_history_with_materials(30).await?;

        let mut groups: HashMap<String, (Distributor, GroupAccumulator)> = HashMap::new();
        for (entry, mat) in &joined {
            groups
                .entry(mat.distributor.as_str().to_string())
                .or_insert_with(|| (mat.distributor, GroupAccumulator::new()))
                .1
                .record(mat.id, entry.change_percent);
        }

        let mut performance: Vec<DistributorPerformance> = groups
            .into_values()
            .map(|(distributor, acc)| DistributorPerformance {
                distributor: distributor.as_str().to_string(),
                ticker_symbol: distributor.ticker_symbol().to_string(),
                change_percent: acc.average(),
                material_count: acc.materials.len() as u64,
            })
            .collect();
        performance.sort_by(|a, b| a.distributor.cmp(&b.distributor));
        Ok(performance)
    }

    async fn recent_history_with_materials(
        &self,
        days: i64,
    ) -> Result<Vec<(price_history::Model, material::Model)>, ServiceError> {
        let db = self.db_pool.as_ref();
        let cutoff = Utc::now() - Duration::days(days);

        let rows = price_history::Entity::find()
            .filter(price_history::Column::SubmittedAt.gte(cutoff))
            .find_also_related(material::Entity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, mat)| mat.map(|m| (entry, m)))
            .collect())
    }
}
