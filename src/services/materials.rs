use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::{material, price_history},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        catalog::{Distributor, Location, Manufacturer, ProductCategory},
        pricing::ReviewStatus,
    },
    notifications::{self, AdminPriceUpdate, ChannelMessage, Notifier},
    services::price_history::{NewHistoryEntry, PriceHistoryService},
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionError, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Payload for creating a material.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewMaterial {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: String,
    pub location: Location,
    pub manufacturer: Manufacturer,
    pub product_category: ProductCategory,
    pub distributor: Distributor,
    #[validate(custom = "validate_positive_price")]
    pub current_price: Decimal,
}

/// Partial update payload; omitted fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMaterial {
    pub name: Option<String>,
    pub location: Option<Location>,
    pub manufacturer: Option<Manufacturer>,
    pub product_category: Option<ProductCategory>,
    pub distributor: Option<Distributor>,
    pub current_price: Option<Decimal>,
}

/// Outcome of a price mutation inside a material update.
#[derive(Debug, Clone, Copy)]
pub struct PriceMutation {
    pub old_price: Decimal,
    pub new_price: Decimal,
}

fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        let mut err = ValidationError::new("current_price");
        err.message = Some("Price must be a positive amount".into());
        return Err(err);
    }
    Ok(())
}

/// Service for managing the materials catalog
#[derive(Clone)]
pub struct MaterialService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    notifier: Arc<dyn Notifier>,
}

impl MaterialService {
    /// Creates a new material service instance
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            notifier,
        }
    }

    /// Create a material with its first price. The ticker symbol is always
    /// derived from the distributor, never taken from the caller.
    #[instrument(skip(self, new_material, actor), fields(name = %new_material.name))]
    pub async fn create_material(
        &self,
        new_material: NewMaterial,
        actor: &AuthUser,
    ) -> Result<material::Model, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Admin access required to create materials".to_string(),
            ));
        }
        new_material.validate()?;

        let db = self.db_pool.as_ref();
        let row = material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_material.name.clone()),
            location: Set(new_material.location),
            manufacturer: Set(new_material.manufacturer),
            product_category: Set(new_material.product_category),
            distributor: Set(new_material.distributor),
            ticker_symbol: Set(new_material.distributor.ticker_symbol().to_string()),
            current_price: Set(new_material.current_price),
            previous_price: Set(None),
            last_updated: Set(Utc::now()),
            updated_by: Set(Some(actor.user_id)),
        };

        let created = row.insert(db).await.map_err(|e| {
            error!(name = %new_material.name, error = %e, "Failed to create material");
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender
            .send(Event::MaterialCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        notifications::post_detached(
            self.notifier.clone(),
            ChannelMessage::admin_price_update(&AdminPriceUpdate {
                material_name: created.name.clone(),
                distributor: created.distributor.as_str().to_string(),
                location: created.location.as_str().to_string(),
                new_price: created.current_price,
                old_price: None,
                updated_by: actor.name.clone(),
            }),
        );

        info!(material_id = %created.id, "Material created");
        Ok(created)
    }

    /// Get a material by ID
    #[instrument(skip(self))]
    pub async fn get_material(&self, id: Uuid) -> Result<Option<material::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        material::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// All materials, most recently updated first
    #[instrument(skip(self))]
    pub async fn list_materials(&self) -> Result<Vec<material::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        material::Entity::find()
            .order_by_desc(material::Column::LastUpdated)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Case-insensitive substring search on material name
    #[instrument(skip(self))]
    pub async fn search_materials(
        &self,
        query: &str,
    ) -> Result<Vec<material::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        material::Entity::find()
            .filter(material::Column::Name.contains(query))
            .limit(10)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Apply a partial update. A price change snapshots the prior price,
    /// writes the history entry, and persists the new state as one
    /// transaction, then announces the change to the channel.
    #[instrument(skip(self, changes, actor))]
    pub async fn update_material(
        &self,
        id: Uuid,
        changes: UpdateMaterial,
        actor: &AuthUser,
    ) -> Result<material::Model, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Admin access required to update materials".to_string(),
            ));
        }

        let (updated, mutation) = self.apply_update(id, changes, actor).await?;

        if let Some(mutation) = mutation {
            notifications::post_detached(
                self.notifier.clone(),
                ChannelMessage::admin_price_update(&AdminPriceUpdate {
                    material_name: updated.name.clone(),
                    distributor: updated.distributor.as_str().to_string(),
                    location: updated.location.as_str().to_string(),
                    new_price: mutation.new_price,
                    old_price: Some(mutation.old_price),
                    updated_by: actor.name.clone(),
                }),
            );
        }

        Ok(updated)
    }

    /// Transactional core of the update; also used by request approval,
    /// which sends its own notification.
    pub(crate) async fn apply_update(
        &self,
        id: Uuid,
        changes: UpdateMaterial,
        actor: &AuthUser,
    ) -> Result<(material::Model, Option<PriceMutation>), ServiceError> {
        if let Some(name) = &changes.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Name cannot be empty".to_string(),
                ));
            }
        }
        if let Some(price) = changes.current_price {
            validate_positive_price(&price)
                .map_err(|_| ServiceError::ValidationError("Price must be a positive amount".to_string()))?;
        }

        let db = self.db_pool.as_ref();
        let actor_id = actor.user_id;

        let (updated, mutation) = db
            .transaction::<_, (material::Model, Option<PriceMutation>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let current = material::Entity::find_by_id(id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::DatabaseError)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!("Material {} not found", id))
                            })?;

                        let mut row: material::ActiveModel = current.clone().into();

                        if let Some(name) = changes.name {
                            row.name = Set(name);
                        }
                        if let Some(location) = changes.location {
                            row.location = Set(location);
                        }
                        if let Some(manufacturer) = changes.manufacturer {
                            row.manufacturer = Set(manufacturer);
                        }
                        if let Some(category) = changes.product_category {
                            row.product_category = Set(category);
                        }
                        if let Some(distributor) = changes.distributor {
                            // Ticker must never go stale against the distributor
                            row.distributor = Set(distributor);
                            row.ticker_symbol = Set(distributor.ticker_symbol().to_string());
                        }

                        let mut mutation = None;
                        if let Some(new_price) = changes.current_price {
                            if new_price != current.current_price {
                                row.previous_price = Set(Some(current.current_price));

                                PriceHistoryService::insert_entry(
                                    txn,
                                    NewHistoryEntry {
                                        material_id: id,
                                        old_price: Some(current.current_price),
                                        new_price,
                                        submitted_by: actor_id,
                                        submitted_at: None,
                                        approved_by: Some(actor_id),
                                        status: ReviewStatus::Approved,
                                        notes: None,
                                    },
                                )
                                .await?;

                                row.current_price = Set(new_price);
                                mutation = Some(PriceMutation {
                                    old_price: current.current_price,
                                    new_price,
                                });
                            }
                        }

                        row.last_updated = Set(Utc::now());
                        row.updated_by = Set(Some(actor_id));

                        let updated = row
                            .update(txn)
                            .await
                            .map_err(ServiceError::DatabaseError)?;

                        Ok((updated, mutation))
                    })
                },
            )
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let Some(mutation) = &mutation {
            self.event_sender
                .send(Event::PriceChanged {
                    material_id: updated.id,
                    old_price: Some(mutation.old_price),
                    new_price: mutation.new_price,
                })
                .await
                .map_err(ServiceError::EventError)?;
        } else {
            self.event_sender
                .send(Event::MaterialUpdated(updated.id))
                .await
                .map_err(ServiceError::EventError)?;
        }

        info!(material_id = %updated.id, price_changed = mutation.is_some(), "Material updated");
        Ok((updated, mutation))
    }

    /// Delete a material
    #[instrument(skip(self, actor))]
    pub async fn delete_material(&self, id: Uuid, actor: &AuthUser) -> Result<bool, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Admin access required to delete materials".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let result = material::Entity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let deleted = result.rows_affected > 0;
        if deleted {
            self.event_sender
                .send(Event::MaterialDeleted(id))
                .await
                .map_err(ServiceError::EventError)?;
        }
        Ok(deleted)
    }

    /// Materials with the largest absolute approved change inside the
    /// trailing window, biggest movers first.
    #[instrument(skip(self))]
    pub async fn trending_materials(
        &self,
        days: i64,
    ) -> Result<Vec<(material::Model, Decimal)>, ServiceError> {
        let db = self.db_pool.as_ref();
        let cutoff = Utc::now() - Duration::days(days);

        let rows = price_history::Entity::find()
            .filter(price_history::Column::SubmittedAt.gte(cutoff))
            .filter(price_history::Column::Status.eq(ReviewStatus::Approved))
            .order_by_desc(price_history::Column::SubmittedAt)
            .find_also_related(material::Entity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut biggest: Vec<(material::Model, Decimal)> = Vec::new();
        for (entry, material) in rows {
            let (Some(material), Some(percent)) = (material, entry.change_percent) else {
                continue;
            };
            match biggest.iter_mut().find(|(m, _)| m.id == material.id) {
                Some((_, existing)) if existing.abs() >= percent.abs() => {}
                Some(slot) => slot.1 = percent,
                None => biggest.push((material, percent)),
            }
        }

        biggest.sort_by(|a, b| b.1.abs().cmp(&a.1.abs()));
        biggest.truncate(10);
        Ok(biggest)
    }
}
