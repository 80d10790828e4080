use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::{material, price_change_request},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{catalog::Distributor, pricing::ReviewStatus},
    notifications::{
        self, ChannelMessage, Notifier, RequestApproved as ApprovedDetails,
        RequestSubmitted as SubmittedDetails,
    },
    services::materials::{MaterialService, UpdateMaterial},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Payload for submitting a price-change request.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewPriceChangeRequest {
    #[validate(length(min = 1, max = 255, message = "Material name cannot be empty"))]
    pub material_name: String,
    pub distributor: Distributor,
    #[validate(custom = "validate_positive_price")]
    pub requested_price: Decimal,
    /// Snapshot of the material's price at submission time, used to
    /// disambiguate the lookup at approval time.
    pub current_price: Option<Decimal>,
}

fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        let mut err = ValidationError::new("requested_price");
        err.message = Some("Requested price must be a positive amount".into());
        return Err(err);
    }
    Ok(())
}

/// Result of approving a request. `applied` is false when no material
/// matched the request's name/price, in which case the request is still
/// approved but nothing was mutated.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub request: price_change_request::Model,
    pub applied: bool,
    pub material: Option<material::Model>,
}

/// Service for the price-change request workflow
#[derive(Clone)]
pub struct PriceChangeRequestService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    notifier: Arc<dyn Notifier>,
    materials: Arc<MaterialService>,
}

impl PriceChangeRequestService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        notifier: Arc<dyn Notifier>,
        materials: Arc<MaterialService>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            notifier,
            materials,
        }
    }

    /// Submit a request. The Slack announcement is best-effort; its
    /// message timestamp is stored for correlation when delivery
    /// succeeds.
    #[instrument(skip(self, request, actor), fields(material = %request.material_name))]
    pub async fn submit(
        &self,
        request: NewPriceChangeRequest,
        actor: &AuthUser,
    ) -> Result<price_change_request::Model, ServiceError> {
        request.validate()?;

        let db = self.db_pool.as_ref();
        let row = price_change_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            material_name: Set(request.material_name.trim().to_string()),
            distributor: Set(request.distributor),
            requested_price: Set(request.requested_price),
            current_price: Set(request.current_price),
            submitted_by: Set(actor.user_id),
            submitted_at: Set(Utc::now()),
            status: Set(ReviewStatus::Pending),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            notes: Set(None),
            slack_message_ts: Set(None),
        };

        let mut created = row.insert(db).await.map_err(ServiceError::DatabaseError)?;

        self.event_sender
            .send(Event::RequestSubmitted(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        let message = ChannelMessage::request_submitted(&SubmittedDetails {
            request_id: created.id,
            material_name: created.material_name.clone(),
            distributor: created.distributor.as_str().to_string(),
            requested_price: created.requested_price,
            current_price: created.current_price,
            submitted_by: actor.name.clone(),
        });
        if let Some(ts) = notifications::post_best_effort(&self.notifier, message).await {
            let mut update: price_change_request::ActiveModel = created.clone().into();
            update.slack_message_ts = Set(Some(ts));
            created = update
                .update(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
        }

        info!(request_id = %created.id, "Price change request submitted");
        Ok(created)
    }

    /// List requests, optionally filtered by status, newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<price_change_request::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = price_change_request::Entity::find()
            .order_by_desc(price_change_request::Column::SubmittedAt);
        if let Some(status) = status {
            query = query.filter(price_change_request::Column::Status.eq(status));
        }
        query.all(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Get a request by ID
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<price_change_request::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        price_change_request::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Resolve the material a request targets: exact name + recorded
    /// price first, then name alone. Pure lookup with no side effects.
    #[instrument(skip(self))]
    pub async fn resolve_material(
        &self,
        material_name: &str,
        recorded_price: Option<Decimal>,
    ) -> Result<Option<material::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        if let Some(price) = recorded_price {
            let exact = material::Entity::find()
                .filter(material::Column::Name.eq(material_name))
                .filter(material::Column::CurrentPrice.eq(price))
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if exact.is_some() {
                return Ok(exact);
            }
        }

        material::Entity::find()
            .filter(material::Column::Name.eq(material_name))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Approve a pending request and apply its price to the resolved
    /// material. Approving a request that is no longer pending is a
    /// conflict; the terminal state is never revisited.
    #[instrument(skip(self, actor))]
    pub async fn approve(
        &self,
        id: Uuid,
        actor: &AuthUser,
    ) -> Result<ApprovalOutcome, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Admin access required to approve requests".to_string(),
            ));
        }

        let request = self.transition(id, ReviewStatus::Approved, actor, None).await?;

        let resolved = self
            .resolve_material(&request.material_name, request.current_price)
            .await?;

        let (applied, material) = match resolved {
            Some(found) => {
                let old_price = found.current_price;
                let (updated, _) = self
                    .materials
                    .apply_update(
                        found.id,
                        UpdateMaterial {
                            current_price: Some(request.requested_price),
                            ..Default::default()
                        },
                        actor,
                    )
                    .await?;

                let message = ChannelMessage::request_approved(&ApprovedDetails {
                    material_name: request.material_name.clone(),
                    distributor: request.distributor.as_str().to_string(),
                    new_price: request.requested_price,
                    old_price: Some(old_price),
                    approved_by: actor.name.clone(),
                });
                notifications::post_detached(self.notifier.clone(), message);

                (true, Some(updated))
            }
            None => {
                // Observed permissive behavior: the request stays approved
                // even when no material matches. Logged loudly.
                warn!(
                    request_id = %request.id,
                    material = %request.material_name,
                    "Approved request could not be matched to a material; no price applied"
                );

                let message = ChannelMessage::request_approved(&ApprovedDetails {
                    material_name: request.material_name.clone(),
                    distributor: request.distributor.as_str().to_string(),
                    new_price: request.requested_price,
                    old_price: request.current_price,
                    approved_by: actor.name.clone(),
                });
                notifications::post_detached(self.notifier.clone(), message);

                (false, None)
            }
        };

        self.event_sender
            .send(Event::RequestApproved(request.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(request_id = %request.id, applied, "Price change request approved");
        Ok(ApprovalOutcome {
            request,
            applied,
            material,
        })
    }

    /// Reject a pending request. Never touches material rows.
    #[instrument(skip(self, actor))]
    pub async fn reject(
        &self,
        id: Uuid,
        actor: &AuthUser,
        notes: Option<String>,
    ) -> Result<price_change_request::Model, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Admin access required to reject requests".to_string(),
            ));
        }

        let request = self.transition(id, ReviewStatus::Rejected, actor, notes).await?;

        self.event_sender
            .send(Event::RequestRejected(request.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(request_id = %request.id, "Price change request rejected");
        Ok(request)
    }

    /// Conditional pending→terminal transition. The write only succeeds
    /// while the row is still pending, so two reviewers racing on the
    /// same request cannot both win.
    async fn transition(
        &self,
        id: Uuid,
        to: ReviewStatus,
        actor: &AuthUser,
        notes: Option<String>,
    ) -> Result<price_change_request::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        price_change_request::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Price change request {} not found", id))
            })?;

        let mut update = price_change_request::ActiveModel {
            status: Set(to),
            reviewed_by: Set(Some(actor.user_id)),
            reviewed_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        if notes.is_some() {
            update.notes = Set(notes);
        }

        let result = price_change_request::Entity::update_many()
            .set(update)
            .filter(price_change_request::Column::Id.eq(id))
            .filter(price_change_request::Column::Status.eq(ReviewStatus::Pending))
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let current = price_change_request::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Price change request {} not found", id))
            })?;

        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "Price change request {} has already been {}",
                id,
                current.status.as_str()
            )));
        }

        Ok(current)
    }
}
