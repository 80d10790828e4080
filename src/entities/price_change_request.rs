use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::catalog::Distributor;
use crate::models::pricing::ReviewStatus;

/// A user-submitted proposal to change a material's price.
///
/// The target material is matched by name (and the price recorded at
/// submission time) during approval, not by foreign key; the loose
/// coupling is deliberate. `slack_message_ts` correlates the request with
/// the Slack message that announced it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_change_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
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
    pub slack_message_ts: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
