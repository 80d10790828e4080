use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::catalog::{Distributor, Location, Manufacturer, ProductCategory};

/// A purchasable construction item tracked with a current price.
///
/// `ticker_symbol` is derived from `distributor` and recomputed whenever
/// the distributor changes. `previous_price`, when present, is the
/// `current_price` immediately prior to the most recent price update.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub location: Location,
    pub manufacturer: Manufacturer,
    pub product_category: ProductCategory,
    pub distributor: Distributor,
    pub ticker_symbol: String,
    pub current_price: Decimal,
    pub previous_price: Option<Decimal>,
    pub last_updated: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::price_history::Entity")]
    PriceHistory,
}

impl Related<super::price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
