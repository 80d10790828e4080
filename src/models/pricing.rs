//! Price-change arithmetic.
//!
//! Pure and deterministic: the same inputs always produce the same
//! percentage and direction, and a missing or zero prior price is a
//! defined degenerate case rather than an error.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Review lifecycle shared by price-history entries and change requests.
/// Transitions only run pending → approved or pending → rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

/// Directional classification of a price movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Up,
    Down,
    New,
}

/// A computed price movement: signed amount, signed percentage (absent
/// when there is no usable prior price), and direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PriceChange {
    pub amount: Decimal,
    pub percent: Option<Decimal>,
    pub direction: ChangeDirection,
}

/// Signed percentage change from `old_price` to `new_price`.
///
/// Returns `None` when the old price is absent or exactly zero; the
/// caller treats that as "no percent change", never as a division error.
pub fn change_percent(old_price: Option<Decimal>, new_price: Decimal) -> Option<Decimal> {
    match old_price {
        Some(old) if !old.is_zero() => Some((new_price - old) / old * Decimal::ONE_HUNDRED),
        _ => None,
    }
}

/// Classifies a movement: `New` when there is no usable prior price,
/// otherwise `Up` for a positive change and `Down` for zero or negative.
pub fn evaluate(old_price: Option<Decimal>, new_price: Decimal) -> PriceChange {
    match change_percent(old_price, new_price) {
        Some(percent) => PriceChange {
            amount: new_price - old_price.unwrap_or_default(),
            percent: Some(percent),
            direction: if percent > Decimal::ZERO {
                ChangeDirection::Up
            } else {
                ChangeDirection::Down
            },
        },
        None => PriceChange {
            amount: new_price,
            percent: None,
            direction: ChangeDirection::New,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percent_change_basic() {
        assert_eq!(
            change_percent(Some(dec!(100.00)), dec!(125.50)),
            Some(dec!(25.5))
        );
        assert_eq!(
            change_percent(Some(dec!(200)), dec!(150)),
            Some(dec!(-25))
        );
    }

    #[test]
    fn missing_or_zero_old_price_is_degenerate_not_an_error() {
        assert_eq!(change_percent(None, dec!(9.99)), None);
        assert_eq!(change_percent(Some(Decimal::ZERO), dec!(9.99)), None);
    }

    #[test]
    fn direction_classification() {
        assert_eq!(
            evaluate(Some(dec!(100.00)), dec!(125.50)).direction,
            ChangeDirection::Up
        );
        assert_eq!(
            evaluate(Some(dec!(100)), dec!(80)).direction,
            ChangeDirection::Down
        );
        assert_eq!(evaluate(None, dec!(42)).direction, ChangeDirection::New);
        assert_eq!(
            evaluate(Some(Decimal::ZERO), dec!(42)).direction,
            ChangeDirection::New
        );
    }

    #[test]
    fn change_amount_tracks_prior_price() {
        let change = evaluate(Some(dec!(100.00)), dec!(125.50));
        assert_eq!(change.amount, dec!(25.50));

        let first = evaluate(None, dec!(10.00));
        assert_eq!(first.amount, dec!(10.00));
        assert_eq!(first.percent, None);
    }
}
