//! Property-based tests for the price-change calculator.
//!
//! These verify the percent formula and the degenerate-case policy across
//! a wide range of inputs, including values that would break a naive
//! floating-point implementation.

use proptest::prelude::*;
use pricedesk_api::models::pricing::{self, ChangeDirection};
use rust_decimal::Decimal;

// Strategies for generating test data
fn price_strategy() -> impl Strategy<Value = Decimal> {
    // Positive prices with two fraction digits, up to 8 integer digits
    (1i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn percent_matches_formula_for_positive_old_prices(
        old in price_strategy(),
        new in price_strategy(),
    ) {
        let percent = pricing::change_percent(Some(old), new)
            .expect("positive old price always yields a percent");
        let expected = (new - old) / old * Decimal::ONE_HUNDRED;
        prop_assert_eq!(percent, expected);
    }

    #[test]
    fn percent_is_zero_iff_price_is_unchanged(
        old in price_strategy(),
        new in price_strategy(),
    ) {
        let percent = pricing::change_percent(Some(old), new).unwrap();
        prop_assert_eq!(percent.is_zero(), old == new);
    }

    #[test]
    fn missing_old_price_never_panics_and_yields_none(new in price_strategy()) {
        prop_assert_eq!(pricing::change_percent(None, new), None);
        prop_assert_eq!(pricing::change_percent(Some(Decimal::ZERO), new), None);
    }

    #[test]
    fn direction_agrees_with_price_ordering(
        old in price_strategy(),
        new in price_strategy(),
    ) {
        let change = pricing::evaluate(Some(old), new);
        match change.direction {
            ChangeDirection::Up => prop_assert!(new > old),
            ChangeDirection::Down => prop_assert!(new <= old),
            ChangeDirection::New => prop_assert!(false, "positive old price cannot be New"),
        }
    }

    #[test]
    fn first_price_is_always_classified_new(new in price_strategy()) {
        let change = pricing::evaluate(None, new);
        prop_assert_eq!(change.direction, ChangeDirection::New);
        prop_assert_eq!(change.percent, None);
        prop_assert_eq!(change.amount, new);
    }

    #[test]
    fn evaluate_is_deterministic(
        old in price_strategy(),
        new in price_strategy(),
    ) {
        let first = pricing::evaluate(Some(old), new);
        let second = pricing::evaluate(Some(old), new);
        prop_assert_eq!(first, second);
    }
}
