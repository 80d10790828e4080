mod common;

use pricedesk_api::{
    entities::{material, price_history},
    errors::ServiceError,
    models::catalog::{Distributor, Location, Manufacturer, ProductCategory},
    models::pricing::ReviewStatus,
    services::{materials::NewMaterial, requests::NewPriceChangeRequest},
};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

async fn seed_material(ctx: &common::TestContext, name: &str) -> material::Model {
    ctx.services
        .materials
        .create_material(
            NewMaterial {
                name: name.into(),
                location: Location::Atx,
                manufacturer: Manufacturer::Tamko,
                product_category: ProductCategory::Underlayment,
                distributor: Distributor::SrsProducts,
                current_price: dec!(100.00),
            },
            &ctx.admin,
        )
        .await
        .unwrap()
}

fn request_for(name: &str, recorded: Option<rust_decimal::Decimal>) -> NewPriceChangeRequest {
    NewPriceChangeRequest {
        material_name: name.into(),
        distributor: Distributor::SrsProducts,
        requested_price: dec!(125.50),
        current_price: recorded,
    }
}

#[tokio::test]
async fn submitted_requests_start_pending() {
    let ctx = common::setup().await;

    let request = ctx
        .services
        .requests
        .submit(request_for("Synthetic Felt", Some(dec!(100.00))), &ctx.standard)
        .await
        .unwrap();

    assert_eq!(request.status, ReviewStatus::Pending);
    assert_eq!(request.submitted_by, ctx.standard.user_id);
    assert_eq!(request.reviewed_by, None);
}

#[tokio::test]
async fn approval_applies_price_to_resolved_material() {
    let ctx = common::setup().await;
    let target = seed_material(&ctx, "Synthetic Felt").await;

    let request = ctx
        .services
        .requests
        .submit(request_for("Synthetic Felt", Some(dec!(100.00))), &ctx.standard)
        .await
        .unwrap();

    let outcome = ctx
        .services
        .requests
        .approve(request.id, &ctx.admin)
        .await
        .unwrap();

    assert!(outcome.applied);
    assert_eq!(outcome.request.status, ReviewStatus::Approved);
    assert_eq!(outcome.request.reviewed_by, Some(ctx.admin.user_id));

    let refreshed = material::Entity::find_by_id(target.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.current_price, dec!(125.50));
    assert_eq!(refreshed.previous_price, Some(dec!(100.00)));
}

#[tokio::test]
async fn approving_twice_is_a_conflict_and_applies_once() {
    let ctx = common::setup().await;
    let target = seed_material(&ctx, "Synthetic Felt").await;

    let request = ctx
        .services
        .requests
        .submit(request_for("Synthetic Felt", Some(dec!(100.00))), &ctx.standard)
        .await
        .unwrap();

    ctx.services
        .requests
        .approve(request.id, &ctx.admin)
        .await
        .unwrap();

    let second = ctx.services.requests.approve(request.id, &ctx.admin).await;
    assert!(matches!(second, Err(ServiceError::Conflict(_))));

    let history = price_history::Entity::find()
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    let entries: Vec<_> = history
        .iter()
        .filter(|e| e.material_id == target.id)
        .collect();
    assert_eq!(entries.len(), 1, "no duplicate history entry");
}

#[tokio::test]
async fn stale_recorded_price_falls_back_to_name_only_lookup() {
    let ctx = common::setup().await;
    let target = seed_material(&ctx, "Synthetic Felt").await;

    // Recorded price no longer matches any material
    let request = ctx
        .services
        .requests
        .submit(request_for("Synthetic Felt", Some(dec!(87.25))), &ctx.standard)
        .await
        .unwrap();

    let outcome = ctx
        .services
        .requests
        .approve(request.id, &ctx.admin)
        .await
        .unwrap();

    assert!(outcome.applied);
    assert_eq!(outcome.material.as_ref().map(|m| m.id), Some(target.id));
}

#[tokio::test]
async fn unresolved_material_still_approves_but_applies_nothing() {
    let ctx = common::setup().await;
    seed_material(&ctx, "Synthetic Felt").await;

    let request = ctx
        .services
        .requests
        .submit(request_for("Completely Unknown", Some(dec!(1.00))), &ctx.standard)
        .await
        .unwrap();

    let outcome = ctx
        .services
        .requests
        .approve(request.id, &ctx.admin)
        .await
        .unwrap();

    assert!(!outcome.applied);
    assert!(outcome.material.is_none());
    assert_eq!(outcome.request.status, ReviewStatus::Approved);
}

#[tokio::test]
async fn rejection_never_touches_material_prices() {
    let ctx = common::setup().await;
    seed_material(&ctx, "Synthetic Felt").await;
    seed_material(&ctx, "Ridge Vent").await;

    let before: Vec<_> = material::Entity::find()
        .all(ctx.db.as_ref())
        .await
        .unwrap()
        .into_iter()
        .map(|m| (m.id, m.current_price, m.previous_price))
        .collect();

    let request = ctx
        .services
        .requests
        .submit(request_for("Synthetic Felt", Some(dec!(100.00))), &ctx.standard)
        .await
        .unwrap();

    let rejected = ctx
        .services
        .requests
        .reject(request.id, &ctx.admin, Some("Supplier quote expired".into()))
        .await
        .unwrap();

    assert_eq!(rejected.status, ReviewStatus::Rejected);
    assert_eq!(rejected.notes.as_deref(), Some("Supplier quote expired"));

    let after: Vec<_> = material::Entity::find()
        .all(ctx.db.as_ref())
        .await
        .unwrap()
        .into_iter()
        .map(|m| (m.id, m.current_price, m.previous_price))
        .collect();
    assert_eq!(before, after, "material prices must be untouched");
}

#[tokio::test]
async fn rejected_requests_cannot_be_approved_later() {
    let ctx = common::setup().await;
    seed_material(&ctx, "Synthetic Felt").await;

    let request = ctx
        .services
        .requests
        .submit(request_for("Synthetic Felt", Some(dec!(100.00))), &ctx.standard)
        .await
        .unwrap();

    ctx.services
        .requests
        .reject(request.id, &ctx.admin, None)
        .await
        .unwrap();

    let approve = ctx.services.requests.approve(request.id, &ctx.admin).await;
    assert!(matches!(approve, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn review_operations_require_admin() {
    let ctx = common::setup().await;

    let request = ctx
        .services
        .requests
        .submit(request_for("Synthetic Felt", None), &ctx.standard)
        .await
        .unwrap();

    let approve = ctx
        .services
        .requests
        .approve(request.id, &ctx.standard)
        .await;
    assert!(matches!(approve, Err(ServiceError::Forbidden(_))));

    let reject = ctx
        .services
        .requests
        .reject(request.id, &ctx.standard, None)
        .await;
    assert!(matches!(reject, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn resolve_prefers_exact_price_match() {
    let ctx = common::setup().await;

    // Two materials with the same name at different prices
    let cheap = seed_material(&ctx, "Drip Edge").await;
    let pricey = ctx
        .services
        .materials
        .create_material(
            NewMaterial {
                name: "Drip Edge".into(),
                location: Location::Hou,
                manufacturer: Manufacturer::Other,
                product_category: ProductCategory::Flashing,
                distributor: Distributor::Beacon,
                current_price: dec!(250.00),
            },
            &ctx.admin,
        )
        .await
        .unwrap();

    let by_price = ctx
        .services
        .requests
        .resolve_material("Drip Edge", Some(dec!(250.00)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_price.id, pricey.id);

    let fallback = ctx
        .services
        .requests
        .resolve_material("Drip Edge", Some(dec!(999.99)))
        .await
        .unwrap()
        .unwrap();
    // Name-only fallback resolves some material with that name
    assert!(fallback.id == cheap.id || fallback.id == pricey.id);

    let missing = ctx
        .services
        .requests
        .resolve_material("Not A Material", None)
        .await
        .unwrap();
    assert!(missing.is_none());
}
