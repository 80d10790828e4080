mod common;

use pricedesk_api::{
    entities::price_history,
    errors::ServiceError,
    models::catalog::{Distributor, Location, Manufacturer, ProductCategory},
    models::pricing::ReviewStatus,
    services::materials::{NewMaterial, UpdateMaterial},
};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

fn shingle() -> NewMaterial {
    NewMaterial {
        name: "Timberline HDZ Charcoal".into(),
        location: Location::Dfw,
        manufacturer: Manufacturer::Gaf,
        product_category: ProductCategory::Shingle,
        distributor: Distributor::AbcSupply,
        current_price: dec!(100.00),
    }
}

#[tokio::test]
async fn create_derives_ticker_and_starts_without_history() {
    let ctx = common::setup().await;

    let created = ctx
        .services
        .materials
        .create_material(shingle(), &ctx.admin)
        .await
        .unwrap();

    assert_eq!(created.ticker_symbol, "ABC");
    assert_eq!(created.current_price, dec!(100.00));
    assert_eq!(created.previous_price, None);

    let history = price_history::Entity::find()
        .filter(price_history::Column::MaterialId.eq(created.id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn price_update_round_trip_snapshots_previous_and_records_history() {
    let ctx = common::setup().await;
    let created = ctx
        .services
        .materials
        .create_material(shingle(), &ctx.admin)
        .await
        .unwrap();

    let updated = ctx
        .services
        .materials
        .update_material(
            created.id,
            UpdateMaterial {
                current_price: Some(dec!(125.50)),
                ..Default::default()
            },
            &ctx.admin,
        )
        .await
        .unwrap();

    assert_eq!(updated.current_price, dec!(125.50));
    assert_eq!(updated.previous_price, Some(dec!(100.00)));

    let history = price_history::Entity::find()
        .filter(price_history::Column::MaterialId.eq(created.id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);

    let entry = &history[0];
    assert_eq!(entry.old_price, Some(dec!(100.00)));
    assert_eq!(entry.new_price, dec!(125.50));
    assert_eq!(entry.change_percent, Some(dec!(25.5)));
    assert_eq!(entry.status, ReviewStatus::Approved);
    assert_eq!(entry.submitted_by, ctx.admin.user_id);
    assert_eq!(entry.approved_by, Some(ctx.admin.user_id));
}

#[tokio::test]
async fn unchanged_price_writes_no_history() {
    let ctx = common::setup().await;
    let created = ctx
        .services
        .materials
        .create_material(shingle(), &ctx.admin)
        .await
        .unwrap();

    ctx.services
        .materials
        .update_material(
            created.id,
            UpdateMaterial {
                current_price: Some(dec!(100.00)),
                name: Some("Timberline HDZ Slate".into()),
                ..Default::default()
            },
            &ctx.admin,
        )
        .await
        .unwrap();

    let history = price_history::Entity::find()
        .filter(price_history::Column::MaterialId.eq(created.id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn distributor_change_recomputes_ticker() {
    let ctx = common::setup().await;
    let created = ctx
        .services
        .materials
        .create_material(shingle(), &ctx.admin)
        .await
        .unwrap();

    let updated = ctx
        .services
        .materials
        .update_material(
            created.id,
            UpdateMaterial {
                distributor: Some(Distributor::Beacon),
                ..Default::default()
            },
            &ctx.admin,
        )
        .await
        .unwrap();

    assert_eq!(updated.distributor, Distributor::Beacon);
    assert_eq!(updated.ticker_symbol, "QXO");
}

#[tokio::test]
async fn updating_missing_material_is_not_found() {
    let ctx = common::setup().await;

    let result = ctx
        .services
        .materials
        .update_material(
            Uuid::new_v4(),
            UpdateMaterial {
                current_price: Some(dec!(10.00)),
                ..Default::default()
            },
            &ctx.admin,
        )
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn standard_users_cannot_mutate_materials() {
    let ctx = common::setup().await;

    let create = ctx
        .services
        .materials
        .create_material(shingle(), &ctx.standard)
        .await;
    assert!(matches!(create, Err(ServiceError::Forbidden(_))));

    let created = ctx
        .services
        .materials
        .create_material(shingle(), &ctx.admin)
        .await
        .unwrap();

    let update = ctx
        .services
        .materials
        .update_material(
            created.id,
            UpdateMaterial {
                current_price: Some(dec!(1.00)),
                ..Default::default()
            },
            &ctx.standard,
        )
        .await;
    assert!(matches!(update, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn search_matches_name_substring() {
    let ctx = common::setup().await;
    ctx.services
        .materials
        .create_material(shingle(), &ctx.admin)
        .await
        .unwrap();

    let hits = ctx
        .services
        .materials
        .search_materials("Timberline")
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let misses = ctx
        .services
        .materials
        .search_materials("Polycarbonate")
        .await
        .unwrap();
    assert!(misses.is_empty());
}
