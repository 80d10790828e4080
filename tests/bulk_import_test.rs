mod common;

use chrono::{Datelike, TimeZone, Utc};
use pricedesk_api::{
    entities::{material, price_history},
    models::catalog::{Distributor, Location, Manufacturer, ProductCategory},
    models::pricing::ReviewStatus,
    services::materials::NewMaterial,
};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

const MATERIALS_CSV_HEADER: &str = "name,location,manufacturer,productCategory,distributor,currentPrice";

#[tokio::test]
async fn bad_row_is_reported_and_does_not_abort_neighbors() {
    let ctx = common::setup().await;

    let csv = format!(
        "{}\n{}\n{}\n{}\n",
        MATERIALS_CSV_HEADER,
        "Timberline HDZ,DFW,GAF,Shingle,ABCSupply,100.50",
        "Ridge Vent,ATX,Atlas,Ventilation,Ajax Roofing,55.25",
        "Synthetic Felt,HOU,Tamko,Underlayment,Beacon,75.00",
    );

    let summary = ctx
        .services
        .imports
        .import_materials(&csv, &ctx.admin)
        .await
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.success, 2);
    assert_eq!(summary.errors.len(), 1);
    // Header-offset numbering: the bad second data row is file row 3
    assert_eq!(summary.errors[0].row, 3);
    assert!(summary.errors[0].error.contains("distributor"));

    let names: Vec<String> = material::Entity::find()
        .all(ctx.db.as_ref())
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert!(names.contains(&"Timberline HDZ".to_string()));
    assert!(names.contains(&"Synthetic Felt".to_string()));
    assert!(!names.contains(&"Ridge Vent".to_string()));
}

#[tokio::test]
async fn rows_are_trimmed_and_normalized() {
    let ctx = common::setup().await;

    let csv = format!(
        "{}\n{}\n",
        MATERIALS_CSV_HEADER,
        "  Drip Edge  , hou , owens corning , flashing , abc supply , $42.50 ",
    );

    let summary = ctx
        .services
        .imports
        .import_materials(&csv, &ctx.admin)
        .await
        .unwrap();
    assert_eq!(summary.success, 1, "errors: {:?}", summary.errors);

    let imported = material::Entity::find()
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(imported.name, "Drip Edge");
    assert_eq!(imported.location, Location::Hou);
    assert_eq!(imported.manufacturer, Manufacturer::OwensCorning);
    assert_eq!(imported.product_category, ProductCategory::Flashing);
    assert_eq!(imported.distributor, Distributor::AbcSupply);
    assert_eq!(imported.ticker_symbol, "ABC");
    assert_eq!(imported.current_price, dec!(42.50));
}

#[tokio::test]
async fn unknown_manufacturer_and_location_fall_back_to_buckets() {
    let ctx = common::setup().await;

    let csv = format!(
        "{}\n{}\n",
        MATERIALS_CSV_HEADER,
        "Garage Opener,Mars,Acme,Door Motor,Beacon,310.25",
    );

    let summary = ctx
        .services
        .imports
        .import_materials(&csv, &ctx.admin)
        .await
        .unwrap();
    assert_eq!(summary.success, 1);

    let imported = material::Entity::find()
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(imported.location, Location::Dfw);
    assert_eq!(imported.manufacturer, Manufacturer::Other);
}

#[tokio::test]
async fn invalid_price_is_a_row_error() {
    let ctx = common::setup().await;

    let csv = format!(
        "{}\n{}\n",
        MATERIALS_CSV_HEADER,
        "Timberline HDZ,DFW,GAF,Shingle,ABCSupply,call for pricing",
    );

    let summary = ctx
        .services
        .imports
        .import_materials(&csv, &ctx.admin)
        .await
        .unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.success, 0);
    assert_eq!(summary.errors[0].row, 2);
    assert!(summary.errors[0].error.contains("currentPrice"));
}

#[tokio::test]
async fn history_import_preserves_historical_chronology() {
    let ctx = common::setup().await;

    ctx.services
        .materials
        .create_material(
            NewMaterial {
                name: "Timberline HDZ".into(),
                location: Location::Dfw,
                manufacturer: Manufacturer::Gaf,
                product_category: ProductCategory::Shingle,
                distributor: Distributor::AbcSupply,
                current_price: dec!(125.50),
            },
            &ctx.admin,
        )
        .await
        .unwrap();

    let csv = concat!(
        "materialName,distributor,location,oldPrice,newPrice,changeDate,changeReason\n",
        "Timberline HDZ,ABCSupply,DFW,90.00,100.00,2024-11-05,Supplier increase\n",
        "Timberline HDZ,ABCSupply,DFW,100.00,125.50,1/5/2025,Annual adjustment\n",
    );

    let summary = ctx
        .services
        .imports
        .import_price_history(csv, &ctx.admin)
        .await
        .unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.success, 2, "errors: {:?}", summary.errors);

    let entries = price_history::Entity::find()
        .filter(price_history::Column::Status.eq(ReviewStatus::Approved))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);

    let november = entries
        .iter()
        .find(|e| e.submitted_at.month() == 11)
        .expect("november entry");
    assert_eq!(
        november.submitted_at,
        Utc.with_ymd_and_hms(2024, 11, 5, 0, 0, 0).unwrap()
    );
    assert_eq!(november.change_percent.map(|p| p.round_dp(2)), Some(dec!(11.11)));

    let january = entries
        .iter()
        .find(|e| e.submitted_at.month() == 1)
        .expect("january entry");
    assert_eq!(
        january.submitted_at,
        Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap()
    );
    assert_eq!(january.change_percent, Some(dec!(25.5)));
}

#[tokio::test]
async fn history_import_requires_matching_material_triple() {
    let ctx = common::setup().await;

    ctx.services
        .materials
        .create_material(
            NewMaterial {
                name: "Timberline HDZ".into(),
                location: Location::Dfw,
                manufacturer: Manufacturer::Gaf,
                product_category: ProductCategory::Shingle,
                distributor: Distributor::AbcSupply,
                current_price: dec!(125.50),
            },
            &ctx.admin,
        )
        .await
        .unwrap();

    // Right name, wrong location
    let csv = concat!(
        "materialName,distributor,location,oldPrice,newPrice,changeDate,changeReason\n",
        "Timberline HDZ,ABCSupply,ATX,90.00,100.00,2024-11-05,Supplier increase\n",
    );

    let summary = ctx
        .services
        .imports
        .import_price_history(csv, &ctx.admin)
        .await
        .unwrap();
    assert_eq!(summary.success, 0);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 2);
}

#[tokio::test]
async fn import_is_admin_only() {
    let ctx = common::setup().await;

    let csv = format!(
        "{}\n{}\n",
        MATERIALS_CSV_HEADER,
        "Timberline HDZ,DFW,GAF,Shingle,ABCSupply,100.50",
    );

    let result = ctx
        .services
        .imports
        .import_materials(&csv, &ctx.standard)
        .await;
    assert!(result.is_err());
}
