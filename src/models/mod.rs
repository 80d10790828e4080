pub mod catalog;
pub mod pricing;

pub use catalog::{Distributor, Location, Manufacturer, ProductCategory};
pub use pricing::{ChangeDirection, PriceChange, ReviewStatus};
