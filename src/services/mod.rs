pub mod analytics;
pub mod import;
pub mod materials;
pub mod price_history;
pub mod requests;
