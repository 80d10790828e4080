//! Catalog enumerations for the materials taxonomy.
//!
//! `Distributor` carries the fixed distributor→ticker mapping used for
//! display grouping; the ticker stored on a material must always agree
//! with its distributor.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Branch locations materials are priced under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Location {
    #[sea_orm(string_value = "DFW")]
    Dfw,
    #[sea_orm(string_value = "ATX")]
    Atx,
    #[sea_orm(string_value = "HOU")]
    Hou,
    #[sea_orm(string_value = "OKC")]
    Okc,
    #[sea_orm(string_value = "ATL")]
    Atl,
    #[sea_orm(string_value = "ARK")]
    Ark,
    #[sea_orm(string_value = "NSH")]
    Nsh,
}

impl Location {
    pub const ALL: [Location; 7] = [
        Location::Dfw,
        Location::Atx,
        Location::Hou,
        Location::Okc,
        Location::Atl,
        Location::Ark,
        Location::Nsh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Dfw => "DFW",
            Location::Atx => "ATX",
            Location::Hou => "HOU",
            Location::Okc => "OKC",
            Location::Atl => "ATL",
            Location::Ark => "ARK",
            Location::Nsh => "NSH",
        }
    }

    /// Case-insensitive lookup; empty or unrecognized input falls back to
    /// the DFW home branch (the import default).
    pub fn normalize(input: &str) -> Location {
        let trimmed = input.trim();
        Location::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or(Location::Dfw)
    }
}

/// Manufacturers carried in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(64))")]
pub enum Manufacturer {
    #[sea_orm(string_value = "Atlas")]
    Atlas,
    #[sea_orm(string_value = "Malarky")]
    Malarky,
    #[sea_orm(string_value = "Tri-Built")]
    #[serde(rename = "Tri-Built")]
    TriBuilt,
    #[sea_orm(string_value = "CertainTeed")]
    CertainTeed,
    #[sea_orm(string_value = "Tamko")]
    Tamko,
    #[sea_orm(string_value = "GAF")]
    #[serde(rename = "GAF")]
    Gaf,
    #[sea_orm(string_value = "Owens Corning")]
    #[serde(rename = "Owens Corning")]
    OwensCorning,
    #[sea_orm(string_value = "IKO")]
    #[serde(rename = "IKO")]
    Iko,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl Manufacturer {
    pub const ALL: [Manufacturer; 9] = [
        Manufacturer::Atlas,
        Manufacturer::Malarky,
        Manufacturer::TriBuilt,
        Manufacturer::CertainTeed,
        Manufacturer::Tamko,
        Manufacturer::Gaf,
        Manufacturer::OwensCorning,
        Manufacturer::Iko,
        Manufacturer::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Manufacturer::Atlas => "Atlas",
            Manufacturer::Malarky => "Malarky",
            Manufacturer::TriBuilt => "Tri-Built",
            Manufacturer::CertainTeed => "CertainTeed",
            Manufacturer::Tamko => "Tamko",
            Manufacturer::Gaf => "GAF",
            Manufacturer::OwensCorning => "Owens Corning",
            Manufacturer::Iko => "IKO",
            Manufacturer::Other => "Other",
        }
    }

    /// Case-insensitive lookup; unknown names land in the Other bucket.
    pub fn normalize(input: &str) -> Manufacturer {
        let trimmed = input.trim();
        Manufacturer::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or(Manufacturer::Other)
    }
}

/// Product categories carried in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(64))")]
pub enum ProductCategory {
    #[sea_orm(string_value = "Shingle")]
    Shingle,
    #[sea_orm(string_value = "Accessory")]
    Accessory,
    #[sea_orm(string_value = "Decking")]
    Decking,
    #[sea_orm(string_value = "Underlayment")]
    Underlayment,
    #[sea_orm(string_value = "Ventilation")]
    Ventilation,
    #[sea_orm(string_value = "Flashing")]
    Flashing,
    #[sea_orm(string_value = "Garage Door")]
    #[serde(rename = "Garage Door")]
    GarageDoor,
    #[sea_orm(string_value = "Door Motor")]
    #[serde(rename = "Door Motor")]
    DoorMotor,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 9] = [
        ProductCategory::Shingle,
        ProductCategory::Accessory,
        ProductCategory::Decking,
        ProductCategory::Underlayment,
        ProductCategory::Ventilation,
        ProductCategory::Flashing,
        ProductCategory::GarageDoor,
        ProductCategory::DoorMotor,
        ProductCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Shingle => "Shingle",
            ProductCategory::Accessory => "Accessory",
            ProductCategory::Decking => "Decking",
            ProductCategory::Underlayment => "Underlayment",
            ProductCategory::Ventilation => "Ventilation",
            ProductCategory::Flashing => "Flashing",
            ProductCategory::GarageDoor => "Garage Door",
            ProductCategory::DoorMotor => "Door Motor",
            ProductCategory::Other => "Other",
        }
    }

    /// Case-insensitive lookup; unknown names land in the Other bucket.
    pub fn normalize(input: &str) -> ProductCategory {
        let trimmed = input.trim();
        ProductCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or(ProductCategory::Other)
    }
}

/// Supplier channels materials are priced under, each with a fixed ticker
/// symbol used for display grouping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(64))")]
pub enum Distributor {
    #[sea_orm(string_value = "ABCSupply")]
    #[serde(rename = "ABCSupply")]
    AbcSupply,
    #[sea_orm(string_value = "Beacon")]
    Beacon,
    #[sea_orm(string_value = "SRSProducts")]
    #[serde(rename = "SRSProducts")]
    SrsProducts,
    #[sea_orm(string_value = "CommercialDistributors")]
    CommercialDistributors,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl Distributor {
    pub const ALL: [Distributor; 5] = [
        Distributor::AbcSupply,
        Distributor::Beacon,
        Distributor::SrsProducts,
        Distributor::CommercialDistributors,
        Distributor::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Distributor::AbcSupply => "ABCSupply",
            Distributor::Beacon => "Beacon",
            Distributor::SrsProducts => "SRSProducts",
            Distributor::CommercialDistributors => "CommercialDistributors",
            Distributor::Other => "Other",
        }
    }

    /// Ticker symbol derived one-to-one from the distributor. Must never
    /// disagree with the distributor stored on a material.
    pub fn ticker_symbol(&self) -> &'static str {
        match self {
            Distributor::AbcSupply => "ABC",
            Distributor::Beacon => "QXO",
            Distributor::SrsProducts => "SRS",
            Distributor::CommercialDistributors => "CDH",
            Distributor::Other => "OTH",
        }
    }

    /// Maps free-text distributor names (canonical names, tickers, and the
    /// common long-form variants seen in supplier exports) to the
    /// enumerated value. Returns `None` for unrecognized input so import
    /// rows with a bad distributor surface as per-row errors.
    pub fn parse_normalized(input: &str) -> Option<Distributor> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(found) = Distributor::ALL
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(trimmed))
        {
            return Some(found);
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "abc" | "abc supply" | "abc supply co" => Some(Distributor::AbcSupply),
            "qxo" | "beacon building products" => Some(Distributor::Beacon),
            "srs" | "srs products" | "srs distribution" => Some(Distributor::SrsProducts),
            "cdh" | "commercial distributors" => Some(Distributor::CommercialDistributors),
            "oth" => Some(Distributor::Other),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_mapping_is_fixed() {
        assert_eq!(Distributor::AbcSupply.ticker_symbol(), "ABC");
        assert_eq!(Distributor::Beacon.ticker_symbol(), "QXO");
        assert_eq!(Distributor::SrsProducts.ticker_symbol(), "SRS");
        assert_eq!(Distributor::CommercialDistributors.ticker_symbol(), "CDH");
        assert_eq!(Distributor::Other.ticker_symbol(), "OTH");
    }

    #[test]
    fn distributor_accepts_variants_and_rejects_unknown() {
        assert_eq!(
            Distributor::parse_normalized("abcsupply"),
            Some(Distributor::AbcSupply)
        );
        assert_eq!(
            Distributor::parse_normalized("ABC Supply"),
            Some(Distributor::AbcSupply)
        );
        assert_eq!(
            Distributor::parse_normalized("Beacon Building Products"),
            Some(Distributor::Beacon)
        );
        assert_eq!(Distributor::parse_normalized("Ajax Roofing"), None);
        assert_eq!(Distributor::parse_normalized(""), None);
    }

    #[test]
    fn location_falls_back_to_home_branch() {
        assert_eq!(Location::normalize("hou"), Location::Hou);
        assert_eq!(Location::normalize(""), Location::Dfw);
        assert_eq!(Location::normalize("Mars"), Location::Dfw);
    }

    #[test]
    fn manufacturer_and_category_bucket_unknowns() {
        assert_eq!(
            Manufacturer::normalize("owens corning"),
            Manufacturer::OwensCorning
        );
        assert_eq!(Manufacturer::normalize("Acme"), Manufacturer::Other);
        assert_eq!(
            ProductCategory::normalize("garage door"),
            ProductCategory::GarageDoor
        );
        assert_eq!(ProductCategory::normalize("Widget"), ProductCategory::Other);
    }
}
