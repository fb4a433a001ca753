use super::{property_url, Locale};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Kind of real estate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Villa,
    House,
    #[default]
    Condo,
    Apartment,
    Townhouse,
    Land,
    Office,
    Other,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Villa => "villa",
            PropertyType::House => "house",
            PropertyType::Condo => "condo",
            PropertyType::Apartment => "apartment",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Land => "land",
            PropertyType::Office => "office",
            PropertyType::Other => "other",
        }
    }

    /// Map a lower-cased spreadsheet value (English or German) to a type
    pub fn from_alias(value: &str) -> Option<Self> {
        let kind = match value {
            "villa" | "pool villa" | "poolvilla" => PropertyType::Villa,
            "house" | "haus" | "einfamilienhaus" => PropertyType::House,
            "condo" | "condominium" | "eigentumswohnung" => PropertyType::Condo,
            "apartment" | "wohnung" | "flat" | "studio" | "penthouse" => PropertyType::Apartment,
            "townhouse" | "town house" | "reihenhaus" => PropertyType::Townhouse,
            "land" | "grundstück" | "grundstueck" | "plot" => PropertyType::Land,
            "office" | "büro" | "buero" | "commercial" => PropertyType::Office,
            "other" | "sonstige" => PropertyType::Other,
            _ => return None,
        };
        Some(kind)
    }
}

/// Whether a listing is offered for sale or for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Listing {
    #[default]
    Sale,
    Rent,
}

impl Listing {
    pub fn from_alias(value: &str) -> Option<Self> {
        match value {
            "sale" | "sell" | "buy" | "kauf" | "verkauf" => Some(Listing::Sale),
            "rent" | "rental" | "lease" | "miete" | "vermietung" => Some(Listing::Rent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Available,
    Reserved,
    Sold,
    Rented,
}

impl Status {
    pub fn from_alias(value: &str) -> Option<Self> {
        match value {
            "available" | "verfügbar" | "verfuegbar" | "frei" => Some(Status::Available),
            "reserved" | "reserviert" => Some(Status::Reserved),
            "sold" | "verkauft" => Some(Status::Sold),
            "rented" | "vermietet" => Some(Status::Rented),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Furnishing {
    Unfurnished,
    Partly,
    #[default]
    Furnished,
}

impl Furnishing {
    pub fn from_alias(value: &str) -> Option<Self> {
        match value {
            "unfurnished" | "unmöbliert" | "unmoebliert" => Some(Furnishing::Unfurnished),
            "partly" | "partly furnished" | "partially furnished" | "teilmöbliert" => {
                Some(Furnishing::Partly)
            }
            "furnished" | "fully furnished" | "möbliert" | "moebliert" => Some(Furnishing::Furnished),
            _ => None,
        }
    }
}

/// Reason a localized record is not written
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing slug")]
    MissingSlug,

    #[error("missing title")]
    MissingTitle,
}

/// A property listing in one locale, as consumed by the website
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRecord {
    pub slug: String,
    pub url: String,
    pub locale: Locale,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub price_thb: u64,
    #[serde(rename = "type", default)]
    pub kind: PropertyType,
    #[serde(rename = "for", default)]
    pub listing: Listing,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub furnishing: Furnishing,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default, serialize_with = "whole_number")]
    pub living_sqm: Option<f64>,
    #[serde(default, serialize_with = "whole_number")]
    pub land_sqm: Option<f64>,
    #[serde(default)]
    pub floor: Option<i64>,
    #[serde(default)]
    pub year_built: Option<i64>,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, serialize_with = "whole_number")]
    pub lat: Option<f64>,
    #[serde(default, serialize_with = "whole_number")]
    pub lng: Option<f64>,
    #[serde(default = "default_ownership")]
    pub ownership: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees_hoa_thb: Option<u64>,
}

pub const DEFAULT_LOCATION: &str = "Pattaya";
pub const DEFAULT_OWNERSHIP: &str = "Thai Quota";

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_ownership() -> String {
    DEFAULT_OWNERSHIP.to_string()
}

/// Writes integral floats without a fractional part (`120` rather than `120.0`)
fn whole_number<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => serializer.serialize_i64(*v as i64),
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

impl PropertyRecord {
    /// Empty record for `slug` in `locale` with every attribute at its default
    pub fn new(slug: impl Into<String>, locale: Locale, title: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            url: property_url(locale, &slug),
            slug,
            locale,
            title: title.into(),
            description: None,
            body: None,
            price_thb: 0,
            kind: PropertyType::default(),
            listing: Listing::default(),
            status: Status::default(),
            furnishing: Furnishing::default(),
            bedrooms: 0,
            bathrooms: 0,
            living_sqm: None,
            land_sqm: None,
            floor: None,
            year_built: None,
            location: default_location(),
            district: None,
            lat: None,
            lng: None,
            ownership: default_ownership(),
            project: None,
            cover: None,
            images: Vec::new(),
            video_url: None,
            features: Vec::new(),
            amenities: Vec::new(),
            parking: None,
            fees_hoa_thb: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.slug.trim().is_empty() {
            return Err(ValidationError::MissingSlug);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        Ok(())
    }

    /// File name the record is stored under, e.g. `villa-x.de.json`
    pub fn file_name(&self) -> String {
        format!("{}.{}.json", self.slug, self.locale)
    }

    pub fn has_media(&self) -> bool {
        self.cover.as_deref().map_or(false, |c| !c.is_empty()) || !self.images.is_empty()
    }
}
