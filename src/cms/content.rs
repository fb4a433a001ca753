use crate::models::{Locale, PropertyType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Property,
    Page,
    District,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Property => "property",
            ContentType::Page => "page",
            ContentType::District => "district",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing attributes shown next to the editorial text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyData {
    pub price_thb: u64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub living_sqm: Option<f64>,
    pub land_sqm: Option<f64>,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub location: String,
    pub features: Vec<String>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageTemplate {
    About,
    Services,
    Contact,
    Legal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Text,
    Image,
    Hero,
    Cards,
}

/// Building block of a static page; the payload shape depends on the section kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageSection {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub content: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageData {
    pub template: PageTemplate,
    pub sections: Vec<PageSection>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DistrictData {
    pub location: GeoPoint,
    /// Ids of listings located in the district
    pub properties: Vec<String>,
    pub features: Vec<String>,
    pub images: Vec<String>,
}

/// Type-specific payload; its variant is the content type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ContentData {
    Property(PropertyData),
    Page(PageData),
    District(DistrictData),
}

impl ContentData {
    pub fn kind(&self) -> ContentType {
        match self {
            ContentData::Property(_) => ContentType::Property,
            ContentData::Page(_) => ContentType::Page,
            ContentData::District(_) => ContentType::District,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub description: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata supplied on creation; timestamps and publication state are filled in
#[derive(Debug, Clone, Default)]
pub struct MetadataInput {
    pub description: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<String>,
    /// Defaults to published
    pub published: Option<bool>,
    /// Kept when importing existing content, otherwise now
    pub created_at: Option<DateTime<Utc>>,
}

/// Metadata fields to overwrite; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct MetadataUpdate {
    pub description: Option<String>,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

impl Metadata {
    pub fn stamp(input: MetadataInput, now: DateTime<Utc>) -> Self {
        Self {
            description: input.description,
            image: input.image,
            tags: input.tags,
            published: input.published.unwrap_or(true),
            created_at: input.created_at.unwrap_or(now),
            updated_at: now,
        }
    }

    pub fn merge(&mut self, update: MetadataUpdate, now: DateTime<Utc>) {
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(published) = update.published {
            self.published = published;
        }
        self.updated_at = now;
    }
}

/// One piece of content in one locale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub id: String,
    pub locale: Locale,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub metadata: Metadata,
    #[serde(flatten)]
    pub data: ContentData,
}

impl Content {
    pub fn kind(&self) -> ContentType {
        self.data.kind()
    }
}

#[derive(Debug, Clone)]
pub struct NewContent {
    pub locale: Locale,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub metadata: MetadataInput,
    pub data: ContentData,
}

/// Fields to overwrite on an existing entry
#[derive(Debug, Clone, Default)]
pub struct ContentUpdate {
    pub locale: Option<Locale>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub metadata: MetadataUpdate,
    pub data: Option<ContentData>,
}

/// Case-insensitive substring match over the searchable text fields
pub(crate) fn matches_query(needle: &str, title: &str, body: &str, description: Option<&str>) -> bool {
    title.to_lowercase().contains(needle)
        || body.to_lowercase().contains(needle)
        || description.map_or(false, |d| d.to_lowercase().contains(needle))
}
