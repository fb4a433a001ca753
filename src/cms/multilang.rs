use crate::cms::clock::{Clock, SystemClock};
use crate::cms::content::{
    matches_query, ContentData, ContentType, Metadata, MetadataInput, MetadataUpdate, PropertyData,
};
use crate::cms::store::unique_id;
use crate::cms::CmsError;
use crate::models::{Locale, PropertyType};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Text of an entry in one locale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Translation {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default)]
pub struct NewTranslation {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub metadata: MetadataInput,
}

/// Fields to overwrite; when the translation does not exist yet, missing text fields start empty
#[derive(Debug, Clone, Default)]
pub struct TranslationUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub metadata: MetadataUpdate,
}

/// One entry with a translation per locale and locale-independent data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedContent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub base_slug: String,
    pub translations: BTreeMap<Locale, Translation>,
    pub shared_data: Option<ContentData>,
}

impl TranslatedContent {
    /// Most recent edit across all translations
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.translations.values().map(|t| t.metadata.updated_at).max()
    }

    /// Missing translations always need work; existing ones when another locale was edited later
    pub fn needs_update(&self, locale: Locale) -> bool {
        match (self.translations.get(&locale), self.last_updated()) {
            (Some(translation), Some(latest)) => translation.metadata.updated_at < latest,
            _ => true,
        }
    }
}

/// Per-locale overview shown in the editor
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStatus {
    pub locale: Locale,
    pub exists: bool,
    pub published: bool,
    pub last_modified: Option<DateTime<Utc>>,
    pub needs_update: bool,
}

/// Entry together with the locales that need attention
#[derive(Debug, Clone)]
pub struct TranslationGap<'a> {
    pub content: &'a TranslatedContent,
    pub locales: Vec<Locale>,
}

/// Keyed store of multi-locale entries
pub struct TranslationStore {
    entries: BTreeMap<String, TranslatedContent>,
    clock: Arc<dyn Clock>,
}

impl Default for TranslationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: BTreeMap::new(),
            clock,
        }
    }

    pub fn supported_locales(&self) -> &'static [Locale] {
        &Locale::ALL
    }

    /// Store preloaded with the demo villa; the Thai text is still unpublished
    pub fn with_sample_data() -> Self {
        let seeded = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_default();
        let translation = |title: &str, slug: &str, content: &str, description: &str, tags: [&str; 3], published| {
            Translation {
                title: title.to_string(),
                slug: slug.to_string(),
                content: content.to_string(),
                metadata: Metadata {
                    description: Some(description.to_string()),
                    image: Some("/images/park-villa.jpg".to_string()),
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                    published,
                    created_at: seeded,
                    updated_at: seeded,
                },
            }
        };

        let mut translations = BTreeMap::new();
        translations.insert(
            Locale::De,
            translation(
                "Park Villa mit Privatpool",
                "park-villa-privatpool",
                "Luxuriöse Villa mit eigenem Pool in ruhiger Lage.",
                "Traumhafte Villa mit Privatpool in Pattaya",
                ["villa", "pool", "luxus"],
                true,
            ),
        );
        translations.insert(
            Locale::En,
            translation(
                "Park Villa with Private Pool",
                "park-villa-private-pool",
                "Luxurious villa with private pool in quiet location.",
                "Dream villa with private pool in Pattaya",
                ["villa", "pool", "luxury"],
                true,
            ),
        );
        translations.insert(
            Locale::Th,
            translation(
                "วิลล่าพาร์คพร้อมสระว่ายน้ำส่วนตัว",
                "park-villa-private-pool-th",
                "วิลล่าหรูหราพร้อมสระว่ายน้ำส่วนตัวในทำเลเงียบสงบ",
                "วิลล่าฝันพร้อมสระว่ายน้ำส่วนตัวในพัทยา",
                ["วิลล่า", "สระว่ายน้ำ", "หรูหรา"],
                false,
            ),
        );

        let sample = TranslatedContent {
            id: "property-park-villa-1".to_string(),
            kind: ContentType::Property,
            base_slug: "park-villa-privatpool".to_string(),
            translations,
            shared_data: Some(ContentData::Property(PropertyData {
                price_thb: 15_000_000,
                bedrooms: 4,
                bathrooms: 3,
                living_sqm: Some(250.0),
                land_sqm: Some(800.0),
                kind: PropertyType::Villa,
                location: "Pattaya".to_string(),
                features: vec!["Privatpool".to_string(), "Garten".to_string(), "Parkplatz".to_string()],
                amenities: vec!["AC".to_string(), "Internet".to_string(), "Sicherheit".to_string()],
                images: vec!["/images/park-villa-1.jpg".to_string(), "/images/park-villa-2.jpg".to_string()],
            })),
        };

        let mut store = Self::new();
        store.entries.insert(sample.id.clone(), sample);
        store
    }

    /// Entries of one type that have a translation in `locale`, optionally with an exact slug
    pub fn get_content(&self, kind: ContentType, locale: Locale, slug: Option<&str>) -> Vec<&TranslatedContent> {
        self.entries
            .values()
            .filter(|c| c.kind == kind)
            .filter(|c| {
                c.translations
                    .get(&locale)
                    .map_or(false, |t| slug.map_or(true, |s| t.slug == s))
            })
            .collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&TranslatedContent> {
        self.entries.get(id)
    }

    pub fn create_content(
        &mut self,
        kind: ContentType,
        base_slug: &str,
        translations: BTreeMap<Locale, NewTranslation>,
        shared_data: Option<ContentData>,
    ) -> Result<TranslatedContent, CmsError> {
        if let Some(found) = shared_data.as_ref().map(ContentData::kind).filter(|k| *k != kind) {
            return Err(CmsError::KindMismatch { expected: kind, found });
        }

        let now = self.clock.now();
        let base = format!("{}-{}-{}", kind, base_slug, now.timestamp_millis());
        let id = unique_id(base, |candidate| self.entries.contains_key(candidate));

        let translations = translations
            .into_iter()
            .map(|(locale, t)| {
                let translation = Translation {
                    title: t.title,
                    slug: t.slug,
                    content: t.content,
                    metadata: Metadata::stamp(t.metadata, now),
                };
                (locale, translation)
            })
            .collect();

        let content = TranslatedContent {
            id: id.clone(),
            kind,
            base_slug: base_slug.to_string(),
            translations,
            shared_data,
        };
        debug!("Created multi-locale content {}", id);
        self.entries.insert(id, content.clone());
        Ok(content)
    }

    /// Update the translation in `locale`, creating it when missing; `None` for an unknown id
    pub fn update_translation(
        &mut self,
        id: &str,
        locale: Locale,
        update: TranslationUpdate,
    ) -> Option<TranslatedContent> {
        let now = self.clock.now();
        let content = self.entries.get_mut(id)?;

        match content.translations.get_mut(&locale) {
            Some(existing) => {
                if let Some(title) = update.title {
                    existing.title = title;
                }
                if let Some(slug) = update.slug {
                    existing.slug = slug;
                }
                if let Some(body) = update.content {
                    existing.content = body;
                }
                existing.metadata.merge(update.metadata, now);
            }
            None => {
                let metadata = Metadata::stamp(
                    MetadataInput {
                        description: update.metadata.description,
                        image: update.metadata.image,
                        tags: update.metadata.tags.unwrap_or_default(),
                        published: update.metadata.published,
                        created_at: None,
                    },
                    now,
                );
                content.translations.insert(
                    locale,
                    Translation {
                        title: update.title.unwrap_or_default(),
                        slug: update.slug.unwrap_or_default(),
                        content: update.content.unwrap_or_default(),
                        metadata,
                    },
                );
            }
        }
        Some(content.clone())
    }

    pub fn delete_content(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Remove one locale; `false` when the entry or the translation does not exist
    pub fn delete_translation(&mut self, id: &str, locale: Locale) -> bool {
        self.entries
            .get_mut(id)
            .map_or(false, |c| c.translations.remove(&locale).is_some())
    }

    /// Seed `target` from `source` as an unpublished draft with a locale-suffixed slug
    pub fn copy_translation(&mut self, id: &str, source: Locale, target: Locale) -> Option<TranslatedContent> {
        let now = self.clock.now();
        let content = self.entries.get_mut(id)?;
        let original = content.translations.get(&source)?.clone();

        let mut copy = original;
        copy.slug = format!("{}-{}", copy.slug, target);
        copy.metadata.published = false;
        copy.metadata.created_at = now;
        copy.metadata.updated_at = now;

        content.translations.insert(target, copy);
        Some(content.clone())
    }

    /// Entries with a translation matching `query`; each entry appears once
    pub fn search_content(
        &self,
        query: &str,
        locale: Option<Locale>,
        kind: Option<ContentType>,
    ) -> Vec<&TranslatedContent> {
        let needle = query.to_lowercase();
        self.entries
            .values()
            .filter(|c| kind.map_or(true, |k| c.kind == k))
            .filter(|c| {
                c.translations
                    .iter()
                    .filter(|(l, _)| locale.map_or(true, |wanted| **l == wanted))
                    .any(|(_, t)| matches_query(&needle, &t.title, &t.content, t.metadata.description.as_deref()))
            })
            .collect()
    }

    /// Status of every supported locale; empty for an unknown id
    pub fn translation_status(&self, id: &str) -> Vec<TranslationStatus> {
        let Some(content) = self.entries.get(id) else {
            return Vec::new();
        };

        self.supported_locales()
            .iter()
            .map(|&locale| {
                let translation = content.translations.get(&locale);
                TranslationStatus {
                    locale,
                    exists: translation.is_some(),
                    published: translation.map_or(false, |t| t.metadata.published),
                    last_modified: translation.map(|t| t.metadata.updated_at),
                    needs_update: content.needs_update(locale),
                }
            })
            .collect()
    }

    /// Entries lacking a translation in at least one supported locale
    pub fn missing_translations(&self) -> Vec<TranslationGap<'_>> {
        self.gaps(|content, locale| !content.translations.contains_key(&locale))
    }

    /// Entries with missing or stale translations
    pub fn outdated_translations(&self) -> Vec<TranslationGap<'_>> {
        self.gaps(|content, locale| content.needs_update(locale))
    }

    fn gaps(&self, flagged: impl Fn(&TranslatedContent, Locale) -> bool) -> Vec<TranslationGap<'_>> {
        self.entries
            .values()
            .filter_map(|content| {
                let locales: Vec<Locale> = self
                    .supported_locales()
                    .iter()
                    .copied()
                    .filter(|&l| flagged(content, l))
                    .collect();
                if locales.is_empty() {
                    None
                } else {
                    Some(TranslationGap { content, locales })
                }
            })
            .collect()
    }
}
