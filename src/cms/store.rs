use crate::cms::clock::{Clock, SystemClock};
use crate::cms::content::{
    matches_query, Content, ContentData, ContentType, ContentUpdate, Metadata, NewContent, PropertyData,
};
use crate::models::{Locale, PropertyType};
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Keyed store of single-locale content entries
pub struct ContentStore {
    entries: BTreeMap<String, Content>,
    clock: Arc<dyn Clock>,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: BTreeMap::new(),
            clock,
        }
    }

    /// Store preloaded with the demo listing used by the editor prototype
    pub fn with_sample_data() -> Self {
        let mut store = Self::new();
        let seeded = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_default();
        let sample = Content {
            id: "property-de-park-villa-1".to_string(),
            locale: Locale::De,
            title: "Park Villa mit Privatpool".to_string(),
            slug: "park-villa-privatpool".to_string(),
            content: "Luxuriöse Villa mit eigenem Pool in ruhiger Lage.".to_string(),
            metadata: Metadata {
                description: Some("Traumhafte Villa mit Privatpool in Pattaya".to_string()),
                image: Some("/images/park-villa.jpg".to_string()),
                tags: vec!["villa".to_string(), "pool".to_string(), "luxus".to_string()],
                published: true,
                created_at: seeded,
                updated_at: seeded,
            },
            data: ContentData::Property(PropertyData {
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
            }),
        };
        store.entries.insert(sample.id.clone(), sample);
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one type and locale, optionally narrowed to an exact slug
    pub fn get_content(&self, kind: ContentType, locale: Locale, slug: Option<&str>) -> Vec<&Content> {
        self.entries
            .values()
            .filter(|c| c.kind() == kind && c.locale == locale)
            .filter(|c| slug.map_or(true, |s| c.slug == s))
            .collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Content> {
        self.entries.get(id)
    }

    pub fn create_content(&mut self, input: NewContent) -> Content {
        let now = self.clock.now();
        let base = format!("{}-{}-{}-{}", input.data.kind(), input.locale, input.slug, now.timestamp_millis());
        let id = unique_id(base, |candidate| self.entries.contains_key(candidate));

        let content = Content {
            id: id.clone(),
            locale: input.locale,
            title: input.title,
            slug: input.slug,
            content: input.content,
            metadata: Metadata::stamp(input.metadata, now),
            data: input.data,
        };
        debug!("Created content {}", id);
        self.entries.insert(id, content.clone());
        content
    }

    /// Apply an update; `None` when `id` is unknown
    pub fn update_content(&mut self, id: &str, update: ContentUpdate) -> Option<Content> {
        let now = self.clock.now();
        let existing = self.entries.get_mut(id)?;

        if let Some(locale) = update.locale {
            existing.locale = locale;
        }
        if let Some(title) = update.title {
            existing.title = title;
        }
        if let Some(slug) = update.slug {
            existing.slug = slug;
        }
        if let Some(content) = update.content {
            existing.content = content;
        }
        if let Some(data) = update.data {
            existing.data = data;
        }
        existing.metadata.merge(update.metadata, now);
        Some(existing.clone())
    }

    pub fn delete_content(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Case-insensitive search over title, body and description
    pub fn search_content(&self, query: &str, locale: Option<Locale>) -> Vec<&Content> {
        let needle = query.to_lowercase();
        self.entries
            .values()
            .filter(|c| locale.map_or(true, |l| c.locale == l))
            .filter(|c| matches_query(&needle, &c.title, &c.content, c.metadata.description.as_deref()))
            .collect()
    }
}

/// `base`, or `base-N` for the first N that is still free
pub(crate) fn unique_id(base: String, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::clock::ManualClock;
    use crate::cms::content::{DistrictData, MetadataInput, MetadataUpdate, PageData, PageTemplate};
    use chrono::Duration;

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn page(locale: Locale, slug: &str, title: &str) -> NewContent {
        NewContent {
            locale,
            title: title.to_string(),
            slug: slug.to_string(),
            content: format!("{} body", title),
            metadata: MetadataInput::default(),
            data: ContentData::Page(PageData {
                template: PageTemplate::About,
                sections: vec![],
            }),
        }
    }

    #[test]
    fn create_assigns_id_and_timestamps() {
        let clock = Arc::new(ManualClock::new(start()));
        let mut store = ContentStore::with_clock(clock.clone());

        let created = store.create_content(page(Locale::De, "ueber-uns", "Über uns"));
        assert_eq!(created.id, format!("page-de-ueber-uns-{}", start().timestamp_millis()));
        assert!(created.metadata.published);
        assert_eq!(created.metadata.created_at, start());
        assert_eq!(created.metadata.updated_at, start());

        let again = store.create_content(page(Locale::De, "ueber-uns", "Über uns"));
        assert_eq!(again.id, format!("{}-2", created.id));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn keeps_supplied_created_at_and_published_flag() {
        let mut store = ContentStore::with_clock(Arc::new(ManualClock::new(start())));
        let earlier = start() - Duration::days(30);
        let mut input = page(Locale::En, "about", "About");
        input.metadata.created_at = Some(earlier);
        input.metadata.published = Some(false);

        let created = store.create_content(input);
        assert_eq!(created.metadata.created_at, earlier);
        assert_eq!(created.metadata.updated_at, start());
        assert!(!created.metadata.published);
    }

    #[test]
    fn filters_by_type_locale_and_slug() {
        let mut store = ContentStore::new();
        store.create_content(page(Locale::De, "a", "A"));
        store.create_content(page(Locale::En, "a", "A"));
        store.create_content(NewContent {
            data: ContentData::District(DistrictData::default()),
            ..page(Locale::De, "jomtien", "Jomtien")
        });

        assert_eq!(store.get_content(ContentType::Page, Locale::De, None).len(), 1);
        assert_eq!(store.get_content(ContentType::District, Locale::De, Some("jomtien")).len(), 1);
        assert!(store.get_content(ContentType::District, Locale::De, Some("pratumnak")).is_empty());
        assert!(store.get_content(ContentType::Property, Locale::En, None).is_empty());
    }

    #[test]
    fn update_merges_metadata_and_refreshes_timestamp() {
        let clock = Arc::new(ManualClock::new(start()));
        let mut store = ContentStore::with_clock(clock.clone());
        let created = store.create_content(NewContent {
            metadata: MetadataInput {
                description: Some("Team page".to_string()),
                ..Default::default()
            },
            ..page(Locale::En, "about", "About")
        });

        clock.advance(Duration::minutes(5));
        let updated = store
            .update_content(
                &created.id,
                ContentUpdate {
                    title: Some("About us".to_string()),
                    metadata: MetadataUpdate {
                        tags: Some(vec!["team".to_string()]),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "About us");
        assert_eq!(updated.slug, "about");
        assert_eq!(updated.metadata.description.as_deref(), Some("Team page"));
        assert_eq!(updated.metadata.tags, vec!["team"]);
        assert_eq!(updated.metadata.created_at, start());
        assert_eq!(updated.metadata.updated_at, start() + Duration::minutes(5));
        assert_eq!(store.get_by_id(&created.id), Some(&updated));

        assert!(store.update_content("nope", ContentUpdate::default()).is_none());
    }

    #[test]
    fn delete_reports_whether_entry_existed() {
        let mut store = ContentStore::new();
        let created = store.create_content(page(Locale::Th, "x", "X"));
        assert!(store.delete_content(&created.id));
        assert!(!store.delete_content(&created.id));
        assert!(store.is_empty());
    }

    #[test]
    fn searches_title_body_and_description() {
        let store = ContentStore::with_sample_data();
        assert_eq!(store.search_content("PRIVATPOOL", None).len(), 1);
        assert_eq!(store.search_content("ruhiger lage", Some(Locale::De)).len(), 1);
        assert_eq!(store.search_content("traumhafte", None).len(), 1);
        assert!(store.search_content("villa", Some(Locale::En)).is_empty());

        let sample = store.get_by_id("property-de-park-villa-1").unwrap();
        assert_eq!(sample.kind(), ContentType::Property);
    }
}
