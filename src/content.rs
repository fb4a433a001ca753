//! Reading generated property records back, the way the site's listing pages do.

use crate::models::{Locale, PropertyRecord};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

/// All records of one locale, sorted by title then slug for stable output.
/// Files that fail to parse are skipped with a warning.
pub async fn load_properties(dir: &Path, locale: Locale) -> Result<Vec<PropertyRecord>> {
    let suffix = format!(".{}.json", locale);
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut records = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(&suffix))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let parsed = tokio::fs::read_to_string(&path)
            .await
            .map_err(anyhow::Error::from)
            .and_then(|json| serde_json::from_str::<PropertyRecord>(&json).map_err(anyhow::Error::from));
        match parsed {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    records.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.slug.cmp(&b.slug)));
    Ok(records)
}

pub async fn load_property_by_slug(dir: &Path, locale: Locale, slug: &str) -> Result<Option<PropertyRecord>> {
    Ok(load_properties(dir, locale)
        .await?
        .into_iter()
        .find(|record| record.slug == slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, slug: &str, locale: Locale, title: &str) {
        let record = PropertyRecord::new(slug, locale, title);
        fs::write(dir.join(record.file_name()), serde_json::to_string(&record).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn loads_one_locale_sorted_by_title() -> Result<()> {
        let tmp = TempDir::new()?;
        let dir = tmp.path();
        write(dir, "b", Locale::En, "Beach Condo");
        write(dir, "a", Locale::En, "Aqua Villa");
        write(dir, "a", Locale::De, "Aqua Villa DE");
        fs::write(dir.join("broken.en.json"), "{")?;

        let records = load_properties(dir, Locale::En).await?;
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Aqua Villa", "Beach Condo"]);

        let found = load_property_by_slug(dir, Locale::De, "a").await?;
        assert_eq!(found.map(|r| r.title), Some("Aqua Villa DE".to_string()));
        assert!(load_property_by_slug(dir, Locale::Th, "a").await?.is_none());
        Ok(())
    }
}
