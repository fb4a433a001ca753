use crate::config::Config;
use crate::importers::traits::Importer;
use crate::importers::types::{FileIssue, RefreshSummary};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Marker of the placeholder images the migrator falls back to
const SAMPLE_IMAGE_MARKER: &str = "/images/sample/";

const VILLA: [&str; 3] = [
    "https://images.unsplash.com/photo-1613490493576-7fde63acd811?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1600596542815-ffad4c1539a9?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1600607687939-ce8a6c25118c?w=800&h=600&fit=crop&crop=center",
];

const HOUSE: [&str; 3] = [
    "https://images.unsplash.com/photo-1600607687644-c7171b42498b?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1600585154340-be6161a56a0c?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1600566753190-17f0baa2a6c3?w=800&h=600&fit=crop&crop=center",
];

const CONDO: [&str; 3] = [
    "https://images.unsplash.com/photo-1545324418-cc1a3fa10c00?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?w=800&h=600&fit=crop&crop=center",
];

const APARTMENT: [&str; 3] = [
    "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?w=800&h=600&fit=crop&crop=center",
];

const STUDIO: [&str; 3] = [
    "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?w=800&h=600&fit=crop&crop=center",
];

const FALLBACK: [&str; 3] = [
    "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=800&h=600&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1544984243-ec57ea16fe25?w=800&h=500&fit=crop&crop=center",
    "https://images.unsplash.com/photo-1570129477492-45c003edd2be?w=800&h=500&fit=crop&crop=center",
];

/// Stock gallery for a property type; townhouses share the house set, penthouses the condo set
pub fn stock_gallery(kind: &str) -> &'static [&'static str; 3] {
    match kind {
        "villa" => &VILLA,
        "house" | "townhouse" => &HOUSE,
        "condo" | "penthouse" => &CONDO,
        "apartment" => &APARTMENT,
        "studio" => &STUDIO,
        _ => &FALLBACK,
    }
}

/// Replaces placeholder sample images in generated property records with stock photos
pub struct ImageRefresher {
    properties_dir: PathBuf,
}

impl ImageRefresher {
    pub fn new(properties_dir: impl Into<PathBuf>) -> Self {
        Self {
            properties_dir: properties_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.properties_dir)
    }

    async fn record_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.properties_dir)
            .await
            .with_context(|| format!("Failed to list {}", self.properties_dir.display()))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Rewrite one record; `false` when it has no placeholder images
    async fn refresh_file(&self, path: &Path) -> Result<bool> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if !content.contains(SAMPLE_IMAGE_MARKER) {
            return Ok(false);
        }

        let mut record: Value =
            serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))?;
        let object = record
            .as_object_mut()
            .with_context(|| format!("{} is not a JSON object", path.display()))?;

        let kind = object.get("type").and_then(Value::as_str).unwrap_or("apartment");
        let gallery = stock_gallery(kind);
        object.insert("cover".to_string(), json!(gallery[0]));
        object.insert("images".to_string(), json!(gallery));

        tokio::fs::write(path, serde_json::to_string_pretty(&record)?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(true)
    }
}

#[async_trait]
impl Importer for ImageRefresher {
    type Summary = RefreshSummary;

    async fn run(&self) -> Result<RefreshSummary> {
        info!("🔄 Updating property images in {}", self.properties_dir.display());

        let mut summary = RefreshSummary::default();
        for path in self.record_files().await? {
            match self.refresh_file(&path).await {
                Ok(true) => {
                    debug!("Updated {}", path.display());
                    summary.updated += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("{:#}", e);
                    summary.errors.push(FileIssue {
                        file: path.display().to_string(),
                        message: format!("{:#}", e),
                    });
                }
            }
        }

        info!("✅ Updated {} files, {} errors", summary.updated, summary.errors.len());
        Ok(summary)
    }

    fn source_name(&self) -> &'static str {
        "property images"
    }
}
