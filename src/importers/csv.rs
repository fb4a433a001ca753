use crate::config::Config;
use crate::importers::traits::Importer;
use crate::importers::types::{ImportSummary, RowIssue};
use crate::models::{Locale, PropertyRecord};
use crate::normalize::{
    norm_furnishing, norm_listing, norm_status, norm_type, slugify, to_count, to_int, to_list, to_num,
    to_text,
};
use ::csv::{ReaderBuilder, StringRecord, Trim};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Bedroom count assumed when the sheet leaves the cell empty
const DEFAULT_BEDROOMS: u32 = 1;

/// Locale order used to pick the title a missing slug is derived from
const SLUG_TITLE_PRIORITY: [Locale; 3] = [Locale::En, Locale::De, Locale::Th];

/// Imports a property spreadsheet into one JSON record per (property, locale)
pub struct CsvImporter {
    csv_path: PathBuf,
    out_dir: PathBuf,
}

/// One data row with header-based access
struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Cell value, empty when the column or cell is missing
    fn get(&self, column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|&idx| self.record.get(idx))
            .map(str::trim)
            .unwrap_or("")
    }

    fn localized(&self, prefix: &str, locale: Locale) -> &'a str {
        self.get(&format!("{}_{}", prefix, locale))
    }

    /// First non-empty localized value along the locale's fallback chain
    fn localized_with_fallback(&self, prefix: &str, locale: Locale) -> Option<&'a str> {
        locale
            .fallback_chain()
            .into_iter()
            .map(|l| self.localized(prefix, l))
            .find(|v| !v.is_empty())
    }
}

/// Records and problems produced by a single row
#[derive(Debug, Default)]
struct RowOutcome {
    records: Vec<PropertyRecord>,
    errors: Vec<RowIssue>,
    warnings: Vec<RowIssue>,
}

impl CsvImporter {
    pub fn new(csv_path: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            out_dir: out_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.csv_path, &config.properties_dir)
    }

    /// Turn one row into its localized records
    fn build_row(&self, row_number: usize, row: &Row<'_>) -> RowOutcome {
        let mut outcome = RowOutcome::default();

        let slug = match row.get("slug") {
            "" => SLUG_TITLE_PRIORITY
                .iter()
                .map(|&l| row.localized("title", l))
                .find(|t| !t.is_empty())
                .map(slugify),
            explicit => Some(slugify(explicit)),
        };

        let Some(slug) = slug else {
            for locale in Locale::ALL {
                outcome.errors.push(RowIssue::new(
                    row_number,
                    None,
                    Some(locale),
                    "missing slug: no slug column value and no title to derive one from",
                ));
            }
            return outcome;
        };

        let mut note = |message: String| {
            outcome
                .warnings
                .push(RowIssue::new(row_number, Some(&slug), None, message));
        };

        let kind = norm_type(row.get("type"));
        let listing = norm_listing(row.get("for"));
        let status = norm_status(row.get("status"));
        let furnishing = norm_furnishing(row.get("furnishing"));
        for (column, raw, fallback) in [
            ("type", &kind.unrecognized, "condo"),
            ("for", &listing.unrecognized, "sale"),
            ("status", &status.unrecognized, "available"),
            ("furnishing", &furnishing.unrecognized, "furnished"),
        ] {
            if let Some(raw) = raw {
                note(format!("unrecognized {} '{}', using '{}'", column, raw, fallback));
            }
        }

        let price = to_num(row.get("price_thb")).map(|p| whole_baht("price_thb", p, &mut note));
        let fees = to_num(row.get("fees_hoa_thb")).map(|f| whole_baht("fees_hoa_thb", f, &mut note));

        let images = to_list(row.get("images"));
        let cover = to_text(row.get("cover")).or_else(|| images.first().cloned());

        let mut shared = PropertyRecord::new(slug.clone(), Locale::De, "");
        shared.price_thb = price.unwrap_or(0);
        shared.kind = kind.value;
        shared.listing = listing.value;
        shared.status = status.value;
        shared.furnishing = furnishing.value;
        shared.bedrooms = to_count(row.get("bedrooms")).unwrap_or(DEFAULT_BEDROOMS);
        shared.bathrooms = to_count(row.get("bathrooms")).unwrap_or(0);
        shared.living_sqm = to_num(row.get("living_sqm"));
        shared.land_sqm = to_num(row.get("land_sqm"));
        shared.floor = to_int(row.get("floor"));
        shared.year_built = to_int(row.get("year_built"));
        shared.lat = to_num(row.get("lat"));
        shared.lng = to_num(row.get("lng"));
        if let Some(location) = to_text(row.get("location")) {
            shared.location = location;
        }
        shared.district = to_text(row.get("district"));
        if let Some(ownership) = to_text(row.get("ownership")) {
            shared.ownership = ownership;
        }
        shared.project = to_text(row.get("project"));
        shared.cover = cover;
        shared.images = images;
        if !shared.has_media() {
            note("no cover and no images".to_string());
        }
        shared.video_url = to_text(row.get("video_url"));
        shared.features = to_list(row.get("features"));
        shared.amenities = to_list(row.get("amenities"));
        shared.parking = to_text(row.get("parking"));
        shared.fees_hoa_thb = fees;

        for locale in Locale::ALL {
            let title = row.localized_with_fallback("title", locale).unwrap_or("");
            let description = row.localized_with_fallback("description", locale);

            let mut record = shared.clone();
            record.locale = locale;
            record.url = crate::models::property_url(locale, &slug);
            record.title = title.to_string();
            record.description = description.or(Some(title)).filter(|d| !d.is_empty()).map(str::to_string);
            record.body = Some(description.unwrap_or("").to_string());

            match record.validate() {
                Ok(()) => outcome.records.push(record),
                Err(e) => outcome
                    .errors
                    .push(RowIssue::new(row_number, Some(&slug), Some(locale), e.to_string())),
            }
        }

        outcome
    }

    async fn write_record(&self, record: &PropertyRecord) -> Result<PathBuf> {
        let path = self.out_dir.join(record.file_name());
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Parse spreadsheet content and write the resulting records
    pub async fn import_str(&self, content: &str) -> Result<ImportSummary> {
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", self.out_dir.display()))?;

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

        let headers = reader.headers().context("Failed to read CSV headers")?.clone();
        let columns: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_lowercase(), idx))
            .collect();
        debug!("CSV columns: {:?}", headers);

        let mut summary = ImportSummary::default();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (idx, result) in reader.records().enumerate() {
            let row_number = idx + 1;

            let record = match result {
                Ok(record) if record.iter().all(|cell| cell.trim().is_empty()) => continue,
                Ok(record) => record,
                Err(e) => {
                    summary.rows += 1;
                    warn!("Skipping unreadable row {}: {}", row_number, e);
                    summary
                        .errors
                        .push(RowIssue::new(row_number, None, None, format!("unreadable row: {}", e)));
                    continue;
                }
            };

            summary.rows += 1;

            let row = Row { columns: &columns, record: &record };
            let outcome = self.build_row(row_number, &row);
            summary.errors.extend(outcome.errors);
            summary.warnings.extend(outcome.warnings);

            if let Some(first) = outcome.records.first() {
                if let Some(previous) = seen.insert(first.slug.clone(), row_number) {
                    summary.warnings.push(RowIssue::new(
                        row_number,
                        Some(&first.slug),
                        None,
                        format!("slug already used by row {}, records overwritten", previous),
                    ));
                }
            }

            for record in &outcome.records {
                match self.write_record(record).await {
                    Ok(path) => {
                        debug!("Wrote {}", path.display());
                        summary.created += 1;
                    }
                    Err(e) => {
                        warn!("{:#}", e);
                        summary.errors.push(RowIssue::new(
                            row_number,
                            Some(&record.slug),
                            Some(record.locale),
                            format!("{:#}", e),
                        ));
                    }
                }
            }
        }

        Ok(summary)
    }
}

/// Amounts are stored as whole baht; negative values clamp to 0 and fractions round
fn whole_baht(column: &str, value: f64, note: &mut impl FnMut(String)) -> u64 {
    if value < 0.0 {
        note(format!("negative {} {} clamped to 0", column, value));
        return 0;
    }
    let rounded = value.round();
    if rounded != value {
        note(format!("fractional {} {} rounded to {}", column, value, rounded));
    }
    rounded as u64
}

#[async_trait]
impl Importer for CsvImporter {
    type Summary = ImportSummary;

    async fn run(&self) -> Result<ImportSummary> {
        info!("Importing properties from {}", self.csv_path.display());

        let bytes = tokio::fs::read(&self.csv_path)
            .await
            .with_context(|| format!("Failed to read {}", self.csv_path.display()))?;
        let content = String::from_utf8_lossy(&bytes);

        let summary = self.import_str(&content).await?;

        info!(
            "✅ {} rows, {} records written, {} errors, {} warnings",
            summary.rows,
            summary.created,
            summary.errors.len(),
            summary.warnings.len()
        );
        Ok(summary)
    }

    fn source_name(&self) -> &'static str {
        "CSV"
    }
}
