use crate::config::Config;
use crate::importers::classify::HeuristicClassifier;
use crate::importers::extract::{
    bedrooms_from_text, district_from_text, living_sqm_from_text, locale_from_file_name, price_from_text,
    type_from_text,
};
use crate::importers::markdown::MarkdownConverter;
use crate::importers::traits::{Importer, PropertyClassifier};
use crate::importers::types::{FileIssue, MigrationSummary, PageFeatures};
use crate::models::{DocumentKind, Locale, PageDocument, PropertyRecord};
use crate::normalize::slugify_truncated;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Title used when a page has no `<title>`
const FALLBACK_TITLE: &str = "Page";

/// Longest title prefix that goes into a slug
const SLUG_SOURCE_LIMIT: usize = 80;

/// Default bedroom count for listings that never mention one
const DEFAULT_BEDROOMS: u32 = 1;

/// Migrates a legacy HTML site into property records and markdown pages
pub struct ArchiveMigrator {
    config: Config,
    classifier: Box<dyn PropertyClassifier>,
}

/// Everything the migrator needs from a parsed page before touching the filesystem
#[derive(Debug, Clone)]
struct PageScan {
    title: String,
    /// `src` of each image in the main region, in document order
    image_sources: Vec<String>,
    features: PageFeatures,
}

/// State shared by all files of one migration run
#[derive(Debug, Default)]
struct RunState {
    /// Canonical archive root; images outside it are never copied
    archive_root: PathBuf,
    /// Output files written so far
    claimed: HashSet<PathBuf>,
}

impl RunState {
    /// First of `slug`, `slug-2`, `slug-3`, ... whose output file in `dir` is still free
    fn claim_slug(&mut self, dir: &Path, slug: &str, extension: &str, locale: Locale) -> String {
        let mut candidate = slug.to_string();
        let mut n = 2;
        while !self.claimed.insert(dir.join(format!("{}.{}.{}", candidate, locale, extension))) {
            candidate = format!("{}-{}", slug, n);
            n += 1;
        }
        candidate
    }
}

impl ArchiveMigrator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            classifier: Box::new(HeuristicClassifier::default()),
        }
    }

    /// Use a different listing detector
    pub fn with_classifier(mut self, classifier: impl PropertyClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// All `.html` / `.htm` files below the source directory, sorted by path
    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let root = &self.config.html_dir;
        if !root.is_dir() {
            anyhow::bail!("HTML archive directory not found: {}", root.display());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_html = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
                .unwrap_or(false);
            if is_html {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    async fn ensure_output_dirs(&self) -> Result<()> {
        for dir in [
            &self.config.image_dir,
            &self.config.pages_dir,
            &self.config.districts_dir,
            &self.config.properties_dir,
        ] {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    /// Resolve an image reference to a path below the archive, `None` for remote or inline images
    fn local_image_path(&self, page: &Path, src: &str) -> Option<PathBuf> {
        let lower = src.to_lowercase();
        if lower.starts_with("http://")
            || lower.starts_with("https://")
            || lower.starts_with("//")
            || lower.starts_with("data:")
        {
            return None;
        }
        let clean = src.split(|c: char| c == '?' || c == '#').next().unwrap_or(src);
        if clean.is_empty() {
            return None;
        }
        let path = match clean.strip_prefix('/') {
            Some(rooted) => self.config.html_dir.join(rooted),
            None => page.parent().unwrap_or(Path::new(".")).join(clean),
        };
        Some(path)
    }

    /// Copy an image into the public image directory as `{stamp}-{name}`,
    /// inserting a counter when that name is taken
    async fn copy_image(&self, source: &Path, stamp: i64) -> Result<String> {
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .context("Image path has no file name")?;

        let mut out_name = format!("{}-{}", stamp, file_name);
        let mut n = 1;
        while tokio::fs::try_exists(self.config.image_dir.join(&out_name)).await.unwrap_or(false) {
            out_name = format!("{}-{}-{}", stamp, n, file_name);
            n += 1;
        }

        let target = self.config.image_dir.join(&out_name);
        tokio::fs::copy(source, &target)
            .await
            .with_context(|| format!("Failed to copy {} to {}", source.display(), target.display()))?;
        Ok(format!("{}/{}", self.config.image_public_prefix, out_name))
    }

    /// Copy every local image once; returns original `src` → public path
    async fn copy_images(
        &self,
        page: &Path,
        sources: &[String],
        state: &RunState,
        summary: &mut MigrationSummary,
    ) -> HashMap<String, String> {
        let stamp = Utc::now().timestamp_millis();
        let mut rewrites = HashMap::new();
        for src in sources {
            if rewrites.contains_key(src) {
                continue;
            }
            let Some(local) = self.local_image_path(page, src) else {
                continue;
            };
            let Ok(local) = tokio::fs::canonicalize(&local).await else {
                debug!("Image {} not found, keeping reference", local.display());
                continue;
            };
            if !local.starts_with(&state.archive_root) {
                warn!("Image {} lies outside the archive, keeping reference", src);
                continue;
            }
            match self.copy_image(&local, stamp).await {
                Ok(public) => {
                    summary.copied_images += 1;
                    rewrites.insert(src.clone(), public);
                }
                Err(e) => warn!("Skipping image: {:#}", e),
            }
        }
        rewrites
    }

    async fn migrate_file(&self, path: &Path, state: &mut RunState, summary: &mut MigrationSummary) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let html = String::from_utf8_lossy(&bytes).into_owned();

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let locale = locale_from_file_name(file_name);
        let scan = scan_page(&html);

        let rewrites = self.copy_images(path, &scan.image_sources, state, summary).await;
        let images: Vec<String> = scan
            .image_sources
            .iter()
            .map(|src| rewrites.get(src).cloned().unwrap_or_else(|| src.clone()))
            .collect();
        let markdown = render_main(&html, &rewrites);
        let base_slug = slugify_truncated(&scan.title, SLUG_SOURCE_LIMIT);

        if self.classifier.is_property(&scan.features) {
            let slug = state.claim_slug(&self.config.properties_dir, &base_slug, "json", locale);
            note_renamed(path, &base_slug, &slug, summary);
            let record = self.build_property(&scan, locale, slug, images, markdown);
            record
                .validate()
                .with_context(|| format!("Invalid listing in {}", path.display()))?;

            let target = self.config.properties_dir.join(record.file_name());
            let json = serde_json::to_string_pretty(&record)?;
            tokio::fs::write(&target, json)
                .await
                .with_context(|| format!("Failed to write {}", target.display()))?;
            debug!("🏠 {} → {}", path.display(), target.display());
            summary.created_properties += 1;
        } else {
            let kind = match district_from_text(&format!("{} {}", scan.title, markdown)) {
                Some(_) => DocumentKind::District,
                None => DocumentKind::Page,
            };
            let dir = match kind {
                DocumentKind::District => &self.config.districts_dir,
                DocumentKind::Page => &self.config.pages_dir,
            };
            let slug = state.claim_slug(dir, &base_slug, "md", locale);
            note_renamed(path, &base_slug, &slug, summary);

            let document = PageDocument {
                kind,
                title: scan.title.clone(),
                locale,
                slug,
                images,
                body: markdown,
            };
            let target = dir.join(document.file_name());
            tokio::fs::write(&target, document.render())
                .await
                .with_context(|| format!("Failed to write {}", target.display()))?;
            debug!("📄 {} → {}", path.display(), target.display());
            summary.created_pages += 1;
        }
        Ok(())
    }

    fn build_property(
        &self,
        scan: &PageScan,
        locale: Locale,
        slug: String,
        images: Vec<String>,
        markdown: String,
    ) -> PropertyRecord {
        let text = &scan.features.text;
        let district = district_from_text(text);

        let mut record = PropertyRecord::new(slug, locale, scan.title.clone());
        record.price_thb = price_from_text(text).unwrap_or(0);
        record.kind = type_from_text(text);
        record.bedrooms = bedrooms_from_text(text).unwrap_or(DEFAULT_BEDROOMS);
        record.living_sqm = Some(living_sqm_from_text(text).unwrap_or(0.0));
        if let Some(district) = district {
            record.location = district.replace('-', " ");
            record.district = Some(district.to_string());
        }
        record.cover = Some(
            images
                .first()
                .cloned()
                .unwrap_or_else(|| self.config.placeholder_cover.clone()),
        );
        record.images = images;
        record.description = Some(scan.title.clone());
        record.body = Some(markdown);
        record
    }
}

#[async_trait]
impl Importer for ArchiveMigrator {
    type Summary = MigrationSummary;

    async fn run(&self) -> Result<MigrationSummary> {
        info!("Migrating HTML archive from {}", self.config.html_dir.display());

        self.ensure_output_dirs().await?;
        let files = self.collect_files()?;
        info!("Found {} HTML files", files.len());

        let mut state = RunState {
            archive_root: tokio::fs::canonicalize(&self.config.html_dir)
                .await
                .with_context(|| format!("Failed to resolve {}", self.config.html_dir.display()))?,
            ..Default::default()
        };

        let mut summary = MigrationSummary {
            migrated_html_files: files.len(),
            ..Default::default()
        };

        for path in &files {
            if let Err(e) = self.migrate_file(path, &mut state, &mut summary).await {
                warn!("Failed to migrate {}: {:#}", path.display(), e);
                summary.errors.push(FileIssue {
                    file: path.display().to_string(),
                    message: format!("{:#}", e),
                });
            }
        }

        info!(
            "✅ {} pages, {} properties, {} images copied, {} failures",
            summary.created_pages,
            summary.created_properties,
            summary.copied_images,
            summary.errors.len()
        );
        Ok(summary)
    }

    fn source_name(&self) -> &'static str {
        "HTML archive"
    }
}

/// Record that a page was written under a suffixed slug
fn note_renamed(path: &Path, base_slug: &str, slug: &str, summary: &mut MigrationSummary) {
    if slug != base_slug {
        warn!("Slug '{}' already used in this run, writing {} as '{}'", base_slug, path.display(), slug);
        summary.warnings.push(FileIssue {
            file: path.display().to_string(),
            message: format!("slug '{}' already used, written as '{}'", base_slug, slug),
        });
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// `<main>` when present, else `<body>`, else the document root
fn main_region(document: &Html) -> ElementRef<'_> {
    document
        .select(&selector("main"))
        .next()
        .or_else(|| document.select(&selector("body")).next())
        .unwrap_or_else(|| document.root_element())
}

/// Text content without script and style bodies, text nodes joined by spaces
fn visible_text(root: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in root.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| matches!(e.name(), "script" | "style")))
                .unwrap_or(false);
            let trimmed = text.trim();
            if !hidden && !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
        }
    }
    parts.join(" ")
}

fn scan_page(html: &str) -> PageScan {
    let document = Html::parse_document(html);

    let title = document
        .select(&selector("title"))
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let img = selector("img");
    let image_sources = main_region(&document)
        .select(&img)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
        .collect();

    let body = document
        .select(&selector("body"))
        .next()
        .unwrap_or_else(|| document.root_element());

    PageScan {
        title,
        image_sources,
        features: PageFeatures {
            image_count: body.select(&img).count(),
            text: visible_text(body),
        },
    }
}

fn render_main(html: &str, rewrites: &HashMap<String, String>) -> String {
    let document = Html::parse_document(html);
    let rewrite = |src: &str| rewrites.get(src).cloned().unwrap_or_else(|| src.to_string());
    MarkdownConverter::new(&rewrite).convert(main_region(&document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(root: &Path) -> Config {
        Config {
            html_dir: root.join("old_html"),
            properties_dir: root.join("out/properties"),
            pages_dir: root.join("out/pages"),
            districts_dir: root.join("out/districts"),
            image_dir: root.join("public/images/archiv"),
            ..Config::default()
        }
    }

    const LISTING: &str = r#"<html><head><title>Sea View Villa Jomtien</title></head>
<body><nav><img src="/logo.png"></nav><main>
<h1>Sea View Villa</h1>
<p>Quiet soi in Jomtien. Price: 2,500,000 THB. 3 bedrooms, 180 sqm.</p>
<img src="img/front.jpg" alt="Front">
<img src="img/pool.jpg?v=2" alt="Pool">
<img src="https://cdn.example.com/garden.jpg">
<img src="img/missing.jpg">
</main></body></html>"#;

    const ABOUT: &str = r#"<html><head><title>About us</title></head>
<body><main><h2>Team</h2><p>We help buyers since 2005.</p><img src="team.jpg"></main></body></html>"#;

    const DISTRICT: &str = r#"<html><head><title>Leben in Pratumnak</title></head>
<body><p>Ruhige Lage zwischen Pattaya und Jomtien.</p></body></html>"#;

    fn write_archive(root: &Path) {
        let src = root.join("old_html");
        fs::create_dir_all(src.join("img")).unwrap();
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("villa-en.html"), LISTING).unwrap();
        fs::write(src.join("img/front.jpg"), b"front").unwrap();
        fs::write(src.join("img/pool.jpg"), b"pool").unwrap();
        fs::write(src.join("sub/about_th.htm"), ABOUT).unwrap();
        fs::write(src.join("pratumnak.html"), DISTRICT).unwrap();
        fs::write(src.join("notes.txt"), "ignored").unwrap();
    }

    #[test]
    fn scan_counts_body_images_and_reads_title() {
        let scan = scan_page(LISTING);
        assert_eq!(scan.title, "Sea View Villa Jomtien");
        assert_eq!(scan.features.image_count, 5);
        assert_eq!(scan.image_sources.len(), 4);
        assert!(scan.features.text.contains("2,500,000 THB"));

        let untitled = scan_page("<p>hi</p>");
        assert_eq!(untitled.title, "Page");
    }

    #[tokio::test]
    async fn migrates_listings_pages_and_districts() -> Result<()> {
        let tmp = TempDir::new()?;
        write_archive(tmp.path());
        let config = config_in(tmp.path());

        let summary = ArchiveMigrator::new(config.clone()).run().await?;
        assert_eq!(summary.migrated_html_files, 3);
        assert_eq!(summary.created_properties, 1);
        assert_eq!(summary.created_pages, 2);
        assert_eq!(summary.copied_images, 2);
        assert!(summary.errors.is_empty());

        let json = fs::read_to_string(config.properties_dir.join("sea-view-villa-jomtien.en.json"))?;
        let record: PropertyRecord = serde_json::from_str(&json)?;
        assert_eq!(record.locale, Locale::En);
        assert_eq!(record.price_thb, 2_500_000);
        assert_eq!(record.bedrooms, 3);
        assert_eq!(record.living_sqm, Some(180.0));
        assert_eq!(record.location, "jomtien");
        assert_eq!(record.district.as_deref(), Some("jomtien"));
        assert_eq!(record.images.len(), 4);
        assert!(record.images[0].starts_with("/images/archiv/"));
        assert!(record.images[0].ends_with("-front.jpg"));
        assert!(record.images[1].ends_with("-pool.jpg"));
        assert_eq!(record.images[2], "https://cdn.example.com/garden.jpg");
        assert_eq!(record.images[3], "img/missing.jpg");
        assert_eq!(record.cover.as_deref(), Some(record.images[0].as_str()));
        assert!(record.body.as_deref().unwrap_or("").contains(&format!("![Front]({})", record.images[0])));
        assert_eq!(fs::read_dir(&config.image_dir)?.count(), 2);

        let about = fs::read_to_string(config.pages_dir.join("about-us.th.md"))?;
        assert!(about.starts_with("---\ntitle: \"About us\"\nlocale: th\n"));
        assert!(about.contains("## Team"));

        let district = fs::read_to_string(config.districts_dir.join("leben-in-pratumnak.de.md"))?;
        assert!(district.contains("images: []"));
        Ok(())
    }

    #[tokio::test]
    async fn one_broken_file_does_not_stop_the_run() -> Result<()> {
        let tmp = TempDir::new()?;
        write_archive(tmp.path());
        let config = config_in(tmp.path());
        // a directory where the page file should go makes that write fail
        fs::create_dir_all(config.pages_dir.join("about-us.th.md"))?;

        let summary = ArchiveMigrator::new(config).run().await?;
        assert_eq!(summary.created_properties, 1);
        assert_eq!(summary.created_pages, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].file.ends_with("about_th.htm"));
        Ok(())
    }

    #[tokio::test]
    async fn custom_classifier_turns_everything_into_pages() -> Result<()> {
        struct NeverListing;
        impl PropertyClassifier for NeverListing {
            fn is_property(&self, _: &PageFeatures) -> bool {
                false
            }
        }

        let tmp = TempDir::new()?;
        write_archive(tmp.path());
        let summary = ArchiveMigrator::new(config_in(tmp.path()))
            .with_classifier(NeverListing)
            .run()
            .await?;
        assert_eq!(summary.created_properties, 0);
        assert_eq!(summary.created_pages, 3);
        Ok(())
    }

    #[tokio::test]
    async fn missing_archive_is_fatal() {
        let tmp = TempDir::new().unwrap();
        assert!(ArchiveMigrator::new(config_in(tmp.path())).run().await.is_err());
    }

    #[tokio::test]
    async fn untitled_pages_get_distinct_slugs() -> Result<()> {
        let tmp = TempDir::new()?;
        let config = config_in(tmp.path());
        for dir in ["a", "b"] {
            fs::create_dir_all(config.html_dir.join(dir))?;
            fs::write(config.html_dir.join(dir).join("index.html"), "<p>Kontakt</p>")?;
        }

        let summary = ArchiveMigrator::new(config.clone()).run().await?;
        assert_eq!(summary.created_pages, 2);
        assert!(summary.errors.is_empty());
        assert_eq!(summary.warnings.len(), 1);
        assert!(summary.warnings[0].file.ends_with("index.html"));
        assert!(config.pages_dir.join("page.de.md").is_file());
        assert!(config.pages_dir.join("page-2.de.md").is_file());
        Ok(())
    }

    const GALLERY: &str = r#"<html><head><title>Gallery</title></head><body><main>
<img src="/shared/hero.jpg" alt="Hero">
<img src="//cdn.example.com/wide.jpg">
<img src="data:image/png;base64,iVBORw0KGgo=">
<img src="a/photo.jpg">
<img src="b/photo.jpg">
<img src="broken.jpg">
<img src="../../secret.jpg">
<img src="/../secret.jpg">
</main></body></html>"#;

    #[tokio::test]
    async fn resolves_copies_and_keeps_image_references() -> Result<()> {
        let tmp = TempDir::new()?;
        let config = config_in(tmp.path());
        let pages = config.html_dir.join("pages");
        fs::create_dir_all(config.html_dir.join("shared"))?;
        fs::create_dir_all(pages.join("a"))?;
        fs::create_dir_all(pages.join("b"))?;
        // a directory named like an image cannot be copied
        fs::create_dir_all(pages.join("broken.jpg"))?;
        fs::write(config.html_dir.join("shared/hero.jpg"), b"hero")?;
        fs::write(pages.join("a/photo.jpg"), b"first")?;
        fs::write(pages.join("b/photo.jpg"), b"second")?;
        // next to the archive, reachable only through ".."
        fs::write(tmp.path().join("secret.jpg"), b"secret")?;
        fs::write(pages.join("gallery.html"), GALLERY)?;

        let summary = ArchiveMigrator::new(config.clone())
            .with_classifier(HeuristicClassifier::default().with_min_images(100))
            .run()
            .await?;
        assert_eq!(summary.created_pages, 1);
        assert_eq!(summary.copied_images, 3);
        let copied = fs::read_dir(&config.image_dir)?
            .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<Vec<String>>>()?;
        assert_eq!(copied.len(), 3);
        assert!(copied.iter().any(|n| n.ends_with("-hero.jpg")));
        assert_eq!(copied.iter().filter(|n| n.ends_with("photo.jpg")).count(), 2);
        assert!(copied.iter().any(|n| n.ends_with("-1-photo.jpg")));

        let page = fs::read_to_string(config.pages_dir.join("gallery.de.md"))?;
        assert!(page.contains("](/images/archiv/") && page.contains("-hero.jpg)"));
        assert!(page.contains("(//cdn.example.com/wide.jpg)"));
        assert!(page.contains("(data:image/png;base64,iVBORw0KGgo=)"));
        assert!(page.contains("(broken.jpg)"));
        assert!(page.contains("(../../secret.jpg)"));
        assert!(page.contains("(/../secret.jpg)"));
        Ok(())
    }

    #[tokio::test]
    async fn price_next_to_currency_is_extracted() -> Result<()> {
        let tmp = TempDir::new()?;
        let config = config_in(tmp.path());
        fs::create_dir_all(&config.html_dir)?;
        fs::write(
            config.html_dir.join("haus.html"),
            r#"<html><head><title>Haus Naklua</title></head><body>
<p>Preis: 12.900.000THB</p><img src="x.jpg"><img src="y.jpg"></body></html>"#,
        )?;

        let summary = ArchiveMigrator::new(config.clone()).run().await?;
        assert_eq!(summary.created_properties, 1);
        let json = fs::read_to_string(config.properties_dir.join("haus-naklua.de.json"))?;
        let record: PropertyRecord = serde_json::from_str(&json)?;
        assert_eq!(record.price_thb, 12_900_000);
        Ok(())
    }
}
