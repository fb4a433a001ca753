use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_CSV_PATH: &str = "imports/properties.csv";
const DEFAULT_HTML_DIR: &str = "imports/old_html";
const DEFAULT_PROPERTIES_DIR: &str = "src/content/properties";
const DEFAULT_PAGES_DIR: &str = "src/content/pages";
const DEFAULT_DISTRICTS_DIR: &str = "src/content/districts";
const DEFAULT_IMAGE_DIR: &str = "public/images/archiv";
const DEFAULT_IMAGE_PREFIX: &str = "/images/archiv";
const DEFAULT_PLACEHOLDER_COVER: &str = "/images/sample/villa-main.jpg";

/// Source and output locations for the import tools.
///
/// Defaults follow the website's repository layout; each path can be
/// overridden by a command-line flag or an `ESTATE_*` environment variable
/// (a `.env` file is loaded first by the binary).
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct Config {
    /// Spreadsheet read by the CSV importer
    #[arg(long, global = true, env = "ESTATE_CSV_PATH", default_value = DEFAULT_CSV_PATH)]
    pub csv_path: PathBuf,

    /// Legacy HTML archive walked by the migrator
    #[arg(long, global = true, env = "ESTATE_HTML_DIR", default_value = DEFAULT_HTML_DIR)]
    pub html_dir: PathBuf,

    /// Generated property records (`{slug}.{locale}.json`)
    #[arg(long, global = true, env = "ESTATE_PROPERTIES_DIR", default_value = DEFAULT_PROPERTIES_DIR)]
    pub properties_dir: PathBuf,

    /// Generated generic pages (`{slug}.{locale}.md`)
    #[arg(long, global = true, env = "ESTATE_PAGES_DIR", default_value = DEFAULT_PAGES_DIR)]
    pub pages_dir: PathBuf,

    /// Generated district pages (`{slug}.{locale}.md`)
    #[arg(long, global = true, env = "ESTATE_DISTRICTS_DIR", default_value = DEFAULT_DISTRICTS_DIR)]
    pub districts_dir: PathBuf,

    /// Where archive images are copied to
    #[arg(long, global = true, env = "ESTATE_IMAGE_DIR", default_value = DEFAULT_IMAGE_DIR)]
    pub image_dir: PathBuf,

    /// URL prefix under which `image_dir` is served
    #[arg(
        long = "image-prefix",
        global = true,
        env = "ESTATE_IMAGE_PREFIX",
        default_value = DEFAULT_IMAGE_PREFIX,
        value_parser = public_prefix
    )]
    pub image_public_prefix: String,

    /// Cover used for migrated listings without any image
    #[arg(long, global = true, env = "ESTATE_PLACEHOLDER_COVER", default_value = DEFAULT_PLACEHOLDER_COVER)]
    pub placeholder_cover: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            html_dir: PathBuf::from(DEFAULT_HTML_DIR),
            properties_dir: PathBuf::from(DEFAULT_PROPERTIES_DIR),
            pages_dir: PathBuf::from(DEFAULT_PAGES_DIR),
            districts_dir: PathBuf::from(DEFAULT_DISTRICTS_DIR),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            image_public_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            placeholder_cover: DEFAULT_PLACEHOLDER_COVER.to_string(),
        }
    }
}

/// Public URL prefix without a trailing slash
fn public_prefix(value: &str) -> Result<String, String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err("image prefix must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn defaults_match_site_layout() {
        let config = Config::default();
        assert_eq!(config.properties_dir, PathBuf::from("src/content/properties"));
        assert_eq!(config.image_public_prefix, "/images/archiv");
    }

    #[test]
    fn flag_defaults_agree_with_default_impl() {
        let parsed = Harness::try_parse_from(["estate-content"]).unwrap().config;
        let defaults = Config::default();
        assert_eq!(parsed.csv_path, defaults.csv_path);
        assert_eq!(parsed.html_dir, defaults.html_dir);
        assert_eq!(parsed.pages_dir, defaults.pages_dir);
        assert_eq!(parsed.districts_dir, defaults.districts_dir);
        assert_eq!(parsed.image_dir, defaults.image_dir);
        assert_eq!(parsed.placeholder_cover, defaults.placeholder_cover);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Harness::try_parse_from([
            "estate-content",
            "--csv-path",
            "data/listings.csv",
            "--image-prefix",
            "/media/",
        ])
        .unwrap()
        .config;
        assert_eq!(config.csv_path, PathBuf::from("data/listings.csv"));
        assert_eq!(config.image_public_prefix, "/media");
        assert_eq!(config.pages_dir, PathBuf::from("src/content/pages"));
    }

    #[test]
    fn blank_image_prefix_is_rejected() {
        assert!(Harness::try_parse_from(["estate-content", "--image-prefix", " / "]).is_err());
    }
}
