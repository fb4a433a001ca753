use crate::models::Locale;
use serde::{Deserialize, Serialize};

/// Problem attached to one spreadsheet row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowIssue {
    /// 1-based data row (header excluded)
    pub row: usize,
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
    pub message: String,
}

impl RowIssue {
    pub fn new(row: usize, slug: Option<&str>, locale: Option<Locale>, message: impl Into<String>) -> Self {
        Self {
            row,
            slug: slug.map(str::to_string),
            locale,
            message: message.into(),
        }
    }
}

/// Outcome of a CSV import run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Data rows read, including rows that failed
    pub rows: usize,
    /// Records written
    pub created: usize,
    /// A record was not produced
    pub errors: Vec<RowIssue>,
    /// A record was produced but is incomplete or coerced
    pub warnings: Vec<RowIssue>,
}

/// Problem attached to one archive file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileIssue {
    pub file: String,
    pub message: String,
}

/// Outcome of an HTML archive migration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationSummary {
    pub migrated_html_files: usize,
    pub created_pages: usize,
    pub created_properties: usize,
    pub copied_images: usize,
    pub errors: Vec<FileIssue>,
    /// A file was migrated under a different name
    pub warnings: Vec<FileIssue>,
}

/// Outcome of replacing placeholder images
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub updated: usize,
    pub errors: Vec<FileIssue>,
}

/// What a classifier gets to see of a legacy page
#[derive(Debug, Clone, Default)]
pub struct PageFeatures {
    /// Number of `<img>` elements in the page body
    pub image_count: usize,
    /// Visible body text
    pub text: String,
}
