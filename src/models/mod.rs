pub mod page;
pub mod property;

pub use page::{DocumentKind, PageDocument};
pub use property::{Furnishing, Listing, PropertyRecord, PropertyType, Status, ValidationError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Site locale. Every piece of content exists once per locale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    De,
    En,
    Th,
}

impl Locale {
    /// All supported locales, German first.
    pub const ALL: [Locale; 3] = [Locale::De, Locale::En, Locale::Th];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::De => "de",
            Locale::En => "en",
            Locale::Th => "th",
        }
    }

    /// Human readable name shown in the editor locale switcher
    pub fn label(&self) -> &'static str {
        match self {
            Locale::De => "Deutsch",
            Locale::En => "English",
            Locale::Th => "ไทย",
        }
    }

    /// Order in which sibling locales are consulted when this locale's text is blank.
    pub fn fallback_chain(&self) -> [Locale; 3] {
        match self {
            Locale::De => [Locale::De, Locale::En, Locale::Th],
            Locale::En => [Locale::En, Locale::De, Locale::Th],
            Locale::Th => [Locale::Th, Locale::En, Locale::De],
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "de" => Ok(Locale::De),
            "en" => Ok(Locale::En),
            "th" => Ok(Locale::Th),
            other => anyhow::bail!("Unsupported locale: {}", other),
        }
    }
}

/// Public detail page of a property listing
pub fn property_url(locale: Locale, slug: &str) -> String {
    format!("/{}/properties/{}/", locale, slug)
}
