//! Conversions from raw spreadsheet / page text into typed field values.
//!
//! None of these fail: unparseable input yields `None` or the type's default.

use crate::models::{Furnishing, Listing, PropertyType, Status};

/// Slug used when nothing alphanumeric survives slugification
pub const SLUG_PLACEHOLDER: &str = "page";

/// Parse a number, ignoring thousands separators and whitespace
pub fn to_num(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '_' | '\''))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a number and round it to the nearest integer
pub fn to_int(raw: &str) -> Option<i64> {
    to_num(raw).map(|n| n.round() as i64)
}

/// Non-negative integer, clamping anything below zero
pub fn to_count(raw: &str) -> Option<u32> {
    to_int(raw).map(|n| n.clamp(0, u32::MAX as i64) as u32)
}

/// Split a `;` or `|` separated cell into trimmed, non-empty entries
pub fn to_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ';' || c == '|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trimmed text, `None` when blank
pub fn to_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Result of mapping free text onto a closed set
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub value: T,
    /// The raw input when it was non-empty but matched nothing
    pub unrecognized: Option<String>,
}

fn choice<T: Default>(raw: &str, from_alias: fn(&str) -> Option<T>) -> Normalized<T> {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        return Normalized { value: T::default(), unrecognized: None };
    }
    match from_alias(&key) {
        Some(value) => Normalized { value, unrecognized: None },
        None => Normalized { value: T::default(), unrecognized: Some(raw.trim().to_string()) },
    }
}

pub fn norm_type(raw: &str) -> Normalized<PropertyType> {
    choice(raw, PropertyType::from_alias)
}

pub fn norm_listing(raw: &str) -> Normalized<Listing> {
    choice(raw, Listing::from_alias)
}

pub fn norm_status(raw: &str) -> Normalized<Status> {
    choice(raw, Status::from_alias)
}

pub fn norm_furnishing(raw: &str) -> Normalized<Furnishing> {
    choice(raw, Furnishing::from_alias)
}

/// URL-safe identifier: lower-case ASCII letters and digits joined by `-`
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for c in raw.chars().flat_map(char::to_lowercase) {
        let folded = fold_diacritic(c);
        for ch in folded.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch);
            } else {
                pending_dash = true;
            }
        }
    }

    if slug.is_empty() {
        SLUG_PLACEHOLDER.to_string()
    } else {
        slug
    }
}

/// Slug of the first `limit` characters of `raw`
pub fn slugify_truncated(raw: &str, limit: usize) -> String {
    let head: String = raw.trim().chars().take(limit).collect();
    slugify(&head)
}

// Latin-1 Supplement and Latin Extended-A, lower-case only
fn fold_diacritic(c: char) -> String {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        other => return other.to_string(),
    };
    folded.to_string()
}
