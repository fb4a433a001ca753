//! Best-effort field extraction from the visible text of legacy pages.

use crate::models::{Locale, PropertyType};
use once_cell::sync::Lazy;
use regex::Regex;

// No word boundaries: currency words and Thai script may touch the digits.
static PRICE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{1,3}(?:[,.][0-9]{3})+|[0-9]{6,12})").expect("valid price regex")
});

static CURRENCY_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)thb|฿|\bprice\b|\bpreis\b").expect("valid currency regex"));

static BEDROOMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*(?:bed(?:room)?s?|schlafzimmer)").expect("valid bedroom regex")
});

static LIVING_AREA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{2,4})\s*(?:sqm|m2|m²)").expect("valid area regex"));

static LOCALE_EN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-en[.-]|_en\.").expect("valid locale regex"));
static LOCALE_TH: Lazy<Regex> = Lazy::new(|| Regex::new(r"-th[.-]|_th\.").expect("valid locale regex"));

/// District slug and the lower-case keywords that identify it
const DISTRICTS: &[(&str, &[&str])] = &[
    ("jomtien", &["jomtien"]),
    ("pratumnak", &["pratumnak"]),
    ("naklua-wongamat", &["naklua", "wongamat"]),
    ("east-pattaya", &["east pattaya"]),
];

/// Locale encoded in an archive file name (`about-en.html`, `index_th.htm`); German otherwise
pub fn locale_from_file_name(name: &str) -> Locale {
    let lower = name.to_lowercase();
    if LOCALE_EN.is_match(&lower) {
        Locale::En
    } else if LOCALE_TH.is_match(&lower) {
        Locale::Th
    } else {
        Locale::De
    }
}

/// First 6-12 digit number in the text, thousands separators removed
pub fn price_from_text(text: &str) -> Option<u64> {
    PRICE_TOKEN.captures_iter(text).find_map(|caps| {
        let token = caps.get(1)?;
        if text[token.end()..].starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        let digits: String = token.as_str().chars().filter(char::is_ascii_digit).collect();
        if (6..=12).contains(&digits.len()) {
            digits.parse().ok()
        } else {
            None
        }
    })
}

pub fn has_currency_keyword(text: &str) -> bool {
    CURRENCY_KEYWORD.is_match(text)
}

pub fn bedrooms_from_text(text: &str) -> Option<u32> {
    BEDROOMS.captures(text).and_then(|caps| caps[1].parse().ok())
}

pub fn living_sqm_from_text(text: &str) -> Option<f64> {
    LIVING_AREA.captures(text).and_then(|caps| caps[1].parse().ok())
}

pub fn type_from_text(text: &str) -> PropertyType {
    let lower = text.to_lowercase();
    if lower.contains("villa") {
        PropertyType::Villa
    } else if ["condo", "eigentumswohnung", "apartment"].iter().any(|k| lower.contains(k)) {
        PropertyType::Condo
    } else if lower.contains("house") || lower.contains("haus") {
        PropertyType::House
    } else {
        PropertyType::Apartment
    }
}

/// District slug whose keyword appears in the text, checked in a fixed order
pub fn district_from_text(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    DISTRICTS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(slug, _)| *slug)
}
