use crate::importers::extract::{has_currency_keyword, price_from_text};
use crate::importers::traits::PropertyClassifier;
use crate::importers::types::PageFeatures;
use regex::Regex;

/// Pages with fewer images than this are never listings
pub const DEFAULT_MIN_IMAGES: usize = 2;

/// A page is a listing when it shows a gallery and mentions a price.
///
/// The price signal is either a custom pattern or, by default, a currency
/// keyword or a plausible 6-12 digit price token.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    min_images: usize,
    price_pattern: Option<Regex>,
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self {
            min_images: DEFAULT_MIN_IMAGES,
            price_pattern: None,
        }
    }
}

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_images(mut self, min_images: usize) -> Self {
        self.min_images = min_images;
        self
    }

    /// Replace the built-in price detection
    pub fn with_price_pattern(mut self, pattern: Regex) -> Self {
        self.price_pattern = Some(pattern);
        self
    }

    fn mentions_price(&self, text: &str) -> bool {
        match &self.price_pattern {
            Some(pattern) => pattern.is_match(text),
            None => has_currency_keyword(text) || price_from_text(text).is_some(),
        }
    }
}

impl PropertyClassifier for HeuristicClassifier {
    fn is_property(&self, page: &PageFeatures) -> bool {
        page.image_count >= self.min_images && self.mentions_price(&page.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(image_count: usize, text: &str) -> PageFeatures {
        PageFeatures {
            image_count,
            text: text.to_string(),
        }
    }

    #[test]
    fn gallery_with_price_is_a_listing() {
        let classifier = HeuristicClassifier::new();
        assert!(classifier.is_property(&page(3, "Sea view condo for 2,500,000 THB")));
        assert!(classifier.is_property(&page(2, "Asking 3500000")));
    }

    #[test]
    fn needs_both_gallery_and_price() {
        let classifier = HeuristicClassifier::new();
        assert!(!classifier.is_property(&page(1, "Welcome to our office")));
        assert!(!classifier.is_property(&page(1, "2,500,000 THB")));
        assert!(!classifier.is_property(&page(5, "Our team at the beach")));
    }

    #[test]
    fn thresholds_and_patterns_are_tunable() {
        let classifier = HeuristicClassifier::new()
            .with_min_images(1)
            .with_price_pattern(Regex::new(r"(?i)\bEUR\b").unwrap());
        assert!(classifier.is_property(&page(1, "Only 200,000 EUR")));
        assert!(!classifier.is_property(&page(1, "2,500,000 THB")));
    }
}
