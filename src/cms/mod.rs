//! In-memory content stores backing the editorial prototype.
//!
//! State lives as long as the store value; nothing is persisted.

pub mod clock;
pub mod content;
pub mod multilang;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use content::{
    Content, ContentData, ContentType, ContentUpdate, DistrictData, GeoPoint, Metadata, MetadataInput,
    MetadataUpdate, NewContent, PageData, PageSection, PageTemplate, PropertyData, SectionKind,
};
pub use multilang::{
    NewTranslation, TranslatedContent, Translation, TranslationGap, TranslationStatus, TranslationStore,
    TranslationUpdate,
};
pub use store::ContentStore;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CmsError {
    #[error("shared data is {found} content but the entry is {expected}")]
    KindMismatch { expected: ContentType, found: ContentType },
}
