use crate::importers::types::PageFeatures;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Common trait for all content importers.
/// Each run is best-effort: item-level problems end up in the summary,
/// only run-level failures are returned as errors.
#[async_trait]
pub trait Importer: Send + Sync {
    /// Report printed at the end of a run
    type Summary: Serialize + Send;

    /// Process every item of the source
    async fn run(&self) -> Result<Self::Summary>;

    /// Get the name of the import source
    fn source_name(&self) -> &'static str;
}

/// Decides whether a legacy page describes a property listing
pub trait PropertyClassifier: Send + Sync {
    fn is_property(&self, page: &PageFeatures) -> bool;
}
