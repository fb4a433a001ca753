pub mod archive;
pub mod classify;
pub mod csv;
pub mod extract;
pub mod images;
pub mod markdown;
pub mod traits;
pub mod types;

pub use archive::ArchiveMigrator;
pub use classify::HeuristicClassifier;
pub use self::csv::CsvImporter;
pub use images::ImageRefresher;
pub use traits::{Importer, PropertyClassifier};
pub use types::{FileIssue, ImportSummary, MigrationSummary, PageFeatures, RefreshSummary, RowIssue};
