pub mod error;
pub mod extractor;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod segment;
pub mod store;

pub use error::{ExtractError, SearchError, StoreError};
pub use extractor::{DocxExtractor, ExtractorRegistry, LopdfExtractor, TextExtractor};
pub use matcher::Matcher;
pub use models::{
    DocumentFilter, FormatTag, HighlightMarkers, MatchResult, SearchConfig, SearchQuery,
    SearchReport, SkippedDocument, StoredDocument,
};
pub use normalize::normalize;
pub use orchestrator::SearchCoordinator;
pub use segment::{normalize_whitespace, segment};
pub use store::{sanitize_filename, DocumentStore, FolderStore, UploadReport};
