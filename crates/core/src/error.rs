use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("docx parse error: {0}")]
    DocxParse(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload directory does not exist: {0}")]
    MissingUploadDir(String),

    #[error("no stored document named {0}")]
    NotFound(String),

    #[error("rejected {filename}: {reason}")]
    Rejected { filename: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("empty search query")]
    EmptyQuery,

    #[error("document store error: {0}")]
    Store(#[from] StoreError),

    #[error("search worker failed: {0}")]
    Worker(String),
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
