use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Lower-cased file extension that selects an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormatTag(String);

impl FormatTag {
    pub const PDF: &'static str = "pdf";
    pub const DOCX: &'static str = "docx";

    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim_start_matches('.').to_ascii_lowercase())
    }

    pub fn pdf() -> Self {
        Self::new(Self::PDF)
    }

    pub fn docx() -> Self {
        Self::new(Self::DOCX)
    }

    /// `None` when the name has no extension (`README`, `.bashrc`).
    pub fn from_filename(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub filename: String,
    pub format: Option<FormatTag>,
    pub path: PathBuf,
    pub eligible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DocumentFilter {
    #[default]
    All,
    Only(String),
}

impl DocumentFilter {
    /// `"all"` selects every document, anything else names a single file.
    pub fn from_choice(choice: &str) -> Self {
        if choice == "all" {
            Self::All
        } else {
            Self::Only(choice.to_string())
        }
    }

    pub fn accepts(&self, filename: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(name) => name == filename,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    text: String,
}

impl SearchQuery {
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub filename: String,
    pub snippets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub query: String,
    pub results: Vec<MatchResult>,
    #[serde(skip)]
    pub skipped: Vec<SkippedDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightMarkers {
    pub open: String,
    pub close: String,
}

impl Default for HighlightMarkers {
    fn default() -> Self {
        Self {
            open: "<mark>".to_string(),
            close: "</mark>".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub allowed_formats: Vec<FormatTag>,
    pub markers: HighlightMarkers,
    pub workers: usize,
}

impl SearchConfig {
    pub fn is_allowed(&self, format: Option<&FormatTag>) -> bool {
        format.is_some_and(|tag| self.allowed_formats.contains(tag))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 50 * 1024 * 1024,
            allowed_formats: vec![FormatTag::pdf(), FormatTag::docx()],
            markers: HighlightMarkers::default(),
            workers: 4,
        }
    }
}
