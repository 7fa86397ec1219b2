use crate::error::StoreError;
use crate::models::{FormatTag, SearchConfig, StoredDocument};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

/// Storage collaborator the search pipeline reads documents from.
pub trait DocumentStore {
    /// Every stored document, eligible or not, in enumeration order.
    fn list(&self) -> Result<Vec<StoredDocument>, StoreError>;

    fn read(&self, document: &StoredDocument) -> Result<Vec<u8>, StoreError>;
}

/// Flat upload directory. Documents are enumerated in file name order.
#[derive(Debug, Clone)]
pub struct FolderStore {
    root: PathBuf,
    allowed_formats: Vec<FormatTag>,
    max_upload_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    pub ok: bool,
    pub saved: Vec<String>,
    pub rejected: Vec<String>,
}

impl FolderStore {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            root: config.upload_dir.clone(),
            allowed_formats: config.allowed_formats.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Like [`FolderStore::new`], creating the upload directory when missing.
    pub fn open(config: &SearchConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(&config.upload_dir)?;
        Ok(Self::new(config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Looks up a stored document by its exact listed name.
    ///
    /// Only names produced by [`DocumentStore::list`] resolve, so paths with
    /// separators or `..` never reach the filesystem.
    pub fn document(&self, filename: &str) -> Result<StoredDocument, StoreError> {
        self.list()?
            .into_iter()
            .find(|document| document.filename == filename)
            .ok_or_else(|| StoreError::NotFound(filename.to_string()))
    }

    pub fn is_allowed(&self, filename: &str) -> bool {
        FormatTag::from_filename(filename).is_some_and(|tag| self.allowed_formats.contains(&tag))
    }

    /// Stores `bytes` under a sanitized version of `filename`, replacing any
    /// existing file with that name. Returns the stored name.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<String, StoreError> {
        if !self.is_allowed(filename) {
            return Err(StoreError::Rejected {
                filename: filename.to_string(),
                reason: "file type not allowed".to_string(),
            });
        }

        if bytes.len() as u64 > self.max_upload_bytes {
            return Err(StoreError::Rejected {
                filename: filename.to_string(),
                reason: format!("larger than {} bytes", self.max_upload_bytes),
            });
        }

        let safe_name = sanitize_filename(filename);
        if !self.is_allowed(&safe_name) {
            return Err(StoreError::Rejected {
                filename: filename.to_string(),
                reason: "file name is empty after sanitizing".to_string(),
            });
        }

        fs::write(self.root.join(&safe_name), bytes)?;
        tracing::debug!(filename = %safe_name, bytes = bytes.len(), "stored upload");
        Ok(safe_name)
    }

    /// Saves every file that passes the allow-list and size limit. Files with
    /// an empty name are ignored, other failures end up in `rejected`.
    pub fn upload<'a, I>(&self, files: I) -> Result<UploadReport, StoreError>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let mut report = UploadReport {
            ok: true,
            ..UploadReport::default()
        };

        for (filename, bytes) in files {
            if filename.is_empty() {
                continue;
            }

            match self.save(filename, bytes) {
                Ok(stored) => report.saved.push(stored),
                Err(StoreError::Rejected { filename, reason }) => {
                    tracing::warn!(%filename, %reason, "rejected upload");
                    report.rejected.push(filename);
                }
                Err(error) => return Err(error),
            }
        }

        Ok(report)
    }
}

impl DocumentStore for FolderStore {
    fn list(&self) -> Result<Vec<StoredDocument>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::MissingUploadDir(
                self.root.display().to_string(),
            ));
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|error| StoreError::Io(error.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(filename) = entry.file_name().to_str() else {
                tracing::debug!(path = %entry.path().display(), "skipping non utf-8 file name");
                continue;
            };

            let format = FormatTag::from_filename(filename);
            let eligible = format
                .as_ref()
                .is_some_and(|tag| self.allowed_formats.contains(tag));

            documents.push(StoredDocument {
                filename: filename.to_string(),
                format,
                path: entry.path().to_path_buf(),
                eligible,
            });
        }

        Ok(documents)
    }

    fn read(&self, document: &StoredDocument) -> Result<Vec<u8>, StoreError> {
        Ok(fs::read(&document.path)?)
    }
}

/// Reduces an uploaded name to a flat, portable file name.
///
/// Directory components are dropped and accented letters are reduced to their
/// ASCII base (NFKD). Whitespace becomes `_`, anything other than ASCII
/// alphanumerics, `.`, `-` and `_` is removed, and `.`/`_` are trimmed from
/// both ends so the result can never be hidden or climb out of the root.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned = base
        .nfkd()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect::<String>();

    cleaned.trim_matches(['.', '_']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> FolderStore {
        FolderStore::new(&SearchConfig {
            upload_dir: dir.to_path_buf(),
            max_upload_bytes: 16,
            ..SearchConfig::default()
        })
    }

    #[test]
    fn sanitize_strips_paths_and_unsafe_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(sanitize_filename(r"C:\docs\Q3 report.docx"), "Q3_report.docx");
        assert_eq!(sanitize_filename("..hidden.pdf"), "hidden.pdf");
        assert_eq!(sanitize_filename("résumé final.pdf"), "resume_final.pdf");
        assert_eq!(sanitize_filename("ééé.pdf"), "eee.pdf");
        assert_eq!(sanitize_filename("ﬁle.pdf"), "file.pdf");
        assert_eq!(sanitize_filename("report.pdf_"), "report.pdf");
        assert_eq!(sanitize_filename("my  file\t.pdf"), "my_file_.pdf");
    }

    #[test]
    fn listing_is_sorted_and_flags_eligibility() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("b.docx"), b"b")?;
        fs::write(dir.path().join("a.PDF"), b"a")?;
        fs::write(dir.path().join("c.txt"), b"c")?;
        fs::create_dir(dir.path().join("nested.pdf"))?;

        let documents = store_in(dir.path()).list()?;
        let names = documents
            .iter()
            .map(|document| (document.filename.as_str(), document.eligible))
            .collect::<Vec<_>>();

        assert_eq!(names, vec![("a.PDF", true), ("b.docx", true), ("c.txt", false)]);
        assert_eq!(documents[0].format, Some(FormatTag::pdf()));
        Ok(())
    }

    #[test]
    fn listing_a_missing_directory_fails() {
        let store = store_in(Path::new("/definitely/not/here"));
        assert!(matches!(store.list(), Err(StoreError::MissingUploadDir(_))));
    }

    #[test]
    fn save_enforces_allow_list_and_size() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = store_in(dir.path());

        assert_eq!(store.save("sub/dir/Report 1.pdf", b"%PDF")?, "Report_1.pdf");
        assert_eq!(fs::read(dir.path().join("Report_1.pdf"))?, b"%PDF");

        assert!(matches!(
            store.save("notes.txt", b"x"),
            Err(StoreError::Rejected { .. })
        ));
        assert!(matches!(
            store.save("big.pdf", &[0u8; 17]),
            Err(StoreError::Rejected { .. })
        ));
        assert_eq!(store.save("Ünïcödé.pdf", b"x")?, "Unicode.pdf");
        assert!(matches!(
            store.save("日本.pdf", b"x"),
            Err(StoreError::Rejected { .. })
        ));
        Ok(())
    }

    #[test]
    fn upload_reports_saved_and_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = store_in(dir.path());

        let report = store.upload([
            ("a.pdf", b"pdf".as_slice()),
            ("", b"skipped".as_slice()),
            ("script.sh", b"echo".as_slice()),
            ("b.docx", b"docx".as_slice()),
            ("r\u{fffd}sum\u{fffd}.pdf", b"lossy".as_slice()),
            ("..", b"no name".as_slice()),
        ])?;

        assert!(report.ok);
        assert_eq!(report.saved, vec!["a.pdf", "b.docx", "rsum.pdf"]);
        assert_eq!(report.rejected, vec!["script.sh", ".."]);
        Ok(())
    }

    #[test]
    fn document_resolves_only_listed_names() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let uploads = dir.path().join("uploads");
        fs::create_dir(&uploads)?;
        fs::write(uploads.join("a.pdf"), b"%PDF")?;
        fs::write(dir.path().join("secret.pdf"), b"secret")?;

        let store = store_in(&uploads);
        let found = store.document("a.pdf")?;
        assert_eq!(store.read(&found)?, b"%PDF");

        for name in ["../secret.pdf", "missing.pdf", "", "A.PDF"] {
            assert!(matches!(store.document(name), Err(StoreError::NotFound(_))));
        }
        Ok(())
    }

    #[test]
    fn open_creates_the_upload_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let config = SearchConfig {
            upload_dir: dir.path().join("uploads"),
            ..SearchConfig::default()
        };

        let store = FolderStore::open(&config)?;
        assert!(store.root().is_dir());
        assert!(store.list()?.is_empty());
        Ok(())
    }
}
