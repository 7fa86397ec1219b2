use chrono::Utc;
use clap::{Parser, Subcommand};
use docsnippet_core::{
    DocumentFilter, DocumentStore, ExtractorRegistry, FolderStore, FormatTag, HighlightMarkers,
    SearchConfig, SearchCoordinator,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docsnippet", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding uploaded documents
    #[arg(long, env = "DOCSNIPPET_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "DOCSNIPPET_MAX_UPLOAD_BYTES", default_value = "52428800")]
    max_upload_bytes: u64,

    /// Documents searched in parallel with --concurrent
    #[arg(long, env = "DOCSNIPPET_WORKERS", default_value = "4")]
    workers: usize,

    /// Marker inserted before each highlighted occurrence
    #[arg(long, default_value = "<mark>")]
    mark_open: String,

    /// Marker inserted after each highlighted occurrence
    #[arg(long, default_value = "</mark>")]
    mark_close: String,
}

#[derive(Subcommand)]
enum Command {
    /// Copy PDF/DOCX files into the upload directory.
    Upload {
        /// Files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List documents available for search.
    List,
    /// Search uploaded documents and print matching sentences as JSON.
    Search {
        /// Search query
        #[arg(long)]
        query: String,
        /// Restrict the search to one file name, or `all`.
        #[arg(long, default_value = "all")]
        document: String,
        /// Process documents on a worker pool.
        #[arg(long, default_value_t = false)]
        concurrent: bool,
    },
    /// Copy a stored document out of the upload directory.
    Download {
        /// Stored file name, as shown by `list`.
        name: String,
        /// Destination path; defaults to the file name in the current directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the text extracted from a single file.
    Extract {
        /// PDF or DOCX file.
        file: PathBuf,
    },
}

impl Cli {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            upload_dir: self.upload_dir.clone(),
            max_upload_bytes: self.max_upload_bytes,
            allowed_formats: vec![FormatTag::pdf(), FormatTag::docx()],
            markers: HighlightMarkers {
                open: self.mark_open.clone(),
                close: self.mark_close.clone(),
            },
            workers: self.workers,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        upload_dir = %config.upload_dir.display(),
        "docsnippet boot"
    );

    match cli.command {
        Command::Upload { files } => {
            let store = FolderStore::open(&config)?;
            let mut payloads = Vec::with_capacity(files.len());
            for path in &files {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string_lossy().into_owned());
                let bytes = tokio::fs::read(path).await?;
                payloads.push((name, bytes));
            }

            let report = store.upload(
                payloads
                    .iter()
                    .map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
            )?;

            info!(
                saved = report.saved.len(),
                rejected = report.rejected.len(),
                "upload finished"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::List => {
            let store = FolderStore::open(&config)?;
            for document in store.list()?.into_iter().filter(|doc| doc.eligible) {
                let format = document
                    .format
                    .as_ref()
                    .map(FormatTag::to_string)
                    .unwrap_or_default();
                println!("{}\t{}", document.filename, format);
            }
        }
        Command::Search {
            query,
            document,
            concurrent,
        } => {
            let store = FolderStore::open(&config)?;
            let coordinator = SearchCoordinator::new(ExtractorRegistry::default(), config);
            let filter = DocumentFilter::from_choice(&document);
            let report = if concurrent {
                coordinator
                    .search_concurrent(Arc::new(store), &query, &filter)
                    .await?
            } else {
                coordinator.search(&store, &query, &filter)?
            };

            if !report.skipped.is_empty() {
                warn!("skipped_documents={}", report.skipped.len());
                for skipped in &report.skipped {
                    warn!(filename = %skipped.filename, reason = %skipped.reason, "skipped document");
                }
            }

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Download { name, out } => {
            let store = FolderStore::new(&config);
            let document = store.document(&name)?;
            let bytes = store.read(&document)?;
            let out = out.unwrap_or_else(|| PathBuf::from(&document.filename));
            tokio::fs::write(&out, &bytes).await?;
            info!(name = %document.filename, out = %out.display(), bytes = bytes.len(), "downloaded document");
        }
        Command::Extract { file } => {
            let text = ExtractorRegistry::default().extract_path(&file)?;
            if text.is_empty() {
                warn!(path = %file.display(), "no text extracted");
            }
            println!("{text}");
        }
    }

    Ok(())
}
