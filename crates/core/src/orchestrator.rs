use crate::extractor::ExtractorRegistry;
use crate::matcher::Matcher;
use crate::models::{
    DocumentFilter, MatchResult, SearchConfig, SearchQuery, SearchReport, SkippedDocument,
    StoredDocument,
};
use crate::segment::segment;
use crate::store::DocumentStore;
use crate::SearchError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::Semaphore;

pub struct SearchCoordinator {
    registry: Arc<ExtractorRegistry>,
    config: SearchConfig,
}

enum DocumentOutcome {
    Matched(MatchResult),
    NoMatch,
    Skipped(SkippedDocument),
}

impl SearchCoordinator {
    pub fn new(registry: ExtractorRegistry, config: SearchConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    /// Searches every candidate document one after another.
    ///
    /// Results follow the store's enumeration order. Documents that fail to
    /// read or extract are left out of `results` and listed in `skipped`.
    pub fn search<S>(
        &self,
        store: &S,
        query: &str,
        filter: &DocumentFilter,
    ) -> Result<SearchReport, SearchError>
    where
        S: DocumentStore + ?Sized,
    {
        let query = SearchQuery::parse(query)?;
        let matcher = Matcher::new(query.text(), self.config.markers.clone());

        let mut results = Vec::new();
        let mut skipped = Vec::new();
        for document in self.candidates(store, filter)? {
            let outcome = search_document(&self.registry, store, &document, &matcher);
            collect(outcome, &mut results, &mut skipped);
        }

        Ok(finish(query, results, skipped))
    }

    /// Same contract as [`SearchCoordinator::search`], with documents processed
    /// on at most `config.workers` blocking tasks at a time.
    pub async fn search_concurrent<S>(
        &self,
        store: Arc<S>,
        query: &str,
        filter: &DocumentFilter,
    ) -> Result<SearchReport, SearchError>
    where
        S: DocumentStore + Send + Sync + 'static,
    {
        let query = SearchQuery::parse(query)?;
        let matcher = Arc::new(Matcher::new(query.text(), self.config.markers.clone()));
        let permits = Arc::new(Semaphore::new(self.config.workers.max(1)));

        let mut handles = Vec::new();
        for document in self.candidates(store.as_ref(), filter)? {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|error| SearchError::Worker(error.to_string()))?;
            let registry = Arc::clone(&self.registry);
            let store = Arc::clone(&store);
            let matcher = Arc::clone(&matcher);
            let filename = document.filename.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                search_document(&registry, store.as_ref(), &document, &matcher)
            });
            handles.push((filename, handle));
        }

        let mut results = Vec::new();
        let mut skipped = Vec::new();
        for (filename, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(error) if error.is_panic() => {
                    skip(&filename, panic_reason(error.into_panic().as_ref()))
                }
                Err(error) => return Err(SearchError::Worker(error.to_string())),
            };
            collect(outcome, &mut results, &mut skipped);
        }

        Ok(finish(query, results, skipped))
    }

    fn candidates<S>(
        &self,
        store: &S,
        filter: &DocumentFilter,
    ) -> Result<Vec<StoredDocument>, SearchError>
    where
        S: DocumentStore + ?Sized,
    {
        Ok(store
            .list()?
            .into_iter()
            .filter(|document| document.eligible && filter.accepts(&document.filename))
            .collect())
    }
}

fn search_document<S>(
    registry: &ExtractorRegistry,
    store: &S,
    document: &StoredDocument,
    matcher: &Matcher,
) -> DocumentOutcome
where
    S: DocumentStore + ?Sized,
{
    // A panicking parser skips only this document.
    let text = panic::catch_unwind(AssertUnwindSafe(|| {
        store
            .read(document)
            .map_err(|error| error.to_string())
            .and_then(|bytes| {
                registry
                    .extract(document.format.as_ref(), &bytes)
                    .map_err(|error| error.to_string())
            })
    }))
    .unwrap_or_else(|payload| Err(panic_reason(payload.as_ref())));

    let text = match text {
        Ok(text) => text,
        Err(reason) => return skip(&document.filename, reason),
    };

    let snippets = matcher.matching_sentences(segment(&text));
    tracing::debug!(
        filename = %document.filename,
        matches = snippets.len(),
        "searched document"
    );

    if snippets.is_empty() {
        DocumentOutcome::NoMatch
    } else {
        DocumentOutcome::Matched(MatchResult {
            filename: document.filename.clone(),
            snippets,
        })
    }
}

fn skip(filename: &str, reason: String) -> DocumentOutcome {
    tracing::warn!(%filename, %reason, "skipped document");
    DocumentOutcome::Skipped(SkippedDocument {
        filename: filename.to_string(),
        reason,
    })
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    format!("extraction panicked: {message}")
}

fn collect(
    outcome: DocumentOutcome,
    results: &mut Vec<MatchResult>,
    skipped: &mut Vec<SkippedDocument>,
) {
    match outcome {
        DocumentOutcome::Matched(result) => results.push(result),
        DocumentOutcome::NoMatch => {}
        DocumentOutcome::Skipped(document) => skipped.push(document),
    }
}

fn finish(
    query: SearchQuery,
    results: Vec<MatchResult>,
    skipped: Vec<SkippedDocument>,
) -> SearchReport {
    tracing::info!(
        query = query.text(),
        matched = results.len(),
        skipped = skipped.len(),
        "search finished"
    );

    SearchReport {
        query: query.text().to_string(),
        results,
        skipped,
    }
}
