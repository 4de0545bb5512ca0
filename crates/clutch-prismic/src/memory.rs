//! In-memory content source.
//!
//! Evaluates search queries against a fixed set of documents. Used as the
//! remote API in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiError, ContentApi, SearchQuery, SearchResponse, EVERYTHING_FORM};
use crate::document::Document;
use crate::predicate::{Operator, Predicate};

/// Ref of the published documents.
pub const MEMORY_MASTER_REF: &str = "master";

#[derive(Debug, Default)]
struct PreviewRelease {
    main_document: Option<String>,
    documents: Vec<Document>,
}

/// A content API backed by in-memory documents.
#[derive(Debug, Default)]
pub struct MemoryApi {
    documents: Vec<Document>,
    /// Search forms mapped to the content type they contain
    collections: HashMap<String, String>,
    previews: HashMap<String, PreviewRelease>,
    failure: Option<String>,
    submissions: AtomicUsize,
    queries: Mutex<Vec<SearchQuery>>,
}

impl MemoryApi {
    /// Create an empty content source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a document under the master ref.
    pub fn with_document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    /// Expose a search form restricted to one content type.
    pub fn with_collection(mut self, form: impl Into<String>, kind: impl Into<String>) -> Self {
        self.collections.insert(form.into(), kind.into());
        self
    }

    /// Register a preview session. Its documents shadow published ones with
    /// the same id when queried with the preview token as ref.
    pub fn with_preview(
        mut self,
        token: impl Into<String>,
        main_document: Option<&str>,
        documents: Vec<Document>,
    ) -> Self {
        self.previews.insert(
            token.into(),
            PreviewRelease {
                main_document: main_document.map(str::to_string),
                documents,
            },
        );
        self
    }

    /// Make every search fail with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Number of searches submitted so far.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Searches submitted so far, oldest first.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }

    fn documents_for(&self, reference: &str) -> Result<Vec<&Document>, ApiError> {
        if reference == MEMORY_MASTER_REF {
            return Ok(self.documents.iter().collect());
        }

        let release = self
            .previews
            .get(reference)
            .ok_or_else(|| ApiError::Unavailable(format!("unknown ref {}", reference)))?;

        let mut documents: Vec<&Document> = self
            .documents
            .iter()
            .filter(|doc| !release.documents.iter().any(|draft| draft.id == doc.id))
            .collect();
        documents.extend(release.documents.iter());
        Ok(documents)
    }
}

#[async_trait]
impl ContentApi for MemoryApi {
    fn master_ref(&self) -> &str {
        MEMORY_MASTER_REF
    }

    fn has_form(&self, name: &str) -> bool {
        name == EVERYTHING_FORM || self.collections.contains_key(name)
    }

    async fn submit(&self, query: &SearchQuery) -> Result<SearchResponse, ApiError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }

        if let Some(message) = &self.failure {
            return Err(ApiError::Unavailable(message.clone()));
        }
        if !self.has_form(&query.form) {
            return Err(ApiError::MissingForm(query.form.clone()));
        }

        let collection = self.collections.get(&query.form);
        let results: Vec<Document> = self
            .documents_for(&query.reference)?
            .into_iter()
            .filter(|doc| collection.map_or(true, |kind| &doc.kind == kind))
            .filter(|doc| query.filters.iter().all(|p| matches(p, doc)))
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(SearchResponse::from_results(results))
    }

    async fn preview_main_document(&self, token: &str) -> Result<Option<String>, ApiError> {
        self.previews
            .get(token)
            .map(|release| release.main_document.clone())
            .ok_or_else(|| ApiError::Unavailable(format!("unknown preview token {}", token)))
    }
}

fn matches(predicate: &Predicate, doc: &Document) -> bool {
    let fields = field_values(&predicate.path, doc);
    match predicate.op {
        Operator::At => predicate
            .value()
            .is_some_and(|v| fields.iter().any(|f| f == v)),
        Operator::Not => predicate
            .value()
            .is_some_and(|v| fields.iter().all(|f| f != v)),
        Operator::Any => predicate.values.iter().any(|v| fields.contains(v)),
        Operator::Fulltext => predicate.value().is_some_and(|term| {
            let term = term.to_lowercase();
            doc.fragments().any(|(_, fragment)| {
                fragment
                    .as_text()
                    .is_some_and(|text| text.to_lowercase().contains(&term))
            })
        }),
    }
}

fn field_values(path: &str, doc: &Document) -> Vec<String> {
    match path {
        "document.id" => vec![doc.id.clone()],
        "document.type" => vec![doc.kind.clone()],
        "document.tags" => doc.tags.clone(),
        _ => {
            // my.<type>.<field>
            let Some(name) = path.strip_prefix("my.") else {
                return Vec::new();
            };
            if name.ends_with(".uid") {
                return doc.uid.iter().cloned().collect();
            }
            doc.get(name)
                .and_then(|fragment| fragment.as_text())
                .map(|text| vec![text.to_string()])
                .unwrap_or_default()
        }
    }
}
