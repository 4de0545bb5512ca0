//! Content API metadata, search queries and the HTTP client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::Document;
use crate::predicate::{to_query_param, Predicate};

/// Name of the form that searches across every content type.
pub const EVERYTHING_FORM: &str = "everything";

/// Cookie carrying the preview ref of a preview session.
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

/// Default page size of a search request.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Errors returned by the content API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Content API returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode content API response: {0}")]
    Decode(String),

    #[error("Unknown search form: {0}")]
    MissingForm(String),

    #[error("Content API exposes no master ref")]
    NoMasterRef,

    #[error("Content API unavailable: {0}")]
    Unavailable(String),

    #[error("Preview token does not belong to this repository: {0}")]
    ForeignPreviewToken(String),
}

/// Repository metadata served by the API entry point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiData {
    /// Content snapshots
    #[serde(default)]
    pub refs: Vec<Ref>,

    /// Named search forms
    #[serde(default)]
    pub forms: HashMap<String, Form>,

    /// Content type ids to labels
    #[serde(default)]
    pub types: HashMap<String, String>,
}

impl ApiData {
    /// The currently published ref.
    pub fn master(&self) -> Option<&Ref> {
        self.refs.iter().find(|r| r.is_master_ref)
    }
}

/// A content snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ref {
    pub id: String,

    #[serde(rename = "ref")]
    pub reference: String,

    #[serde(default)]
    pub label: String,

    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// A named search form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_method")]
    pub method: String,

    /// Search endpoint URL
    pub action: String,

    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// A search request against one form, pinned to one ref.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Form to query
    pub form: String,

    /// Filter terms, all of which must match
    pub filters: Vec<Predicate>,

    /// Results per page
    pub page_size: u32,

    /// Snapshot ref
    pub reference: String,
}

impl SearchQuery {
    /// Create a query against `form` pinned to `reference`.
    pub fn new(form: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            filters: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            reference: reference.into(),
        }
    }

    /// Set the page size.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Add filter terms.
    pub fn query(mut self, filters: impl IntoIterator<Item = Predicate>) -> Self {
        self.filters.extend(filters);
        self
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,

    #[serde(default)]
    pub results_per_page: u32,

    #[serde(default)]
    pub total_results_size: u32,

    #[serde(default)]
    pub total_pages: u32,

    #[serde(default)]
    pub next_page: Option<String>,

    #[serde(default)]
    pub results: Vec<Document>,
}

impl SearchResponse {
    /// A single page holding `results`.
    pub fn from_results(results: Vec<Document>) -> Self {
        let size = results.len() as u32;
        Self {
            page: 1,
            results_per_page: size,
            total_results_size: size,
            total_pages: 1,
            next_page: None,
            results,
        }
    }
}

/// Maps a document to the site path it is published under.
pub type LinkResolver = dyn Fn(&Document) -> String + Send + Sync;

/// Default link resolver: `/{type}/{uid}/`.
pub fn default_link_resolver(doc: &Document) -> String {
    format!("/{}/{}/", doc.kind, doc.uid.as_deref().unwrap_or(&doc.id))
}

/// Operations of a connected content API.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Ref of the published content.
    fn master_ref(&self) -> &str;

    /// Whether the API exposes a search form with this name.
    fn has_form(&self, name: &str) -> bool;

    /// Run a search query.
    async fn submit(&self, query: &SearchQuery) -> Result<SearchResponse, ApiError>;

    /// Resolve the main document id of a preview session token.
    async fn preview_main_document(&self, token: &str) -> Result<Option<String>, ApiError>;

    /// Fetch the single document of a singleton type.
    async fn get_single(&self, kind: &str) -> Result<Option<Document>, ApiError> {
        let query = SearchQuery::new(EVERYTHING_FORM, self.master_ref())
            .page_size(1)
            .query([Predicate::at("document.type", kind)]);
        let response = self.submit(&query).await?;
        Ok(response.results.into_iter().next())
    }

    /// Resolve a preview token to the path of the previewed document.
    ///
    /// Falls back to `default_url` when the session has no main document
    /// or the document is not visible under the preview ref.
    async fn preview_session(
        &self,
        token: &str,
        link_resolver: &LinkResolver,
        default_url: &str,
    ) -> Result<String, ApiError> {
        let Some(id) = self.preview_main_document(token).await? else {
            return Ok(default_url.to_string());
        };

        let query = SearchQuery::new(EVERYTHING_FORM, token)
            .page_size(1)
            .query([Predicate::at("document.id", id)]);
        let response = self.submit(&query).await?;

        Ok(response
            .results
            .first()
            .map(link_resolver)
            .unwrap_or_else(|| default_url.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct PreviewSession {
    #[serde(rename = "mainDocument", default)]
    main_document: Option<String>,
}

/// Host and port a repository serves previews from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Origin {
    host: String,
    port: Option<u16>,
}

impl Origin {
    fn of(url: &Url) -> Option<Self> {
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        // Preview sessions live on the repository host, not its CDN alias.
        let host = url.host_str()?.replacen(".cdn.", ".", 1);
        Some(Self {
            host,
            port: url.port_or_known_default(),
        })
    }
}

/// HTTP client bound to one repository.
pub struct Api {
    client: Client,
    access_token: Option<String>,
    master: String,
    data: ApiData,
    origin: Option<Origin>,
}

impl Api {
    /// Connect to the API entry point with a default HTTP client.
    pub async fn get(endpoint: &str, access_token: Option<&str>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("clutch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, endpoint, access_token).await
    }

    /// Connect to the API entry point with the given HTTP client.
    pub async fn with_client(
        client: Client,
        endpoint: &str,
        access_token: Option<&str>,
    ) -> Result<Self, ApiError> {
        let mut request = client.get(endpoint);
        if let Some(token) = access_token {
            request = request.query(&[("access_token", token)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }

        let data: ApiData = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let master = data
            .master()
            .map(|r| r.reference.clone())
            .ok_or(ApiError::NoMasterRef)?;

        debug!(
            "Connected to {} ({} refs, {} forms)",
            endpoint,
            data.refs.len(),
            data.forms.len()
        );

        let origin = Url::parse(endpoint).ok().as_ref().and_then(Origin::of);

        Ok(Self {
            client,
            access_token: access_token.map(str::to_string),
            master,
            data,
            origin,
        })
    }

    /// Repository metadata.
    pub fn data(&self) -> &ApiData {
        &self.data
    }

    /// Parse a preview token, accepting only URLs of this repository.
    fn preview_url(&self, token: &str) -> Result<Url, ApiError> {
        let url =
            Url::parse(token).map_err(|_| ApiError::ForeignPreviewToken(token.to_string()))?;
        match (&self.origin, Origin::of(&url)) {
            (Some(repository), Some(origin)) if *repository == origin => Ok(url),
            _ => {
                warn!("Rejected preview token for a foreign host: {}", token);
                Err(ApiError::ForeignPreviewToken(token.to_string()))
            }
        }
    }
}

#[async_trait]
impl ContentApi for Api {
    fn master_ref(&self) -> &str {
        &self.master
    }

    fn has_form(&self, name: &str) -> bool {
        self.data.forms.contains_key(name)
    }

    async fn submit(&self, query: &SearchQuery) -> Result<SearchResponse, ApiError> {
        let form = self
            .data
            .forms
            .get(&query.form)
            .ok_or_else(|| ApiError::MissingForm(query.form.clone()))?;

        let mut params = vec![
            ("ref", query.reference.clone()),
            ("pageSize", query.page_size.to_string()),
        ];
        if !query.filters.is_empty() {
            params.push(("q", to_query_param(&query.filters)));
        }
        if let Some(token) = &self.access_token {
            params.push(("access_token", token.clone()));
        }

        debug!("Submitting {} query with {} filters", query.form, query.filters.len());

        let response = self.client.get(&form.action).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: form.action.clone(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn preview_main_document(&self, token: &str) -> Result<Option<String>, ApiError> {
        let url = self.preview_url(token)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: token.to_string(),
            });
        }

        let session: PreviewSession = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(session.main_document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{any, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_entry_point(server: &MockServer) {
        let body = json!({
            "refs": [
                { "id": "master", "ref": "master-ref", "label": "Master", "isMasterRef": true }
            ],
            "forms": {
                "everything": {
                    "method": "GET",
                    "action": format!("{}/api/documents/search", server.uri()),
                    "fields": {}
                },
                "work": {
                    "method": "GET",
                    "action": format!("{}/api/documents/search", server.uri()),
                    "fields": {}
                }
            },
            "types": { "page": "Page", "site": "Site" }
        });

        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn connects_and_reads_master_ref() {
        let server = MockServer::start().await;
        mount_entry_point(&server).await;

        let api = Api::get(&format!("{}/api", server.uri()), None).await.unwrap();

        assert_eq!(api.master_ref(), "master-ref");
        assert!(api.has_form("work"));
        assert!(!api.has_form("page"));
        assert_eq!(api.data().types.len(), 2);
    }

    #[tokio::test]
    async fn submits_query_with_filters() {
        let server = MockServer::start().await;
        mount_entry_point(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/documents/search"))
            .and(query_param("ref", "master-ref"))
            .and(query_param("pageSize", "100"))
            .and(query_param("q", r#"[[:d = at(document.type, "page")]]"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "results_per_page": 100,
                "total_results_size": 1,
                "total_pages": 1,
                "next_page": null,
                "results": [{ "id": "1", "uid": "about", "type": "page", "data": {} }]
            })))
            .mount(&server)
            .await;

        let api = Api::get(&format!("{}/api", server.uri()), None).await.unwrap();
        let query = SearchQuery::new(EVERYTHING_FORM, api.master_ref())
            .page_size(100)
            .query([Predicate::at("document.type", "page")]);

        let response = api.submit(&query).await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].uid.as_deref(), Some("about"));
    }

    #[tokio::test]
    async fn reports_unknown_form() {
        let server = MockServer::start().await;
        mount_entry_point(&server).await;

        let api = Api::get(&format!("{}/api", server.uri()), None).await.unwrap();
        let err = api
            .submit(&SearchQuery::new("missing", "master-ref"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::MissingForm(name) if name == "missing"));
    }

    #[tokio::test]
    async fn rejects_entry_point_without_master() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "refs": [], "forms": {} })))
            .mount(&server)
            .await;

        let result = Api::get(&format!("{}/api", server.uri()), None).await;

        assert!(matches!(result, Err(ApiError::NoMasterRef)));
    }

    #[tokio::test]
    async fn resolves_preview_session() {
        let server = MockServer::start().await;
        mount_entry_point(&server).await;

        let token = format!("{}/previews/abc", server.uri());
        Mock::given(method("GET"))
            .and(path("/previews/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mainDocument": "D1" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/documents/search"))
            .and(query_param("ref", token.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "id": "D1", "uid": "spring", "type": "work", "data": {} }]
            })))
            .mount(&server)
            .await;

        let api = Api::get(&format!("{}/api", server.uri()), None).await.unwrap();
        let url = api
            .preview_session(&token, &default_link_resolver, "/")
            .await
            .unwrap();

        assert_eq!(url, "/work/spring/");
    }

    #[tokio::test]
    async fn refuses_preview_token_of_another_host() {
        let server = MockServer::start().await;
        mount_entry_point(&server).await;
        let other = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mainDocument": "D1" })))
            .expect(0)
            .mount(&other)
            .await;

        let api = Api::get(&format!("{}/api", server.uri()), None).await.unwrap();
        let result = api
            .preview_session(
                &format!("{}/internal/secret", other.uri()),
                &default_link_resolver,
                "/",
            )
            .await;

        assert!(matches!(result, Err(ApiError::ForeignPreviewToken(_))));
        assert!(other.received_requests().await.unwrap().is_empty());
    }

    fn offline_api(endpoint: &str) -> Api {
        Api {
            client: Client::new(),
            access_token: None,
            master: "master-ref".to_string(),
            data: ApiData::default(),
            origin: Url::parse(endpoint).ok().as_ref().and_then(Origin::of),
        }
    }

    #[test]
    fn preview_tokens_must_share_the_repository_origin() {
        let api = offline_api("https://clutch.cdn.prismic.io/api/v2");

        assert!(api.preview_url("https://clutch.prismic.io/previews/abc").is_ok());
        assert!(api.preview_url("https://clutch.cdn.prismic.io/previews/abc").is_ok());
        assert!(api.preview_url("https://evil.example/previews/abc").is_err());
        assert!(api.preview_url("https://clutch.prismic.io:8443/previews/abc").is_err());
        assert!(api.preview_url("file:///etc/passwd").is_err());
        assert!(api.preview_url("not a url").is_err());
    }
}
