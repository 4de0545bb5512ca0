//! Trait definitions for content adapters and their collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use clutch_prismic::{ApiError, ContentApi, Document};
use serde::Serialize;

use crate::cache::SiteCache;
use crate::context::RenderContext;
use crate::listener::Listener;
use crate::navigation::NavigationError;
use crate::preview::Preview;
use crate::request::Request;

/// Data resolved for a page: the matched document and the full result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageData {
    /// Document matching the requested uid
    pub item: Option<Document>,

    /// Every document returned by the query
    pub items: Option<Vec<Document>>,
}

impl PageData {
    /// True for pages served without CMS content.
    pub fn is_empty(&self) -> bool {
        self.item.is_none() && self.items.is_none()
    }
}

/// JSON body of an API response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiPayload {
    /// `/:type/:uid`
    Document { document: Option<Document> },

    /// `/:type`
    Documents { documents: Vec<Document> },

    /// Any failure, reported as data
    Error { error: String },
}

/// Result of an API request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(ApiPayload),
    Html(String),
}

impl ApiResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ApiResponse::Json(ApiPayload::Error { .. }))
    }
}

/// Errors that can occur while resolving content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Prismic has no data for the content-type \"{0}\".")]
    NoContent(String),

    #[error("The document with UID \"{0}\" could not be found by Prismic.")]
    DocumentNotFound(String),

    #[error("Request has no content type")]
    MissingType,

    #[error("Request has no preview token")]
    MissingPreviewToken,

    #[error(transparent)]
    Query(#[from] ApiError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to build render context: {0}")]
    Context(#[from] serde_json::Error),
}

/// A template failed to render.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed to render template {template}: {message}")]
pub struct RenderError {
    pub template: String,
    pub message: String,
}

/// Renders a named template with a context.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, RenderError>;
}

/// Known static pages, named `<type>.html`.
pub trait PageManifest: Send + Sync {
    /// Page identifiers in manifest order.
    fn pages(&self) -> &[String];

    fn contains(&self, page: &str) -> bool {
        self.pages().iter().any(|p| p == page)
    }
}

impl PageManifest for Vec<String> {
    fn pages(&self) -> &[String] {
        self
    }
}

/// Produces a connected content API handle.
#[async_trait]
pub trait ApiConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ContentApi>, ApiError>;
}

#[async_trait]
impl<T: ContentApi + 'static> ApiConnector for Arc<T> {
    async fn connect(&self) -> Result<Arc<dyn ContentApi>, ApiError> {
        let api: Arc<dyn ContentApi> = self.clone();
        Ok(api)
    }
}

/// Trait for CMS-specific content adapters.
///
/// Every adapter resolves its backend's content into the same shapes:
/// [`ApiResponse`] for machine consumers, [`PageData`] for pages,
/// [`Preview`] for preview sessions and rendered partials.
#[async_trait]
pub trait ContentAdapter: Send + Sync {
    /// Backend identifier (e.g. "prismic")
    fn name(&self) -> &'static str;

    /// Site context and navigation, resolving them on first use.
    async fn site(&self) -> Result<Arc<SiteCache>, ContentError>;

    /// Resolve a collection or a single document for the API.
    ///
    /// Never fails: errors are returned as [`ApiPayload::Error`].
    async fn get_api(&self, request: &Request, listener: Option<&dyn Listener>) -> ApiResponse;

    /// Resolve the data needed to render a page.
    async fn get_page(
        &self,
        request: &Request,
        listener: Option<&dyn Listener>,
    ) -> Result<PageData, ContentError>;

    /// Exchange a preview token for a redirect target and a session cookie.
    async fn get_preview(&self, request: &Request) -> Result<Preview, ContentError>;

    /// Render the partial template of a request with resolved data.
    async fn get_partial(
        &self,
        request: &Request,
        data: &PageData,
        listener: Option<&dyn Listener>,
    ) -> Result<String, ContentError>;
}
