//! Content adapter for Prismic.

use std::sync::Arc;

use async_trait::async_trait;
use clutch_prismic::{default_link_resolver, Api, ApiError, ContentApi, Document, LinkResolver};
use tracing::{debug, info, warn};

use crate::cache::{ContentCache, SiteCache};
use crate::context::RenderContext;
use crate::listener::Listener;
use crate::preview::{Preview, PreviewCookie};
use crate::query;
use crate::request::Request;
use crate::traits::{
    ApiConnector, ApiPayload, ApiResponse, ContentAdapter, ContentError, PageData, PageManifest,
    TemplateRenderer,
};

/// Settings of the Prismic adapter.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Uid of the homepage
    pub homepage: String,

    /// Template directory of partials, relative to the template root
    pub partials_dir: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            homepage: "home".to_string(),
            partials_dir: "partials".to_string(),
        }
    }
}

/// Connects to a Prismic repository over HTTP.
#[derive(Debug, Clone)]
pub struct PrismicConnector {
    endpoint: String,
    access_token: Option<String>,
}

impl PrismicConnector {
    /// Create a connector for the API entry point `endpoint`.
    pub fn new(endpoint: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_token,
        }
    }
}

#[async_trait]
impl ApiConnector for PrismicConnector {
    async fn connect(&self) -> Result<Arc<dyn ContentApi>, ApiError> {
        let api: Arc<dyn ContentApi> =
            Arc::new(Api::get(&self.endpoint, self.access_token.as_deref()).await?);
        Ok(api)
    }
}

/// Resolves Prismic content into pages, API payloads, previews and partials.
pub struct PrismicAdapter {
    connector: Arc<dyn ApiConnector>,
    cache: Arc<ContentCache>,
    manifest: Arc<dyn PageManifest>,
    renderer: Arc<dyn TemplateRenderer>,
    link_resolver: Arc<LinkResolver>,
    config: AdapterConfig,
}

impl PrismicAdapter {
    /// Create a new adapter.
    pub fn new(
        connector: Arc<dyn ApiConnector>,
        cache: Arc<ContentCache>,
        manifest: Arc<dyn PageManifest>,
        renderer: Arc<dyn TemplateRenderer>,
        config: AdapterConfig,
    ) -> Self {
        Self {
            connector,
            cache,
            manifest,
            renderer,
            link_resolver: Arc::new(default_link_resolver),
            config,
        }
    }

    /// Use `resolver` to map previewed documents to site paths.
    pub fn with_link_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&Document) -> String + Send + Sync + 'static,
    {
        let resolver: Arc<LinkResolver> = Arc::new(resolver);
        self.link_resolver = resolver;
        self
    }

    /// The cache shared with other holders of the same context.
    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    /// API handle of the cached snapshot, connecting only when nothing is cached.
    async fn api(&self, cache: Option<&SiteCache>) -> Result<Arc<dyn ContentApi>, ContentError> {
        match cache {
            Some(site) => Ok(Arc::clone(&site.api)),
            None => Ok(self.connector.connect().await?),
        }
    }

    async fn api_response(
        &self,
        request: &Request,
        listener: Option<&dyn Listener>,
    ) -> Result<ApiResponse, ContentError> {
        let kind = request
            .params
            .kind
            .as_deref()
            .ok_or(ContentError::MissingType)?;
        let cache = self.cache.current().await;
        let api = self.api(cache.as_deref()).await?;

        let filters = query::type_filters(api.as_ref(), kind, None);
        let results = query::run(&api, request, kind, filters, listener, cache.as_deref())
            .await?
            .results;

        let data = match &request.params.uid {
            Some(uid) => PageData {
                item: find_document(uid, &results).cloned(),
                items: None,
            },
            None => PageData {
                item: None,
                items: Some(results),
            },
        };

        if request.wants_html() {
            let html = self.get_partial(request, &data, listener).await?;
            return Ok(ApiResponse::Html(html));
        }

        let payload = match request.params.uid {
            Some(_) => ApiPayload::Document {
                document: data.item,
            },
            None => ApiPayload::Documents {
                documents: data.items.unwrap_or_default(),
            },
        };
        Ok(ApiResponse::Json(payload))
    }
}

#[async_trait]
impl ContentAdapter for PrismicAdapter {
    fn name(&self) -> &'static str {
        "prismic"
    }

    async fn site(&self) -> Result<Arc<SiteCache>, ContentError> {
        self.cache
            .resolve(self.connector.as_ref(), &self.config.homepage)
            .await
    }

    async fn get_api(&self, request: &Request, listener: Option<&dyn Listener>) -> ApiResponse {
        match self.api_response(request, listener).await {
            Ok(response) => response,
            Err(e) => {
                warn!("API request failed: {}", e);
                ApiResponse::Json(ApiPayload::Error {
                    error: e.to_string(),
                })
            }
        }
    }

    async fn get_page(
        &self,
        request: &Request,
        listener: Option<&dyn Listener>,
    ) -> Result<PageData, ContentError> {
        let site = self.site().await?;

        let Some(kind) = request.params.kind.as_deref() else {
            return Ok(PageData::default());
        };

        let navi = site.navi_for(kind);
        let filters = query::type_filters(site.api.as_ref(), kind, navi);
        let results = query::run(&site.api, request, kind, filters, listener, Some(&*site))
            .await?
            .results;

        if results.is_empty() {
            let page = format!("{}.html", kind);
            if self.manifest.contains(&page) {
                debug!("No content for {}, serving static {}", kind, page);
                return Ok(PageData::default());
            }
            return Err(ContentError::NoContent(kind.to_string()));
        }

        let wanted = navi
            .map(|item| item.uid.as_str())
            .or(request.params.uid.as_deref());
        let item = match wanted {
            Some(uid) => Some(
                find_document(uid, &results)
                    .cloned()
                    .ok_or_else(|| ContentError::DocumentNotFound(uid.to_string()))?,
            ),
            None => None,
        };

        Ok(PageData {
            item,
            items: Some(results),
        })
    }

    async fn get_preview(&self, request: &Request) -> Result<Preview, ContentError> {
        let token = request
            .query
            .token
            .as_deref()
            .ok_or(ContentError::MissingPreviewToken)?;

        let cache = self.cache.current().await;
        let api = self.api(cache.as_deref()).await?;
        let redirect = api
            .preview_session(token, self.link_resolver.as_ref(), "/")
            .await?;

        info!("Preview session redirects to {}", redirect);

        Ok(Preview {
            redirect,
            cookie: PreviewCookie::new(token),
        })
    }

    async fn get_partial(
        &self,
        request: &Request,
        data: &PageData,
        listener: Option<&dyn Listener>,
    ) -> Result<String, ContentError> {
        let partial = request
            .query
            .template
            .as_deref()
            .or(request.params.kind.as_deref())
            .ok_or(ContentError::MissingType)?;

        let mut context = RenderContext::new(partial);
        if let Some(item) = &data.item {
            context.insert("item", item)?;
        }
        if let Some(items) = &data.items {
            context.insert("items", items)?;
        }

        if let Some(listener) = listener {
            let cache = self.cache.current().await;
            context = listener.context(context, cache.as_deref(), request);
        }

        let template = format!(
            "{}/{}.html",
            self.config.partials_dir.trim_end_matches('/'),
            partial
        );
        Ok(self.renderer.render(&template, &context)?)
    }
}

fn find_document<'a>(uid: &str, documents: &'a [Document]) -> Option<&'a Document> {
    documents
        .iter()
        .find(|doc| doc.uid.as_deref() == Some(uid))
}
