//! Static generation of site pages.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clutch_adapters::{
    ContentAdapter, ContentError, Listener, PageManifest, RenderContext, RenderError, Request,
    TemplateRenderer,
};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// Configuration for static generation.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Output directory for generated pages
    pub output_dir: PathBuf,
    /// Template directory prefix for page templates
    pub pages_dir: String,
    /// Page type served at the site root
    pub homepage: String,
    /// Pages written as `<name>.html` at the output root
    pub error_pages: Vec<String>,
    /// Number of routes generated at once
    pub concurrency: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            pages_dir: "pages".to_string(),
            homepage: "home".to_string(),
            error_pages: vec!["404".to_string(), "500".to_string()],
            concurrency: 4,
        }
    }
}

/// Errors that can occur while generating or cleaning a route.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to build page context: {0}")]
    Context(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Failed to remove output: {0}")]
    RemoveError(String),
}

/// A page of the site, derived from a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Manifest entry, e.g. `about.html`
    pub page: String,
    /// Content type requested for the page
    pub kind: String,
    /// Public path of the page
    pub slug: String,
    error_page: bool,
}

impl Route {
    /// Derive the route of a `<type>.html` manifest entry.
    pub fn from_page(page: &str, config: &GenerateConfig) -> Option<Self> {
        let kind = page.strip_suffix(".html")?;
        if kind.is_empty() {
            return None;
        }

        let slug = if kind == config.homepage {
            "/".to_string()
        } else {
            format!("/{}/", kind)
        };

        Some(Self {
            page: page.to_string(),
            kind: kind.to_string(),
            slug,
            error_page: config.error_pages.iter().any(|p| p == kind),
        })
    }

    /// Where the rendered page is written under `output_dir`.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        if self.error_page {
            output_dir.join(&self.page)
        } else {
            output_dir
                .join(self.slug.trim_matches('/'))
                .join("index.html")
        }
    }
}

/// What happened to a single route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    /// Rendered with CMS content
    Rendered,
    /// Rendered from its static template without CMS content
    Fallback,
    /// Artifact removed
    Removed,
    /// Artifact already absent
    Skipped,
}

/// A route that completed.
#[derive(Debug)]
pub struct RouteOutcome {
    pub route: Route,
    pub path: PathBuf,
    pub status: RouteStatus,
}

/// A route that failed, with the reason.
#[derive(Debug)]
pub struct FailedRoute {
    pub route: Route,
    pub error: GenerateError,
}

/// Aggregate result of a generate or clean run.
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub completed: Vec<RouteOutcome>,
    pub failed: Vec<FailedRoute>,
    pub duration_ms: u64,
    pub output_dir: PathBuf,
}

impl GenerateReport {
    /// Number of completed routes with `status`.
    pub fn count(&self, status: RouteStatus) -> usize {
        self.completed
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn collect(
        results: Vec<(Route, Result<RouteOutcome, GenerateError>)>,
        output_dir: &Path,
        started: Instant,
    ) -> Self {
        let mut report = Self {
            output_dir: output_dir.to_path_buf(),
            ..Self::default()
        };

        for (route, result) in results {
            match result {
                Ok(outcome) => report.completed.push(outcome),
                Err(error) => {
                    warn!("Route {} failed: {}", route.slug, error);
                    report.failed.push(FailedRoute { route, error });
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        report
    }
}

/// Renders every page of the manifest to static HTML.
pub struct StaticGenerator {
    adapter: Arc<dyn ContentAdapter>,
    manifest: Arc<dyn PageManifest>,
    renderer: Arc<dyn TemplateRenderer>,
    listener: Option<Arc<dyn Listener>>,
    config: GenerateConfig,
}

impl StaticGenerator {
    /// Create a new generator.
    pub fn new(
        adapter: Arc<dyn ContentAdapter>,
        manifest: Arc<dyn PageManifest>,
        renderer: Arc<dyn TemplateRenderer>,
        config: GenerateConfig,
    ) -> Self {
        Self {
            adapter,
            manifest,
            renderer,
            listener: None,
            config,
        }
    }

    /// Hook `listener` into the queries and contexts of every page.
    pub fn with_listener(mut self, listener: Arc<dyn Listener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Routes of the site, in manifest order.
    pub fn routes(&self) -> Vec<Route> {
        self.manifest
            .pages()
            .iter()
            .filter_map(|page| Route::from_page(page, &self.config))
            .collect()
    }

    /// Render every route to the output directory.
    ///
    /// A failing route is recorded in the report and does not stop the others.
    pub async fn generate(&self) -> GenerateReport {
        let started = Instant::now();
        let routes = self.routes();

        info!(
            "Generating {} pages into {}",
            routes.len(),
            self.config.output_dir.display()
        );

        let results = stream::iter(routes)
            .map(|route| async move {
                let result = self.generate_route(&route).await;
                (route, result)
            })
            .buffered(self.config.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        let report = GenerateReport::collect(results, &self.config.output_dir, started);
        info!(
            "Generated {} pages ({} static) in {}ms",
            report.count(RouteStatus::Rendered) + report.count(RouteStatus::Fallback),
            report.count(RouteStatus::Fallback),
            report.duration_ms
        );
        report
    }

    /// Remove the artifact of every route, pruning emptied directories.
    pub async fn clean(&self) -> GenerateReport {
        let started = Instant::now();
        let routes = self.routes();

        let results = stream::iter(routes)
            .map(|route| async move {
                let result = self.clean_route(&route).await;
                (route, result)
            })
            .buffered(self.config.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        let report = GenerateReport::collect(results, &self.config.output_dir, started);
        info!(
            "Removed {} pages ({} already absent) in {}ms",
            report.count(RouteStatus::Removed),
            report.count(RouteStatus::Skipped),
            report.duration_ms
        );
        report
    }

    async fn generate_route(&self, route: &Route) -> Result<RouteOutcome, GenerateError> {
        let request = Request::for_type(&route.kind);
        let listener = self.listener.as_deref();

        let data = self.adapter.get_page(&request, listener).await?;
        let site = self.adapter.site().await?;

        let mut context = RenderContext::new(&route.page);
        context.insert("site", &site.site)?;
        context.insert("navi", &site.navi)?;
        context.insert("item", &data.item)?;
        context.insert("items", &data.items)?;
        context.insert("page", &route.kind)?;
        context.insert("slug", &route.slug)?;

        if let Some(listener) = listener {
            context = listener.context(context, Some(&*site), &request);
        }

        let template = format!(
            "{}/{}",
            self.config.pages_dir.trim_end_matches('/'),
            route.page
        );
        let html = self.renderer.render(&template, &context)?;

        let path = route.output_path(&self.config.output_dir);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GenerateError::WriteError(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, html)
            .await
            .map_err(|e| GenerateError::WriteError(format!("{}: {}", path.display(), e)))?;

        let status = if data.is_empty() {
            RouteStatus::Fallback
        } else {
            RouteStatus::Rendered
        };
        debug!("{} -> {} ({:?})", route.slug, path.display(), status);

        Ok(RouteOutcome {
            route: route.clone(),
            path,
            status,
        })
    }

    async fn clean_route(&self, route: &Route) -> Result<RouteOutcome, GenerateError> {
        let output_dir = &self.config.output_dir;
        let path = route.output_path(output_dir);

        let status = match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                prune_empty_dirs(&path, output_dir).await;
                RouteStatus::Removed
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RouteStatus::Skipped,
            Err(e) => {
                return Err(GenerateError::RemoveError(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };
        debug!("{} -> {} ({:?})", route.slug, path.display(), status);

        Ok(RouteOutcome {
            route: route.clone(),
            path,
            status,
        })
    }
}

/// Remove the now empty parents of `path` below `root`.
async fn prune_empty_dirs(path: &Path, root: &Path) {
    let mut dir = path.parent();
    while let Some(current) = dir {
        if current == root || !current.starts_with(root) {
            break;
        }
        // Fails on non-empty directories, which ends the walk.
        if tokio::fs::remove_dir(current).await.is_err() {
            break;
        }
        dir = current.parent();
    }
}
