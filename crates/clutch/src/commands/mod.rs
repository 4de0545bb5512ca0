pub mod clean;
pub mod generate;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clutch_adapters::{
    AdapterConfig, ContentAdapter, ContentCache, PageManifest, PrismicAdapter, PrismicConnector,
    TemplateRenderer,
};
use clutch_static::{GenerateConfig, StaticGenerator, StaticPages, TemplateEngine};

use crate::config::ConfigFile;

/// Wire the content adapter, templates and manifest into a generator.
pub(crate) fn build_generator(
    config: &ConfigFile,
    endpoint: &str,
    output: Option<PathBuf>,
    concurrency: Option<usize>,
) -> Result<StaticGenerator> {
    let template_dir = PathBuf::from(&config.template.dir);
    let pages_dir = template_dir.join(&config.template.pages_dir);

    let manifest: Arc<dyn PageManifest> = Arc::new(
        StaticPages::scan(&pages_dir)
            .with_context(|| format!("Failed to read pages from {}", pages_dir.display()))?,
    );
    let renderer: Arc<dyn TemplateRenderer> = Arc::new(TemplateEngine::with_dir(&template_dir));

    let adapter: Arc<dyn ContentAdapter> = Arc::new(PrismicAdapter::new(
        Arc::new(PrismicConnector::new(
            endpoint,
            config.api.access_token.clone(),
        )),
        Arc::new(ContentCache::new()),
        manifest.clone(),
        renderer.clone(),
        AdapterConfig {
            homepage: config.site.homepage.clone(),
            partials_dir: config.template.partials_dir.clone(),
        },
    ));

    let generate = GenerateConfig {
        output_dir: output.unwrap_or_else(|| PathBuf::from(&config.generate.output)),
        pages_dir: config.template.pages_dir.clone(),
        homepage: config.site.homepage.clone(),
        error_pages: config.generate.error_pages.clone(),
        concurrency: concurrency.unwrap_or(config.generate.concurrency),
    };

    Ok(StaticGenerator::new(adapter, manifest, renderer, generate))
}
