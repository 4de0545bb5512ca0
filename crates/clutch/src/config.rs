//! Configuration file (clutch.toml).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable holding the content API endpoint.
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ACCESS";

/// Environment variable holding the content API access token.
pub const TOKEN_ENV: &str = "PRISMIC_API_TOKEN";

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default, rename = "static")]
    pub generate: StaticConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct SiteConfig {
    /// Content type served at the site root
    #[serde(default = "default_homepage")]
    pub homepage: String,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ApiConfig {
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct TemplateConfig {
    #[serde(default = "default_template_dir")]
    pub dir: String,
    /// Page templates, relative to `dir`
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,
    /// Partial templates, relative to `dir`
    #[serde(default = "default_partials_dir")]
    pub partials_dir: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct StaticConfig {
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_error_pages")]
    pub error_pages: Vec<String>,
}

fn default_homepage() -> String {
    "home".to_string()
}
fn default_template_dir() -> String {
    "template".to_string()
}
fn default_pages_dir() -> String {
    "pages".to_string()
}
fn default_partials_dir() -> String {
    "partials".to_string()
}
fn default_output() -> String {
    "static".to_string()
}
fn default_concurrency() -> usize {
    4
}
fn default_error_pages() -> Vec<String> {
    vec!["404".to_string(), "500".to_string()]
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            homepage: default_homepage(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: default_template_dir(),
            pages_dir: default_pages_dir(),
            partials_dir: default_partials_dir(),
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            concurrency: default_concurrency(),
            error_pages: default_error_pages(),
        }
    }
}

impl ConfigFile {
    /// Fill API settings missing from the file from `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api.endpoint.is_none() {
            self.api.endpoint = lookup(ENDPOINT_ENV);
        }
        if self.api.access_token.is_none() {
            self.api.access_token = lookup(TOKEN_ENV);
        }
        self
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        config
    } else {
        ConfigFile::default()
    };

    Ok(config.with_env(|key| std::env::var(key).ok()))
}
