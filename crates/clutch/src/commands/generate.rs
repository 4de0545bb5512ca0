//! Static site generation command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::{ConfigFile, ENDPOINT_ENV};

/// Run the generate command.
pub async fn run(
    config: &ConfigFile,
    output: Option<PathBuf>,
    concurrency: Option<usize>,
) -> Result<()> {
    tracing::info!("Generating static site...");

    let endpoint = config.api.endpoint.as_deref().with_context(|| {
        format!(
            "No content API endpoint. Set [api] endpoint in clutch.toml or {}.",
            ENDPOINT_ENV
        )
    })?;

    let generator = super::build_generator(config, endpoint, output, concurrency)?;
    let report = generator.generate().await;

    tracing::info!("Output: {}", report.output_dir.display());

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} pages failed",
            report.failed.len(),
            report.failed.len() + report.completed.len()
        );
    }

    Ok(())
}
