//! Removal of generated pages.

use std::path::PathBuf;

use anyhow::Result;

use crate::config::ConfigFile;

/// Run the clean command.
pub async fn run(config: &ConfigFile, output: Option<PathBuf>) -> Result<()> {
    // Cleaning never talks to the content API.
    let endpoint = config.api.endpoint.as_deref().unwrap_or_default();

    let generator = super::build_generator(config, endpoint, output, None)?;
    let report = generator.clean().await;

    if !report.is_success() {
        anyhow::bail!("{} pages could not be removed", report.failed.len());
    }

    Ok(())
}
