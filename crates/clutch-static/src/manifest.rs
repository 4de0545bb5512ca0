//! Static page manifest read from the pages directory.

use std::path::Path;

use clutch_adapters::PageManifest;
use walkdir::WalkDir;

/// Errors that can occur while reading the pages directory.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Pages directory not found: {0}")]
    NotFound(String),

    #[error("Failed to read pages directory: {0}")]
    ReadError(String),
}

/// Page templates known to the site, named `<type>.html`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticPages {
    pages: Vec<String>,
}

impl StaticPages {
    /// List the `.html` files directly inside `dir`, sorted by name.
    pub fn scan(dir: &Path) -> Result<Self, ManifestError> {
        if !dir.exists() {
            return Err(ManifestError::NotFound(dir.display().to_string()));
        }

        let mut pages = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| ManifestError::ReadError(e.to_string()))?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                pages.push(name.to_string());
            }
        }
        pages.sort();

        tracing::debug!("Found {} static pages in {}", pages.len(), dir.display());

        Ok(Self { pages })
    }

    /// A manifest with the given page identifiers, in order.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }
}

impl PageManifest for StaticPages {
    fn pages(&self) -> &[String] {
        &self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn scans_html_pages() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("home.html"), "").unwrap();
        fs::write(temp.path().join("about.html"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        fs::create_dir_all(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested/deep.html"), "").unwrap();

        let manifest = StaticPages::scan(temp.path()).unwrap();

        assert_eq!(manifest.pages(), ["about.html", "home.html"]);
        assert!(manifest.contains("home.html"));
        assert!(!manifest.contains("deep.html"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let temp = tempdir().unwrap();

        let result = StaticPages::scan(&temp.path().join("pages"));

        assert!(matches!(result, Err(ManifestError::NotFound(_))));
    }
}
