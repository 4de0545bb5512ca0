//! Process-scoped cache of the API handle, site context and navigation.

use std::fmt;
use std::sync::Arc;

use clutch_prismic::ContentApi;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::navigation::{normalize_site, NavigationError, NavigationItem, SiteContext, SITE_TYPE};
use crate::traits::{ApiConnector, ContentError};

/// One resolved snapshot. Site and navigation are always set together.
pub struct SiteCache {
    /// API handle the snapshot was resolved with
    pub api: Arc<dyn ContentApi>,
    pub site: SiteContext,
    pub navi: Vec<NavigationItem>,
}

impl SiteCache {
    /// Navigation entry whose uid names the requested content type.
    pub fn navi_for(&self, kind: &str) -> Option<&NavigationItem> {
        self.navi.iter().rev().find(|item| item.uid == kind)
    }
}

impl fmt::Debug for SiteCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteCache")
            .field("master_ref", &self.api.master_ref())
            .field("site", &self.site)
            .field("navi", &self.navi)
            .finish()
    }
}

/// Holds the current [`SiteCache`], resolved lazily and replaced wholesale.
#[derive(Debug, Default)]
pub struct ContentCache {
    inner: RwLock<Option<Arc<SiteCache>>>,
}

impl ContentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved snapshot, if any.
    pub async fn current(&self) -> Option<Arc<SiteCache>> {
        self.inner.read().await.clone()
    }

    /// Return the cached snapshot, resolving it first if needed.
    ///
    /// Concurrent first calls wait on the write lock, so the site document is
    /// fetched once. A failed resolution leaves the cache empty.
    pub async fn resolve(
        &self,
        connector: &dyn ApiConnector,
        homepage: &str,
    ) -> Result<Arc<SiteCache>, ContentError> {
        if let Some(cached) = self.current().await {
            debug!("Using cached site context");
            return Ok(cached);
        }

        let mut slot = self.inner.write().await;
        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }

        let api = connector.connect().await?;
        let document = api
            .get_single(SITE_TYPE)
            .await?
            .ok_or(NavigationError::MissingSite)?;
        let (site, navi) = normalize_site(&document, homepage)?;

        info!(
            "Resolved site context ({} keys, {} navigation items)",
            site.data.len(),
            navi.len()
        );

        let resolved = Arc::new(SiteCache { api, site, navi });
        *slot = Some(Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Drop the snapshot so the next resolution refetches it.
    pub async fn invalidate(&self) {
        self.inner.write().await.take();
        debug!("Site context invalidated");
    }
}
