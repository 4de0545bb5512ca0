//! Caller-supplied hooks for query and context overrides.

use std::fmt;
use std::sync::Arc;

use clutch_prismic::{ApiError, ContentApi, Predicate, SearchResponse};
use futures::future::BoxFuture;

use crate::cache::SiteCache;
use crate::context::RenderContext;
use crate::request::Request;

/// What a query hook hands back.
pub enum QueryOverride {
    /// Filters to attach to the standard query before it is submitted
    Filters(Vec<Predicate>),

    /// A computation producing the final result set; nothing is submitted
    Pending(BoxFuture<'static, Result<SearchResponse, ApiError>>),
}

impl fmt::Debug for QueryOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOverride::Filters(filters) => f.debug_tuple("Filters").field(filters).finish(),
            QueryOverride::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Hooks into content resolution. Both methods default to identity.
pub trait Listener: Send + Sync {
    /// Replace the base filters of a query, or take over the query entirely.
    fn query(
        &self,
        _api: &Arc<dyn ContentApi>,
        filters: Vec<Predicate>,
        _cache: Option<&SiteCache>,
        _request: &Request,
    ) -> QueryOverride {
        QueryOverride::Filters(filters)
    }

    /// Adjust the context a template is rendered with.
    fn context(
        &self,
        context: RenderContext,
        _cache: Option<&SiteCache>,
        _request: &Request,
    ) -> RenderContext {
        context
    }
}
