//! Content adapters for headless CMS backends.
//!
//! An adapter resolves remote content into the shapes the rest of the site
//! consumes: API payloads, page data, preview redirects and rendered
//! partials. The site document is resolved once into a [`SiteCache`] holding
//! the site context and navigation; queries are built by [`query`] and can be
//! overridden by a caller-supplied [`Listener`].

pub mod cache;
pub mod context;
pub mod listener;
pub mod navigation;
pub mod preview;
pub mod prismic;
pub mod query;
pub mod request;
pub mod traits;

#[cfg(test)]
mod testing;

pub use cache::{ContentCache, SiteCache};
pub use context::RenderContext;
pub use listener::{Listener, QueryOverride};
pub use navigation::{normalize_site, NavigationError, NavigationItem, SiteContext};
pub use preview::{Preview, PreviewCookie, PREVIEW_MAX_AGE};
pub use prismic::{AdapterConfig, PrismicAdapter, PrismicConnector};
pub use request::{Request, RequestParams, RequestQuery};
pub use traits::{
    ApiConnector, ApiPayload, ApiResponse, ContentAdapter, ContentError, PageData, PageManifest,
    RenderError, TemplateRenderer,
};
