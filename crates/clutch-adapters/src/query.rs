//! Query construction with listener overrides.

use std::sync::Arc;

use clutch_prismic::{
    ApiError, ContentApi, Predicate, SearchQuery, SearchResponse, EVERYTHING_FORM,
};
use tracing::debug;

use crate::cache::SiteCache;
use crate::listener::{Listener, QueryOverride};
use crate::navigation::NavigationItem;
use crate::request::Request;

/// Page size of every content query.
pub const PAGE_SIZE: u32 = 100;

/// Ref a request is pinned to: the preview cookie, else the master ref.
pub fn resolve_ref(api: &dyn ContentApi, request: &Request) -> String {
    request
        .preview_ref()
        .unwrap_or_else(|| api.master_ref())
        .to_string()
}

/// Query against `collection` when the API exposes it as a search form,
/// against `everything` otherwise.
pub fn form_for(api: &dyn ContentApi, request: &Request, collection: &str) -> SearchQuery {
    let form = if api.has_form(collection) {
        collection
    } else {
        EVERYTHING_FORM
    };
    SearchQuery::new(form, resolve_ref(api, request)).page_size(PAGE_SIZE)
}

/// Base filters for a content type.
///
/// A navigation entry pins its exact document. Search form collections are
/// implicitly typed and get no type filter.
pub fn type_filters(
    api: &dyn ContentApi,
    kind: &str,
    navi: Option<&NavigationItem>,
) -> Vec<Predicate> {
    match navi {
        Some(item) => vec![
            Predicate::at("document.type", &item.kind),
            Predicate::at("document.id", &item.id),
        ],
        None if api.has_form(kind) => Vec::new(),
        None => vec![Predicate::at("document.type", kind)],
    }
}

/// Run the query for `kind`, letting the listener replace its filters or
/// take it over.
pub async fn run(
    api: &Arc<dyn ContentApi>,
    request: &Request,
    kind: &str,
    filters: Vec<Predicate>,
    listener: Option<&dyn Listener>,
    cache: Option<&SiteCache>,
) -> Result<SearchResponse, ApiError> {
    let query = form_for(api.as_ref(), request, kind);

    let filters = match listener {
        Some(listener) => listener.query(api, filters, cache, request),
        None => QueryOverride::Filters(filters),
    };

    match filters {
        QueryOverride::Pending(pending) => {
            debug!("Listener took over the {} query", kind);
            pending.await
        }
        QueryOverride::Filters(filters) => {
            debug!(
                "Querying {} form for {} with {} filters",
                query.form,
                kind,
                filters.len()
            );
            api.submit(&query.query(filters)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clutch_prismic::{Document, MemoryApi, PREVIEW_COOKIE};
    use pretty_assertions::assert_eq;

    fn api() -> Arc<MemoryApi> {
        Arc::new(
            MemoryApi::new()
                .with_document(Document::new("1", "page").with_uid("about"))
                .with_document(Document::new("2", "work").with_uid("spring"))
                .with_collection("portfolio", "work"),
        )
    }

    #[test]
    fn ref_defaults_to_master() {
        let api = api();

        assert_eq!(resolve_ref(api.as_ref(), &Request::for_type("page")), "master");
    }

    #[test]
    fn preview_cookie_pins_ref() {
        let api = api();
        let request = Request::for_type("page").with_cookie(PREVIEW_COOKIE, "preview-tok");

        let query = form_for(api.as_ref(), &request, "page");

        assert_eq!(query.reference, "preview-tok");
        assert_eq!(query.page_size, 100);
        assert_eq!(query.form, "everything");
    }

    #[test]
    fn search_forms_are_queried_directly() {
        let api = api();

        let query = form_for(api.as_ref(), &Request::for_type("portfolio"), "portfolio");

        assert_eq!(query.form, "portfolio");
        assert!(type_filters(api.as_ref(), "portfolio", None).is_empty());
    }

    #[test]
    fn navigation_pins_type_and_id() {
        let api = api();
        let item = NavigationItem {
            id: "W1".to_string(),
            uid: "work".to_string(),
            kind: "portfolio".to_string(),
            slug: "/work/".to_string(),
            title: "Work".to_string(),
            style: "primary".to_string(),
        };

        let filters = type_filters(api.as_ref(), "work", Some(&item));

        assert_eq!(
            filters,
            vec![
                Predicate::at("document.type", "portfolio"),
                Predicate::at("document.id", "W1"),
            ]
        );
    }

    #[tokio::test]
    async fn submits_type_query() {
        let memory = api();
        let api: Arc<dyn ContentApi> = memory.clone();
        let request = Request::for_type("page");
        let filters = type_filters(api.as_ref(), "page", None);

        let response = run(&api, &request, "page", filters, None, None).await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(
            memory.queries()[0].filters,
            vec![Predicate::at("document.type", "page")]
        );
    }
}
