//! Client for the Prismic content API.
//!
//! This crate provides the repository entry point, search forms and refs,
//! query predicates, and the document and fragment model returned by
//! searches. [`ContentApi`] is the seam the content adapter talks to; [`Api`]
//! implements it over HTTP and [`memory::MemoryApi`] over in-memory documents.

pub mod api;
pub mod document;
pub mod memory;
pub mod predicate;

pub use api::{
    default_link_resolver, Api, ApiData, ApiError, ContentApi, Form, LinkResolver, Ref,
    SearchQuery, SearchResponse, DEFAULT_PAGE_SIZE, EVERYTHING_FORM, PREVIEW_COOKIE,
};
pub use document::{Document, Fragment, LinkedDocument, Slice};
pub use memory::MemoryApi;
pub use predicate::{to_query_param, Operator, Predicate};
