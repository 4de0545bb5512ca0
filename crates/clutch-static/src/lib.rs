//! Static site generation for clutch.
//!
//! Every page of the manifest is resolved through a [`ContentAdapter`] and
//! rendered with minijinja into `<output>/<slug>/index.html`.
//!
//! [`ContentAdapter`]: clutch_adapters::ContentAdapter

pub mod generator;
pub mod manifest;
pub mod templates;

pub use generator::{
    FailedRoute, GenerateConfig, GenerateError, GenerateReport, Route, RouteOutcome, RouteStatus,
    StaticGenerator,
};
pub use manifest::{ManifestError, StaticPages};
pub use templates::TemplateEngine;
