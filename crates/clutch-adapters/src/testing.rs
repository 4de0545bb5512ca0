//! Fixtures shared by the adapter tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use clutch_prismic::{Document, Fragment, LinkedDocument, Slice};

use crate::context::RenderContext;
use crate::traits::{RenderError, TemplateRenderer};

/// A navigation slice linking to a document.
pub fn navi_link(name: &str, style: &str, id: &str, uid: &str, kind: &str) -> Slice {
    let link = LinkedDocument {
        id: id.to_string(),
        uid: Some(uid.to_string()),
        kind: kind.to_string(),
        slug: None,
        tags: Vec::new(),
    };
    Slice::group(
        "navi_link",
        vec![BTreeMap::from([
            ("name".to_string(), Fragment::text(name)),
            ("style".to_string(), Fragment::select(style)),
            ("page".to_string(), Fragment::document_link(&link)),
        ])],
    )
}

/// A navigation slice with a manually entered slug.
pub fn navi_slug(name: &str, style: &str, slug: &str) -> Slice {
    Slice::group(
        "navi_link",
        vec![BTreeMap::from([
            ("name".to_string(), Fragment::text(name)),
            ("style".to_string(), Fragment::select(style)),
            ("slug".to_string(), Fragment::text(slug)),
        ])],
    )
}

/// The singleton site document with the given navigation.
pub fn site_document(slices: Vec<Slice>) -> Document {
    Document::new("SITE", "site")
        .with_fragment("site.title", Fragment::text("Clutch"))
        .with_fragment("site.navi", Fragment::slice_zone(slices))
}

/// Renderer that records what it was asked to render.
#[derive(Default)]
pub struct RecordingRenderer {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, RenderContext)>>,
}

impl RecordingRenderer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn last(&self) -> Option<(String, RenderContext)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl TemplateRenderer for RecordingRenderer {
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, RenderError> {
        self.calls
            .lock()
            .unwrap()
            .push((template.to_string(), context.clone()));
        if self.fail {
            return Err(RenderError {
                template: template.to_string(),
                message: "template not found".to_string(),
            });
        }
        Ok(format!("<rendered {}>", template))
    }
}
