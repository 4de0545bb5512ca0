//! Documents and fragments as returned by the search API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A remote content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Repository-wide identifier
    pub id: String,

    /// Identifier unique per content type
    #[serde(default)]
    pub uid: Option<String>,

    /// Content type
    #[serde(rename = "type")]
    pub kind: String,

    /// API link to the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub slugs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Fragments keyed by content type, then by field name
    #[serde(default)]
    pub data: BTreeMap<String, BTreeMap<String, Fragment>>,
}

impl Document {
    /// Create an empty document of the given type.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uid: None,
            kind: kind.into(),
            href: None,
            tags: Vec::new(),
            slugs: Vec::new(),
            lang: None,
            data: BTreeMap::new(),
        }
    }

    /// Set the uid.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Add a fragment under its flattened `<type>.<field>` name.
    pub fn with_fragment(mut self, name: &str, fragment: Fragment) -> Self {
        let (kind, field) = match name.split_once('.') {
            Some((kind, field)) => (kind.to_string(), field.to_string()),
            None => (self.kind.clone(), name.to_string()),
        };
        self.data.entry(kind).or_default().insert(field, fragment);
        self
    }

    /// Look up a fragment by its flattened `<type>.<field>` name.
    pub fn get(&self, name: &str) -> Option<&Fragment> {
        let (kind, field) = name.split_once('.')?;
        self.data.get(kind)?.get(field)
    }

    /// Iterate all fragments with their flattened names.
    pub fn fragments(&self) -> impl Iterator<Item = (String, &Fragment)> {
        self.data.iter().flat_map(|(kind, fields)| {
            fields
                .iter()
                .map(move |(field, fragment)| (format!("{}.{}", kind, field), fragment))
        })
    }

    /// Slices of a slice zone fragment.
    pub fn get_slice_zone(&self, name: &str) -> Option<Vec<Slice>> {
        self.get(name)?.slices()
    }
}

/// A typed field value: `{ "type": "...", "value": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Fragment type (`Text`, `Select`, `Link.document`, `Group`, `SliceZone`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub value: Value,
}

impl Fragment {
    /// Create a fragment from its raw parts.
    pub fn new(kind: impl Into<String>, value: Value) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }

    /// A plain text fragment.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new("Text", Value::String(value.into()))
    }

    /// A select fragment.
    pub fn select(value: impl Into<String>) -> Self {
        Self::new("Select", Value::String(value.into()))
    }

    /// A link to another document.
    pub fn document_link(document: &LinkedDocument) -> Self {
        Self::new(
            "Link.document",
            json!({ "document": document, "isBroken": false }),
        )
    }

    /// A group of field maps.
    pub fn group(items: Vec<BTreeMap<String, Fragment>>) -> Self {
        Self::new("Group", json!(items))
    }

    /// A slice zone.
    pub fn slice_zone(slices: Vec<Slice>) -> Self {
        Self::new("SliceZone", json!(slices))
    }

    /// Text content of scalar fragments.
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// The linked document of a `Link.document` fragment.
    pub fn link_document(&self) -> Option<LinkedDocument> {
        if self.kind != "Link.document" {
            return None;
        }
        serde_json::from_value(self.value.get("document")?.clone()).ok()
    }

    /// Entries of a `Group` fragment, in order.
    pub fn group_items(&self) -> Option<Vec<BTreeMap<String, Fragment>>> {
        if self.kind != "Group" {
            return None;
        }
        serde_json::from_value(self.value.clone()).ok()
    }

    /// Slices of a `SliceZone` fragment, in order.
    pub fn slices(&self) -> Option<Vec<Slice>> {
        if self.kind != "SliceZone" {
            return None;
        }
        serde_json::from_value(self.value.clone()).ok()
    }

    /// Flat value used for key/value contexts: the url of links and images,
    /// the raw value otherwise.
    pub fn scalar(&self) -> Value {
        let url = match self.kind.as_str() {
            "Link.web" | "Link.file" | "Link.image" => self.value.get("url"),
            "Image" => self.value.get("main").and_then(|main| main.get("url")),
            _ => None,
        };
        match url {
            Some(url) => url.clone(),
            None => self.value.clone(),
        }
    }
}

/// Identity of a document referenced from a link fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedDocument {
    pub id: String,

    #[serde(default)]
    pub uid: Option<String>,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// One slice of a slice zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    /// Slice type identifier
    pub slice_type: String,

    #[serde(default)]
    pub slice_label: Option<String>,

    /// Slice content, usually a `Group` fragment
    #[serde(default)]
    pub value: Option<Fragment>,
}

impl Slice {
    /// Create a slice whose content is a group with the given entries.
    pub fn group(slice_type: impl Into<String>, items: Vec<BTreeMap<String, Fragment>>) -> Self {
        Self {
            slice_type: slice_type.into(),
            slice_label: None,
            value: Some(Fragment::group(items)),
        }
    }

    /// First entry of the slice's group content.
    pub fn first_group(&self) -> Option<BTreeMap<String, Fragment>> {
        self.value.as_ref()?.group_items()?.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SITE_JSON: &str = r#"{
        "id": "WxYz",
        "uid": null,
        "type": "site",
        "tags": [],
        "data": {
            "site": {
                "title": { "type": "Text", "value": "Clutch" },
                "logo": { "type": "Image", "value": { "main": { "url": "https://cdn/logo.png" } } },
                "navi": {
                    "type": "SliceZone",
                    "value": [{
                        "type": "Slice",
                        "slice_type": "navi_link",
                        "slice_label": null,
                        "value": {
                            "type": "Group",
                            "value": [{
                                "name": { "type": "Text", "value": "About" },
                                "style": { "type": "Select", "value": "Primary" },
                                "page": {
                                    "type": "Link.document",
                                    "value": {
                                        "document": { "id": "A1", "type": "page", "uid": "about", "tags": [] },
                                        "isBroken": false
                                    }
                                }
                            }]
                        }
                    }]
                }
            }
        }
    }"#;

    #[test]
    fn parses_document() {
        let doc: Document = serde_json::from_str(SITE_JSON).unwrap();

        assert_eq!(doc.id, "WxYz");
        assert_eq!(doc.kind, "site");
        assert_eq!(doc.uid, None);
        assert_eq!(doc.get("site.title").and_then(Fragment::as_text), Some("Clutch"));
    }

    #[test]
    fn flattens_fragment_names() {
        let doc: Document = serde_json::from_str(SITE_JSON).unwrap();
        let names: Vec<String> = doc.fragments().map(|(name, _)| name).collect();

        assert_eq!(names, vec!["site.logo", "site.navi", "site.title"]);
    }

    #[test]
    fn reads_slices_and_links() {
        let doc: Document = serde_json::from_str(SITE_JSON).unwrap();
        let slices = doc.get_slice_zone("site.navi").unwrap();
        assert_eq!(slices.len(), 1);

        let group = slices[0].first_group().unwrap();
        let link = group["page"].link_document().unwrap();

        assert_eq!(link.id, "A1");
        assert_eq!(link.uid.as_deref(), Some("about"));
        assert_eq!(link.kind, "page");
        assert_eq!(group["style"].as_text(), Some("Primary"));
    }

    #[test]
    fn scalar_uses_image_url() {
        let doc: Document = serde_json::from_str(SITE_JSON).unwrap();
        let logo = doc.get("site.logo").unwrap();

        assert_eq!(logo.scalar(), Value::String("https://cdn/logo.png".into()));
    }

    #[test]
    fn builder_places_fragments_under_type() {
        let doc = Document::new("1", "page")
            .with_uid("home")
            .with_fragment("page.title", Fragment::text("Home"));

        assert_eq!(doc.get("page.title").and_then(Fragment::as_text), Some("Home"));
        assert!(doc.get("site.title").is_none());
    }
}
