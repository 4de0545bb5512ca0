//! Site context and navigation derived from the singleton site document.

use std::collections::BTreeMap;

use clutch_prismic::{Document, Fragment, Slice};
use serde::Serialize;
use serde_json::Value;

/// Content type of the singleton site document.
pub const SITE_TYPE: &str = "site";

/// Slice zone holding the navigation entries.
pub const NAVI_FRAGMENT: &str = "site.navi";

const SITE_PREFIX: &str = "site.";

/// Site-wide key/value data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteContext {
    pub data: BTreeMap<String, Value>,
}

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationItem {
    pub id: String,
    pub uid: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// `/` for the homepage, `/{uid}/` otherwise
    pub slug: String,
    pub title: String,
    /// Lower-cased style tag
    pub style: String,
}

/// Errors raised while normalizing the site document.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("No \"site\" document was found")]
    MissingSite,

    #[error("The site document has no \"site.navi\" slice zone")]
    MissingNavi,

    #[error("Navigation slice {index} is missing \"{field}\"")]
    MalformedSlice { index: usize, field: &'static str },
}

/// Normalize the site document into its context and navigation list.
///
/// Navigation items keep the order of the slices. Any malformed slice fails
/// the whole resolution.
pub fn normalize_site(
    document: &Document,
    homepage: &str,
) -> Result<(SiteContext, Vec<NavigationItem>), NavigationError> {
    let mut site = SiteContext::default();
    for (name, fragment) in document.fragments() {
        if name == NAVI_FRAGMENT {
            continue;
        }
        let key = name.strip_prefix(SITE_PREFIX).unwrap_or(&name);
        site.data.insert(key.to_string(), fragment.scalar());
    }

    let slices = document
        .get_slice_zone(NAVI_FRAGMENT)
        .ok_or(NavigationError::MissingNavi)?;

    let navi = slices
        .iter()
        .enumerate()
        .map(|(index, slice)| navigation_item(index, slice, homepage))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((site, navi))
}

fn navigation_item(
    index: usize,
    slice: &Slice,
    homepage: &str,
) -> Result<NavigationItem, NavigationError> {
    let malformed = |field| NavigationError::MalformedSlice { index, field };

    let group = slice.first_group().ok_or_else(|| malformed("value"))?;
    let style = text(&group, "style").ok_or_else(|| malformed("style"))?;
    let title = text(&group, "name").ok_or_else(|| malformed("name"))?;

    let linked = group.get("page").and_then(Fragment::link_document);
    let (id, uid, kind, slug) = match linked {
        Some(doc) => {
            let uid = doc.uid.ok_or_else(|| malformed("page.uid"))?;
            (doc.id, uid.clone(), doc.kind, uid)
        }
        // Manual entries have no identity of their own
        None => {
            let slug = text(&group, "slug")
                .ok_or_else(|| malformed("slug"))?
                .replace('/', "");
            (slug.clone(), slug.clone(), slug.clone(), slug)
        }
    };

    let is_home = slug == homepage;
    Ok(NavigationItem {
        id,
        uid: if is_home { slug.clone() } else { uid },
        kind,
        slug: if is_home { "/".to_string() } else { format!("/{}/", slug) },
        title,
        style: style.to_lowercase(),
    })
}

fn text(group: &BTreeMap<String, Fragment>, field: &str) -> Option<String> {
    group.get(field)?.as_text().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{navi_link, navi_slug, site_document};
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_slice_order() {
        let doc = site_document(vec![
            navi_slug("Home", "Primary", "/home/"),
            navi_link("Work", "Primary", "W1", "work", "portfolio"),
            navi_slug("About", "Secondary", "about"),
        ]);

        let (_, navi) = normalize_site(&doc, "home").unwrap();
        let titles: Vec<&str> = navi.iter().map(|n| n.title.as_str()).collect();

        assert_eq!(titles, vec!["Home", "Work", "About"]);
    }

    #[test]
    fn homepage_slug_is_root() {
        let doc = site_document(vec![
            navi_slug("Home", "Primary", "/home/"),
            navi_slug("About", "Primary", "/about/"),
        ]);

        let (_, navi) = normalize_site(&doc, "home").unwrap();

        assert_eq!(navi[0].slug, "/");
        assert_eq!(navi[0].uid, "home");
        assert_eq!(navi[1].slug, "/about/");
    }

    #[test]
    fn document_links_carry_identity() {
        let doc = site_document(vec![navi_link("Work", "Primary", "W1", "work", "portfolio")]);

        let (_, navi) = normalize_site(&doc, "home").unwrap();

        assert_eq!(
            navi[0],
            NavigationItem {
                id: "W1".to_string(),
                uid: "work".to_string(),
                kind: "portfolio".to_string(),
                slug: "/work/".to_string(),
                title: "Work".to_string(),
                style: "primary".to_string(),
            }
        );
    }

    #[test]
    fn manual_slugs_double_as_identity() {
        let doc = site_document(vec![navi_slug("Contact", "CTA", "/contact/")]);

        let (_, navi) = normalize_site(&doc, "home").unwrap();

        assert_eq!(navi[0].id, "contact");
        assert_eq!(navi[0].uid, "contact");
        assert_eq!(navi[0].kind, "contact");
        assert_eq!(navi[0].style, "cta");
    }

    #[test]
    fn strips_site_prefix_from_context() {
        let doc = site_document(vec![])
            .with_fragment("site.title", Fragment::text("Clutch"))
            .with_fragment(
                "site.instagram",
                Fragment::new("Link.web", serde_json::json!({ "url": "https://instagram.com/x" })),
            );

        let (site, navi) = normalize_site(&doc, "home").unwrap();

        assert!(navi.is_empty());
        assert_eq!(site.data["title"], Value::from("Clutch"));
        assert_eq!(site.data["instagram"], Value::from("https://instagram.com/x"));
        assert!(!site.data.contains_key("navi"));
    }

    #[test]
    fn malformed_slice_fails_resolution() {
        let broken = Slice::group("navi_link", vec![BTreeMap::from([(
            "name".to_string(),
            Fragment::text("Nowhere"),
        )])]);
        let doc = site_document(vec![navi_slug("Home", "Primary", "home"), broken]);

        let err = normalize_site(&doc, "home").unwrap_err();

        assert!(matches!(
            err,
            NavigationError::MalformedSlice { index: 1, field: "style" }
        ));
    }

    #[test]
    fn missing_slice_zone_is_an_error() {
        let doc = Document::new("S", "site").with_fragment("site.title", Fragment::text("x"));

        assert!(matches!(
            normalize_site(&doc, "home"),
            Err(NavigationError::MissingNavi)
        ));
    }
}
