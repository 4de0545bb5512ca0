//! Inbound request shape consumed by the adapters.

use std::collections::HashMap;

use clutch_prismic::PREVIEW_COOKIE;
use serde::{Deserialize, Serialize};

/// Route parameters: `/:type/:uid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    /// Content type
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Document uid
    #[serde(default)]
    pub uid: Option<String>,
}

/// Query string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestQuery {
    /// `html` asks for rendered output instead of data
    #[serde(default)]
    pub format: Option<String>,

    /// Partial template overriding the content type
    #[serde(default)]
    pub template: Option<String>,

    /// Preview session token
    #[serde(default)]
    pub token: Option<String>,
}

/// A request routed to the content adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub params: RequestParams,

    #[serde(default)]
    pub query: RequestQuery,

    #[serde(default)]
    pub cookies: HashMap<String, String>,
}

impl Request {
    /// A request without content type (the site root).
    pub fn new() -> Self {
        Self::default()
    }

    /// A request for a content type.
    pub fn for_type(kind: impl Into<String>) -> Self {
        Self {
            params: RequestParams {
                kind: Some(kind.into()),
                uid: None,
            },
            ..Self::default()
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.params.uid = Some(uid.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.query.format = Some(format.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.query.template = Some(template.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.query.token = Some(token.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Pin the request to a preview ref, as a browser in a preview session would.
    pub fn with_preview_ref(self, token: impl Into<String>) -> Self {
        self.with_cookie(PREVIEW_COOKIE, token)
    }

    /// Preview ref carried by the preview cookie.
    pub fn preview_ref(&self) -> Option<&str> {
        self.cookies.get(PREVIEW_COOKIE).map(String::as_str)
    }

    /// Whether rendered output was requested.
    pub fn wants_html(&self) -> bool {
        self.query.format.as_deref() == Some("html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_preview_cookie() {
        let request = Request::for_type("page").with_preview_ref("tok");

        assert_eq!(request.preview_ref(), Some("tok"));
        assert_eq!(Request::new().preview_ref(), None);
    }

    #[test]
    fn deserializes_router_shape() {
        let request: Request = serde_json::from_str(
            r#"{ "params": { "type": "work", "uid": "spring" }, "query": { "format": "html" } }"#,
        )
        .unwrap();

        assert_eq!(request.params.kind.as_deref(), Some("work"));
        assert_eq!(request.params.uid.as_deref(), Some("spring"));
        assert!(request.wants_html());
    }
}
