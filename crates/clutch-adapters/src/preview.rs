//! Preview session redirect and cookie.

use std::time::Duration;

use clutch_prismic::PREVIEW_COOKIE;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Lifetime of a preview session cookie.
pub const PREVIEW_MAX_AGE: Duration = Duration::from_secs(30 * 60);

// Characters left alone by encodeURIComponent
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Outcome of a preview token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Path of the previewed document
    pub redirect: String,

    /// Cookie pinning later requests to the preview ref
    pub cookie: PreviewCookie,
}

/// The preview session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewCookie {
    pub name: String,
    pub value: String,
    pub max_age: Duration,
    pub path: String,
    /// Whether the cookie is hidden from client scripts
    pub http_only: bool,
}

impl PreviewCookie {
    /// Cookie for the preview `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            name: PREVIEW_COOKIE.to_string(),
            value: token.into(),
            max_age: PREVIEW_MAX_AGE,
            path: "/".to_string(),
            http_only: false,
        }
    }

    /// `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Max-Age={}; Path={}",
            self.name,
            utf8_percent_encode(&self.value, COOKIE_VALUE),
            self.max_age.as_secs(),
            self.path
        );
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_session_cookie() {
        let cookie = PreviewCookie::new("https://repo.prismic.io/previews/abc?x=1");

        assert_eq!(cookie.max_age.as_secs(), 1800);
        assert!(!cookie.http_only);
        assert_eq!(
            cookie.header_value(),
            "io.prismic.preview=https%3A%2F%2Frepo.prismic.io%2Fpreviews%2Fabc%3Fx%3D1; Max-Age=1800; Path=/"
        );
    }
}
