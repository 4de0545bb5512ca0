//! Query predicates in the Prismic query syntax.

use std::fmt;

/// Operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Field equals the value
    At,
    /// Field differs from the value
    Not,
    /// Field equals one of the values
    Any,
    /// Field contains the search terms
    Fulltext,
}

impl Operator {
    fn name(self) -> &'static str {
        match self {
            Operator::At => "at",
            Operator::Not => "not",
            Operator::Any => "any",
            Operator::Fulltext => "fulltext",
        }
    }
}

/// A single filter term, e.g. `[:d = at(document.type, "page")]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Operator
    pub op: Operator,
    /// Field path (`document.type`, `my.page.uid`, ...)
    pub path: String,
    /// Compared values
    pub values: Vec<String>,
}

impl Predicate {
    /// Field equals `value`.
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op: Operator::At,
            path: path.into(),
            values: vec![value.into()],
        }
    }

    /// Field differs from `value`.
    pub fn not(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op: Operator::Not,
            path: path.into(),
            values: vec![value.into()],
        }
    }

    /// Field equals any of `values`.
    pub fn any<I, S>(path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            op: Operator::Any,
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Field contains `terms`.
    pub fn fulltext(path: impl Into<String>, terms: impl Into<String>) -> Self {
        Self {
            op: Operator::Fulltext,
            path: path.into(),
            values: vec![terms.into()],
        }
    }

    /// Single value of the predicate, if it carries exactly one.
    pub fn value(&self) -> Option<&str> {
        match self.values.as_slice() {
            [value] => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[:d = {}({}, ", self.op.name(), self.path)?;
        match self.op {
            Operator::Any => {
                let quoted: Vec<String> = self.values.iter().map(|v| quote(v)).collect();
                write!(f, "[{}]", quoted.join(", "))?;
            }
            _ => {
                let value = self.values.first().map(String::as_str).unwrap_or("");
                write!(f, "{}", quote(value))?;
            }
        }
        write!(f, ")]")
    }
}

/// Combine predicates into the `q` parameter of a search request.
pub fn to_query_param(predicates: &[Predicate]) -> String {
    let terms: String = predicates.iter().map(ToString::to_string).collect();
    format!("[{}]", terms)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_at_predicate() {
        let p = Predicate::at("document.type", "page");
        assert_eq!(p.to_string(), r#"[:d = at(document.type, "page")]"#);
    }

    #[test]
    fn renders_any_predicate() {
        let p = Predicate::any("document.tags", ["a", "b"]);
        assert_eq!(p.to_string(), r#"[:d = any(document.tags, ["a", "b"])]"#);
    }

    #[test]
    fn combines_predicates() {
        let q = to_query_param(&[
            Predicate::at("document.type", "page"),
            Predicate::at("document.id", "XyZ"),
        ]);
        assert_eq!(
            q,
            r#"[[:d = at(document.type, "page")][:d = at(document.id, "XyZ")]]"#
        );
    }

    #[test]
    fn escapes_quotes() {
        let p = Predicate::fulltext("document", "say \"hi\"");
        assert_eq!(p.to_string(), r#"[:d = fulltext(document, "say \"hi\"")]"#);
    }
}
