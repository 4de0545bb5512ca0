//! Render context handed to the template renderer.

use serde::Serialize;
use serde_json::{Map, Value};

/// Named values exposed to a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderContext {
    #[serde(skip)]
    template: String,

    #[serde(flatten)]
    values: Map<String, Value>,
}

impl RenderContext {
    /// Create an empty context for `template`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            values: Map::new(),
        }
    }

    /// Name of the template the context was built for.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Set a value, replacing any previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Serialize,
    ) -> Result<(), serde_json::Error> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// All values.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_values_flat() {
        let mut context = RenderContext::new("work");
        context.insert("title", "Spring").unwrap();
        context.insert("count", 3).unwrap();

        assert_eq!(context.template(), "work");
        assert_eq!(
            serde_json::to_value(&context).unwrap(),
            json!({ "title": "Spring", "count": 3 })
        );
    }
}
