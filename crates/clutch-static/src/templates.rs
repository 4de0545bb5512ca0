//! Template engine for rendering pages and partials.

use std::path::Path;

use clutch_adapters::{RenderContext, RenderError, TemplateRenderer};
use minijinja::{path_loader, Environment};

/// Template engine using minijinja.
///
/// Templates are loaded from a template directory on demand. A default
/// `layout.html` and `navi.html` are built in so page templates can extend
/// them without shipping their own.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine with only the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("layout.html".to_string(), LAYOUT_TEMPLATE.to_string())
            .expect("Failed to add layout template");

        env.add_template_owned("navi.html".to_string(), NAVI_TEMPLATE.to_string())
            .expect("Failed to add navi template");

        Self { env }
    }

    /// Create an engine loading templates from `dir`.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let mut engine = Self::new();
        engine.env.set_loader(path_loader(dir.as_ref()));
        engine
    }

    /// Render `template` with the values of `context`.
    pub fn render_template(
        &self,
        template: &str,
        context: &RenderContext,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;
        tmpl.render(context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for TemplateEngine {
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, RenderError> {
        self.render_template(template, context)
            .map_err(|e| RenderError {
                template: template.to_string(),
                message: e.to_string(),
            })
    }
}

const LAYOUT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% block title %}{{ site.data.title }}{% endblock %}</title>
</head>
<body class="is-{{ page }}">
  <header class="header">
    {% include "navi.html" %}
  </header>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
</body>
</html>"##;

const NAVI_TEMPLATE: &str = r##"<nav class="navi">
  <ul class="navi__list">
  {% for item in navi %}
    <li class="navi__item navi__item--{{ item.style }}{% if item.slug == slug %} is-active{% endif %}">
      <a class="navi__a" href="{{ item.slug }}">{{ item.title }}</a>
    </li>
  {% endfor %}
  </ul>
</nav>"##;
