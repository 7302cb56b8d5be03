use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};

#[derive(Debug)]
pub enum TemplateError {
    TeraError(tera::Error),
    IoError(std::io::Error),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::TeraError(err)
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::IoError(err)
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::TeraError(e) => write!(f, "Template error: {}", e),
            TemplateError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Page-scoped template data, layered on top of the renderer's globals.
#[derive(Default)]
pub struct RenderContext {
    context: Context,
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            context: Context::new(),
        }
    }

    pub fn add_to_context<T: Serialize>(&mut self, key: &str, value: &T) {
        self.context.insert(key, value);
    }
}

/// Tera wrapper holding the theme's templates and the global context shared
/// by every page (site metadata, navigation).
pub struct Renderer {
    tera: Tera,
    globals: Context,
}

impl Renderer {
    pub fn new(theme_dir: &Path) -> Result<Self, TemplateError> {
        let pattern = theme_dir.join("**").join("*.html");
        let tera = Tera::new(&pattern.to_string_lossy())?;

        Ok(Self {
            tera,
            globals: Context::new(),
        })
    }

    pub fn set_global_context<T: Serialize>(&mut self, key: &str, value: &T) {
        self.globals.insert(key, value);
    }

    pub fn render(&self, template: &str, page: &RenderContext) -> Result<String, TemplateError> {
        let mut context = self.globals.clone();
        context.extend(page.context.clone());

        Ok(self.tera.render(template, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_context_layers_over_globals() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("page.html"),
            "{{ site_title }}: {{ content }}",
        )
        .unwrap();

        let mut renderer = Renderer::new(dir.path()).unwrap();
        renderer.set_global_context("site_title", &"T");

        let mut page = RenderContext::new();
        page.add_to_context("content", &"hello");

        let html = renderer.render("page.html", &page).unwrap();
        assert_eq!(html, "T: hello");
    }

    #[test]
    fn unknown_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), "x").unwrap();

        let renderer = Renderer::new(dir.path()).unwrap();
        let result = renderer.render("missing.html", &RenderContext::new());
        assert!(matches!(result, Err(TemplateError::TeraError(_))));
    }
}
