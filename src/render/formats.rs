//! Format renderers, selected by file extension

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use crate::content::{extension_of, MarkdownRenderer};
use crate::helpers::escape;
use crate::hooks::{HookError, HookRegistry, IsTextFileFn, IS_TEXT_FILE};

/// Extensions served as-is rather than wrapped in the page layout
pub const PASSTHROUGH_EXTENSIONS: &[&str] = &["css", "js", "wasm", "wat"];

/// Converts templated content into final markup
pub trait ContentRenderer: Send + Sync {
    fn render(&self, source: &str) -> Result<String>;
}

impl ContentRenderer for MarkdownRenderer {
    fn render(&self, source: &str) -> Result<String> {
        MarkdownRenderer::render(self, source)
    }
}

/// Leaves content untouched
pub struct Passthrough;

impl ContentRenderer for Passthrough {
    fn render(&self, source: &str) -> Result<String> {
        Ok(source.to_string())
    }
}

/// Shows content verbatim in a preformatted block
pub struct Preformatted;

impl ContentRenderer for Preformatted {
    fn render(&self, source: &str) -> Result<String> {
        Ok(format!("<pre>{}</pre>", escape(source)))
    }
}

/// Extension-keyed renderer lookup with a preformatted fallback
pub struct FormatRegistry {
    renderers: HashMap<String, Arc<dyn ContentRenderer>>,
    fallback: Arc<dyn ContentRenderer>,
}

impl FormatRegistry {
    /// Registry with only the fallback renderer
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Arc::new(Preformatted),
        }
    }

    /// Registry with markdown, HTML and the passthrough formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let markdown: Arc<dyn ContentRenderer> = Arc::new(MarkdownRenderer::new());
        registry.register("md", markdown.clone());
        registry.register("markdown", markdown);

        let passthrough: Arc<dyn ContentRenderer> = Arc::new(Passthrough);
        registry.register("html", passthrough.clone());
        for ext in PASSTHROUGH_EXTENSIONS {
            registry.register(ext, passthrough.clone());
        }

        registry
    }

    /// Register (or replace) the renderer for an extension
    pub fn register(&mut self, extension: &str, renderer: Arc<dyn ContentRenderer>) {
        self.renderers.insert(extension.to_lowercase(), renderer);
    }

    /// Renderer for an extension, or the fallback
    pub fn get(&self, extension: Option<&str>) -> &dyn ContentRenderer {
        extension
            .and_then(|ext| self.renderers.get(&ext.to_lowercase()))
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    pub fn render(&self, extension: Option<&str>, source: &str) -> Result<String> {
        self.get(extension).render(source)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Whether a file name has one of the passthrough extensions
pub fn is_passthrough(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| PASSTHROUGH_EXTENSIONS.contains(&ext.as_str()))
}

/// Keep passthrough formats out of the page layout
pub fn install_hooks(registry: &mut HookRegistry) -> Result<(), HookError> {
    let handler: Arc<IsTextFileFn> =
        Arc::new(|name: &str, _content: &[u8]| !is_passthrough(name));
    registry.register(IS_TEXT_FILE, 99, handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_selected_by_extension() {
        let formats = FormatRegistry::with_defaults();
        let html = formats.render(Some("md"), "# Title").unwrap();
        assert!(html.contains("<h1"));
        let html = formats.render(Some("MARKDOWN"), "*x*").unwrap();
        assert!(html.contains("<em>x</em>"));
    }

    #[test]
    fn test_passthrough_formats() {
        let formats = FormatRegistry::with_defaults();
        for ext in ["html", "css", "js", "wasm", "wat"] {
            assert_eq!(formats.render(Some(ext), "a < b").unwrap(), "a < b");
        }
    }

    #[test]
    fn test_unknown_format_is_preformatted() {
        let formats = FormatRegistry::with_defaults();
        assert_eq!(
            formats.render(Some("txt"), "x < y & z").unwrap(),
            "<pre>x &lt; y &amp; z</pre>"
        );
        assert_eq!(formats.render(None, "plain").unwrap(), "<pre>plain</pre>");
    }

    #[test]
    fn test_custom_renderer_replaces_default() {
        struct Shout;
        impl ContentRenderer for Shout {
            fn render(&self, source: &str) -> Result<String> {
                Ok(source.to_uppercase())
            }
        }

        let mut formats = FormatRegistry::with_defaults();
        formats.register("txt", Arc::new(Shout));
        assert_eq!(formats.render(Some("txt"), "hi").unwrap(), "HI");
    }

    #[test]
    fn test_passthrough_files_are_not_text() {
        let mut registry = HookRegistry::new();
        install_hooks(&mut registry).unwrap();
        assert!(!crate::content::is_text_file(&registry, "app.js", b"let a = 1;"));
        assert!(!crate::content::is_text_file(&registry, "site.CSS", b"body {}"));
        assert!(crate::content::is_text_file(&registry, "page.md", b"# hi"));
    }
}
