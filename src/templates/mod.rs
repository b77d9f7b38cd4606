//! Page layout templates using the Tera template engine
//!
//! The default layout is embedded in the binary. Any `*.html` file in
//! `.docsite/templates` replaces the embedded template of the same name
//! (or adds a new one that the others can include).

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::helpers::{escape, strip_html, truncate};
use crate::hooks::{HookError, HookRegistry, RenderHookFn, RENDER_NAVBAR_CONTENT};
use crate::menu::MenuItem;
use crate::render::PageContext;

/// Directory (relative to the project) holding layout overrides
pub const TEMPLATES_DIR: &str = ".docsite/templates";

/// Entry point of the layout
pub const BASE_TEMPLATE: &str = "base.html";

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("layout/base.html")),
    ("head.html", include_str!("layout/head.html")),
    ("navbar.html", include_str!("layout/navbar.html")),
    ("main.html", include_str!("layout/main.html")),
    ("footer.html", include_str!("layout/footer.html")),
];

/// The page layout shared by every rendered page
#[derive(Debug, Clone)]
pub struct Layout {
    tera: Tera,
}

impl Layout {
    /// Layout with only the embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Content is already HTML; autoescaping would mangle it
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(DEFAULT_TEMPLATES.to_vec())?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Embedded layout with overrides from `dir`, if it exists
    pub fn load(dir: &Path) -> Result<Self> {
        let mut layout = Self::new()?;
        if !dir.is_dir() {
            return Ok(layout);
        }

        let mut overrides = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::io(dir, e.into()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "html") {
                continue;
            }

            let name = path
                .strip_prefix(dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            tracing::debug!("Layout override: {}", name);
            overrides.push((name, source));
        }

        if !overrides.is_empty() {
            layout.tera.add_raw_templates(overrides)?;
        }
        Ok(layout)
    }

    /// A private copy of the layout engine for one page
    pub fn instance(&self) -> Tera {
        self.tera.clone()
    }

    /// Render the full page around `page.content`
    pub fn render_page(tera: &Tera, page: &PageContext) -> Result<String> {
        let context = Context::from_serialize(page)?;
        Ok(tera.render(BASE_TEMPLATE, &context)?)
    }
}

/// Markup of the navigation menu
pub fn navbar_menu(page: &PageContext) -> String {
    let mut html = String::from(r#"<ul class="navbar-menu">"#);
    html.push('\n');
    for item in &page.menu.items {
        push_menu_item(&mut html, item, &page.page.url);
    }
    html.push_str("</ul>");
    html
}

fn push_menu_item(html: &mut String, item: &MenuItem, current_url: &str) {
    let mut classes = vec!["navbar-item"];
    if !item.classname.is_empty() {
        classes.push(&item.classname);
    }
    if item.url == current_url {
        classes.push("active");
    }

    let attributes: String = item
        .attributes
        .iter()
        .map(|(key, value)| format!(r#" {}="{}""#, escape(key), escape(value)))
        .collect();

    let icon = if item.icon.is_empty() {
        String::new()
    } else {
        format!(r#"<span class="icon icon-{}"></span>"#, escape(&item.icon))
    };

    html.push_str(&format!(
        r#"<li class="{}"><a href="{}"{}>{}{}</a>"#,
        classes.join(" "),
        escape(&item.url),
        attributes,
        icon,
        escape(&item.name)
    ));

    if !item.items.is_empty() {
        html.push_str(r#"<ul class="navbar-submenu">"#);
        for child in &item.items {
            push_menu_item(html, child, current_url);
        }
        html.push_str("</ul>");
    }
    html.push_str("</li>\n");
}

/// Register the navbar menu as the default navbar content
pub fn install_hooks(registry: &mut HookRegistry) -> std::result::Result<(), HookError> {
    let handler: Arc<RenderHookFn> = Arc::new(navbar_menu);
    registry.register(RENDER_NAVBAR_CONTENT, 0, handler)
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(truncate(&s, length, Some(&omission))))
}
