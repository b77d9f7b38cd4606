//! Render pipeline
//!
//! A page is produced in two stages. Its body is first executed as a Tera
//! template against the page context, then converted by the renderer
//! registered for its extension. The stored body is never modified, so
//! rendering the same node twice yields the same markup.
//!
//! Failures in either stage do not abort the page: they are shown inline
//! where the content would have been.

mod context;
pub mod formats;
pub mod functions;

pub use context::{node_url, PageContext, PageInfo, PageLink};
pub use formats::{ContentRenderer, FormatRegistry};
pub use functions::TemplateEnv;

use std::borrow::Cow;
use std::sync::Arc;
use tera::Tera;

use crate::content::{Body, ContentNode, DirectoryNode, Node, NodeId, UrlMode};
use crate::error::{error_chain, Error, Result};
use crate::helpers::{escape, html::link};
use crate::hooks::PRE_RENDER;
use crate::menu::{Menu, MenuBuilder};
use crate::templates::Layout;
use crate::Site;

/// Final output for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// A complete HTML page
    Page(String),
    /// A file written as-is, outside the page layout
    Raw(Vec<u8>),
}

impl Rendered {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Rendered::Page(html) => html.into_bytes(),
            Rendered::Raw(bytes) => bytes,
        }
    }

    pub fn is_page(&self) -> bool {
        matches!(self, Rendered::Page(_))
    }
}

/// Body and format a node is rendered from
struct Source<'a> {
    text: Cow<'a, str>,
    extension: Option<String>,
}

/// Renders nodes of one site in one URL mode
pub struct Renderer<'a> {
    site: &'a Site,
    mode: UrlMode,
}

impl<'a> Renderer<'a> {
    pub fn new(site: &'a Site, mode: UrlMode) -> Self {
        Self { site, mode }
    }

    /// Build the context for one page. The menu is rebuilt on every call.
    pub fn page_context(&self, id: NodeId) -> Result<PageContext> {
        let site = self.site;
        let config = &site.config;
        let menu = MenuBuilder::new(config, &site.tree, self.mode).build(&site.hooks)?;

        Ok(PageContext {
            node: id,
            is_serving: self.mode == UrlMode::Serve,
            page: PageInfo::new(&site.tree, id, &config.server.base_url, self.mode),
            menu,
            footer: Menu::footer(config),
            ctx: config.context.clone(),
            project: config.project.clone(),
            base_url: config.server.base_url.clone(),
            static_url: config.server.static_url.clone(),
            content: String::new(),
        })
    }

    /// Template engine for one page, with the template functions bound to it
    pub fn engine(&self, page: &PageContext) -> Tera {
        let mut tera = self.site.layout.instance();
        functions::register(&mut tera, self.template_env(page.clone()));
        tera
    }

    pub fn template_env(&self, page: PageContext) -> TemplateEnv {
        TemplateEnv {
            tree: self.site.tree.clone(),
            hooks: self.site.hooks.clone(),
            page: Arc::new(page),
            mode: self.mode,
        }
    }

    /// Render a node to its final output
    pub fn render(&self, id: NodeId) -> Result<Rendered> {
        let tree = &self.site.tree;

        if let Node::Content(file) = tree.get(id) {
            if !file.is_text {
                return self.render_raw(id, file);
            }
        }

        let mut page = self.page_context(id)?;
        for handler in self.site.hooks.get(PRE_RENDER) {
            handler(self.site, &mut page).map_err(|e| Error::hook("pre_render", e))?;
        }

        let mut tera = self.engine(&page);
        let source = self.source(id);
        page.content = render_content(&mut tera, &self.site.formats, &source, &page);

        Ok(Rendered::Page(Layout::render_page(&tera, &page)?))
    }

    /// Non-text files skip the layout. UTF-8 ones are still templated; if
    /// that fails the file is kept unchanged.
    fn render_raw(&self, id: NodeId, file: &ContentNode) -> Result<Rendered> {
        let text = match &file.body {
            Body::Binary(bytes) => return Ok(Rendered::Raw(bytes.clone())),
            Body::Text(text) => text,
        };

        let page = self.page_context(id)?;
        let mut tera = self.engine(&page);
        let output = tera::Context::from_serialize(&page)
            .and_then(|context| tera.render_str(text, &context));

        match output {
            Ok(output) => Ok(Rendered::Raw(output.into_bytes())),
            Err(e) => {
                tracing::warn!(
                    "Writing {} untemplated: {}",
                    file.info.relative,
                    error_chain(&e)
                );
                Ok(Rendered::Raw(text.clone().into_bytes()))
            }
        }
    }

    fn source(&self, id: NodeId) -> Source<'a> {
        let tree = &self.site.tree;
        match tree.get(id) {
            Node::Content(file) => content_source(file),
            Node::Directory(dir) => match dir.index.and_then(|index| tree.content(index)) {
                Some(index) => content_source(index),
                None => Source {
                    text: Cow::Owned(self.directory_listing(dir)),
                    extension: Some("html".to_string()),
                },
            },
        }
    }

    /// Links to every child, subdirectories first
    fn directory_listing(&self, dir: &DirectoryNode) -> String {
        let tree = &self.site.tree;
        let base_url = &self.site.config.server.base_url;
        dir.children()
            .map(|child| {
                format!(
                    "<p>{}</p>\n",
                    link(&node_url(tree, child, base_url, self.mode), tree.get(child).title())
                )
            })
            .collect()
    }
}

fn content_source(file: &ContentNode) -> Source<'_> {
    Source {
        text: match &file.body {
            Body::Text(text) => Cow::Borrowed(text.as_str()),
            Body::Binary(bytes) => String::from_utf8_lossy(bytes),
        },
        extension: file.extension(),
    }
}

/// Run both content stages, turning any failure into inline error text
fn render_content(
    tera: &mut Tera,
    formats: &FormatRegistry,
    source: &Source<'_>,
    page: &PageContext,
) -> String {
    let templated = tera::Context::from_serialize(page)
        .and_then(|context| tera.render_str(&source.text, &context));
    let templated = match templated {
        Ok(templated) => templated,
        Err(e) => return inline_error(&page.page.path, &error_chain(&e)),
    };

    match formats.render(source.extension.as_deref(), &templated) {
        Ok(html) => html,
        Err(e) => inline_error(&page.page.path, &format!("{:#}", e)),
    }
}

fn inline_error(path: &str, message: &str) -> String {
    tracing::warn!("Render error in '{}': {}", path, message);
    format!(
        "<p class=\"render-error\">Error: {}</p>",
        escape(message)
    )
}
