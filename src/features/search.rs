//! Client-side search: a navbar search box plus a JSON index written after
//! every build

use anyhow::Context as _;
use serde::Serialize;
use std::fs;
use std::sync::Arc;

use super::Feature;
use crate::config::SiteConfig;
use crate::content::{Body, Node, UrlMode};
use crate::helpers::{escape, object_url, strip_html, truncate};
use crate::hooks::{
    HookError, HookRegistry, LifecycleFn, RenderHookFn, AFTER_BUILD, RENDER_NAVBAR_CONTENT,
};
use crate::render::{node_url, PageContext};
use crate::Site;

/// File name of the index, relative to the output directory
pub const SEARCH_INDEX_FILE: &str = "search_index.json";

/// Characters of page text kept per entry
const SUMMARY_LENGTH: usize = 300;

/// One searchable page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEntry {
    pub title: String,
    pub url: String,
    pub text: String,
}

pub struct SearchFeature;

impl Feature for SearchFeature {
    fn id(&self) -> &'static str {
        "search"
    }

    fn init(&self, registry: &mut HookRegistry, _config: &SiteConfig) -> Result<(), HookError> {
        let search_box: Arc<RenderHookFn> = Arc::new(navbar_search);
        registry.register(RENDER_NAVBAR_CONTENT, -10, search_box)?;

        let write_index: Arc<LifecycleFn> = Arc::new(write_search_index);
        registry.register(AFTER_BUILD, -10, write_index)
    }
}

fn navbar_search(page: &PageContext) -> String {
    let index_url = object_url(&page.base_url, SEARCH_INDEX_FILE, false);
    format!(
        r#"<form class="navbar-search" role="search" data-index="{}"><input type="search" name="q" placeholder="Search {}" autocomplete="off"></form>"#,
        escape(&index_url),
        escape(&page.project.name)
    )
}

/// Entries for every page of the site, in traversal order
pub fn search_entries(site: &Site) -> Vec<SearchEntry> {
    let tree = &site.tree;
    let base_url = &site.config.server.base_url;

    tree.traverse()
        .into_iter()
        .filter_map(|id| {
            let file = match tree.get(id) {
                Node::Directory(dir) => dir.index.and_then(|index| tree.content(index)),
                Node::Content(file) if file.is_text => Some(file),
                Node::Content(_) => return None,
            };

            let text = file
                .and_then(|file| match &file.body {
                    Body::Text(text) => Some(plain_text(site, file.extension().as_deref(), text)),
                    Body::Binary(_) => None,
                })
                .unwrap_or_default();

            Some(SearchEntry {
                title: tree.get(id).title().to_string(),
                url: node_url(tree, id, base_url, UrlMode::Static),
                text,
            })
        })
        .collect()
}

/// Searchable text of a page body. Template tags are left in place; the
/// index only needs the words.
fn plain_text(site: &Site, extension: Option<&str>, source: &str) -> String {
    let html = site
        .formats
        .render(extension, source)
        .unwrap_or_else(|_| source.to_string());
    let words = strip_html(&html)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    truncate(&words, SUMMARY_LENGTH, None)
}

fn write_search_index(site: &Site) -> anyhow::Result<()> {
    let entries = search_entries(site);
    let path = site.output_dir.join(SEARCH_INDEX_FILE);
    let json = serde_json::to_string(&entries)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;

    tracing::info!("Search index: {} entries", entries.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_files, write_site_with};

    fn search_site() -> (tempfile::TempDir, Site) {
        write_site_with(&sample_files(), |hooks| SearchFeature.init(hooks, &SiteConfig::default()))
    }

    #[test]
    fn test_entries_cover_text_pages() {
        let (_dir, site) = search_site();
        let entries = search_entries(&site);

        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Sample Home", "Guide", "advanced", "deep.md", "Setup", "notes.txt"]
        );

        let setup = &entries[4];
        assert_eq!(setup.url, "/guide/setup.html");
        assert_eq!(setup.text, "Setup Install things.");
        assert_eq!(entries[2].text, "");
        assert_eq!(entries[3].text, "Deep");
        assert!(entries[5].text.starts_with("plain notes"));
    }

    #[test]
    fn test_index_written_after_build() {
        let (dir, site) = search_site();
        fs::create_dir_all(&site.output_dir).unwrap();
        for handler in site.hooks.get(AFTER_BUILD) {
            handler(&site).unwrap();
        }

        let json = fs::read_to_string(dir.path().join("out").join(SEARCH_INDEX_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["title"], "Sample Home");
        assert_eq!(value[0]["url"], "/");
    }

    #[test]
    fn test_search_box_rendered_before_menu() {
        let (_dir, site) = search_site();
        let id = site.tree.resolve("guide").unwrap();
        let page = site.page_context(id, UrlMode::Static).unwrap();

        let markup: Vec<String> = site
            .hooks
            .get(RENDER_NAVBAR_CONTENT)
            .iter()
            .map(|handler| handler(&page))
            .collect();
        assert_eq!(markup.len(), 2);
        assert!(markup[0].contains(r#"data-index="/search_index.json""#));
        assert!(markup[1].contains("navbar-menu"));
    }
}
