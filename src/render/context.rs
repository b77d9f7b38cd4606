//! Per-page render context

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ProjectConfig;
use crate::content::{ContentTree, NodeId, UrlMode};
use crate::helpers::{encode_path, object_url};
use crate::menu::Menu;

/// A link to another node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLink {
    pub title: String,
    pub url: String,
}

/// The node being rendered, as seen by templates
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub name: String,
    pub title: String,
    pub url: String,
    /// Path relative to the input root
    pub path: String,
    pub depth: usize,
    pub is_dir: bool,
    pub next: Option<PageLink>,
    pub previous: Option<PageLink>,
}

/// Everything a page template can see. One instance per rendered page.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    #[serde(skip)]
    pub node: NodeId,
    pub is_serving: bool,
    pub page: PageInfo,
    pub menu: Menu,
    pub footer: Menu,
    pub ctx: IndexMap<String, serde_yaml::Value>,
    pub project: ProjectConfig,
    pub base_url: String,
    pub static_url: String,
    /// Final markup of the page body, filled in by the pipeline
    pub content: String,
}

/// Public URL of a node under `base_url`, percent-encoded
pub fn node_url(tree: &ContentTree, id: NodeId, base_url: &str, mode: UrlMode) -> String {
    let node = tree.get(id);
    object_url(base_url, &encode_path(&node.url(mode)), node.is_directory())
}

impl PageInfo {
    pub fn new(tree: &ContentTree, id: NodeId, base_url: &str, mode: UrlMode) -> Self {
        let node = tree.get(id);
        let link = |target: Option<NodeId>| {
            target.map(|target| PageLink {
                title: tree.get(target).title().to_string(),
                url: node_url(tree, target, base_url, mode),
            })
        };

        Self {
            name: node.name().to_string(),
            title: node.title().to_string(),
            url: node_url(tree, id, base_url, mode),
            path: node.info().relative.clone(),
            depth: node.info().depth,
            is_dir: node.is_directory(),
            next: link(tree.next(id)),
            previous: link(tree.previous(id)),
        }
    }
}
