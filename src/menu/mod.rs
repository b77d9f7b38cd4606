//! Navigation menu model and builder
//!
//! A menu comes either from the `menu:` section of the configuration or,
//! when that has no items, from the top level of the content tree. Every
//! local item is resolved through the tree so a stale path fails the run
//! instead of producing a dead link.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::content::{split_path, ContentTree, NodeId, UrlMode};
use crate::error::{Error, Result};
use crate::helpers::is_local;
use crate::hooks::{ConstructMenuFn, HookError, HookRegistry, CONSTRUCT_MENU};
use crate::render::node_url;

/// Deepest nesting level (0 for top-level items) whose items may still
/// have children of their own, so menus hold at most three levels
pub const MAX_MENU_DEPTH: usize = 1;

/// A navigation menu
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Menu {
    pub logo: String,
    pub items: Vec<MenuItem>,
}

/// One menu entry, possibly with nested entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItem {
    pub name: String,
    /// Tree path or external URL in the configuration; the final URL once built
    #[serde(rename(deserialize = "path"), alias = "url")]
    pub url: String,
    pub classname: String,
    pub icon: String,
    pub attributes: IndexMap<String, String>,
    pub items: Vec<MenuItem>,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Menu {
    /// Footer shown on every page
    pub fn footer(config: &SiteConfig) -> Self {
        let mut footer = Menu::default();
        if !config.project.repository.is_empty() {
            footer.items.push(MenuItem::new(
                format!("View {} on GitHub", config.project.name),
                config.project.repository.clone(),
            ));
        }
        footer
    }
}

/// Builds the menu for one render pass
pub struct MenuBuilder<'a> {
    config: &'a SiteConfig,
    tree: &'a ContentTree,
    mode: UrlMode,
}

impl<'a> MenuBuilder<'a> {
    pub fn new(config: &'a SiteConfig, tree: &'a ContentTree, mode: UrlMode) -> Self {
        Self { config, tree, mode }
    }

    /// Build the menu and let `construct_menu` handlers adjust it
    pub fn build(&self, hooks: &HookRegistry) -> Result<Menu> {
        let mut menu = match &self.config.menu {
            Some(configured) if self.config.has_explicit_menu() => Menu {
                logo: configured.logo.clone(),
                items: self.resolve_items(&configured.items, 0)?,
            },
            configured => Menu {
                logo: configured
                    .as_ref()
                    .map(|m| m.logo.clone())
                    .unwrap_or_default(),
                items: self.default_items(),
            },
        };

        for handler in hooks.get(CONSTRUCT_MENU) {
            handler(self.config, &mut menu);
        }

        Ok(menu)
    }

    /// Root subdirectories, then root files, in discovery order
    fn default_items(&self) -> Vec<MenuItem> {
        self.tree
            .root_directory()
            .children()
            .map(|id| MenuItem::new(self.tree.get(id).title(), self.url_of(id)))
            .collect()
    }

    fn resolve_items(&self, items: &[MenuItem], depth: usize) -> Result<Vec<MenuItem>> {
        let mut resolved = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let mut item = item.clone();

            if item.url.trim().is_empty() {
                return Err(Error::MenuItemNoUrl {
                    index,
                    name: item.name,
                });
            }

            if is_local(&item.url) {
                let id = self
                    .tree
                    .walk(&split_path(&item.url))
                    .ok_or_else(|| Error::MenuItemNotFound(item.url.clone()))?;
                if item.name.is_empty() {
                    item.name = self.tree.get(id).title().to_string();
                }
                item.url = self.url_of(id);
            } else if item.name.is_empty() {
                item.name = item.url.clone();
            }

            if !item.items.is_empty() {
                if depth > MAX_MENU_DEPTH {
                    return Err(Error::MenuTooDeep {
                        name: item.name,
                        depth: depth + 1,
                        max: MAX_MENU_DEPTH,
                    });
                }
                item.items = self.resolve_items(&item.items, depth + 1)?;
            }

            resolved.push(item);
        }

        Ok(resolved)
    }

    fn url_of(&self, id: NodeId) -> String {
        node_url(self.tree, id, &self.config.server.base_url, self.mode)
    }
}

/// Register the default `construct_menu` handler: a leading item linking
/// to the site root with the project name
pub fn install_hooks(registry: &mut HookRegistry) -> std::result::Result<(), HookError> {
    let title: Arc<ConstructMenuFn> = Arc::new(|config: &SiteConfig, menu: &mut Menu| {
        let item = MenuItem {
            classname: "navbar-title".to_string(),
            ..MenuItem::new(
                config.project.name.clone(),
                config.server.base_url.clone(),
            )
        };
        menu.items.insert(0, item);
    });
    registry.register(CONSTRUCT_MENU, -1, title)
}
