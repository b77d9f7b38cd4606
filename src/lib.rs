//! docsite: a documentation site generator
//!
//! A directory of markdown (and other) files becomes a navigable site. The
//! content tree is loaded once and then only read: pages are rendered from it
//! either into a static output directory or on demand by the built-in server.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod features;
pub mod helpers;
pub mod hooks;
pub mod menu;
pub mod render;
pub mod server;
pub mod templates;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{SiteConfig, CONFIG_FILE};
use content::{ContentLoader, ContentTree, NodeId, UrlMode};
use hooks::{declare_core_points, HookError, HookRegistry};
use menu::MenuBuilder;
use render::{FormatRegistry, PageContext, Rendered, Renderer, TemplateEnv};
use templates::{Layout, TEMPLATES_DIR};

/// A loaded documentation site
pub struct Site {
    pub config: SiteConfig,
    /// Project directory the configured paths are relative to
    pub base_dir: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Frozen once the site is assembled
    pub hooks: Arc<HookRegistry>,
    pub tree: Arc<ContentTree>,
    pub layout: Layout,
    pub formats: FormatRegistry,
}

impl Site {
    /// Load the site in `base_dir`, reading `docsite.yml` unless another
    /// configuration file is given
    pub fn load<P: AsRef<Path>>(base_dir: P, config_path: Option<&Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = match config_path {
            Some(path) => base_dir.join(path),
            None => base_dir.join(CONFIG_FILE),
        };
        let config = SiteConfig::load(&config_path)?;
        Self::new(base_dir, config)
    }

    /// Assemble a site from an already loaded configuration
    pub fn new<P: AsRef<Path>>(base_dir: P, config: SiteConfig) -> Result<Self> {
        Self::with_hooks(base_dir, config, |_| Ok(()))
    }

    /// Assemble a site, letting `install` register extra hook handlers
    /// before the registry is frozen
    pub fn with_hooks<P, F>(base_dir: P, config: SiteConfig, install: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut HookRegistry) -> std::result::Result<(), HookError>,
    {
        let base_dir = base_dir.as_ref().to_path_buf();
        config.validate()?;

        let mut hooks = HookRegistry::new();
        declare_core_points(&mut hooks)?;
        content::frontmatter::install_hooks(&mut hooks)?;
        render::formats::install_hooks(&mut hooks)?;
        menu::install_hooks(&mut hooks)?;
        templates::install_hooks(&mut hooks)?;
        features::enable(&config.features, &mut hooks, &config)?;
        install(&mut hooks)?;

        let input_dir = config.input_dir(&base_dir);
        let output_dir = config.output_dir(&base_dir);
        if !input_dir.is_dir() {
            return Err(Error::InputMissing(input_dir));
        }

        let tree = ContentLoader::new(&hooks, &input_dir, &output_dir)
            .root_name(&config.project.name)
            .load()?;
        tree.validate_references()?;
        MenuBuilder::new(&config, &tree, UrlMode::Static).build(&hooks)?;

        let layout = Layout::load(&base_dir.join(TEMPLATES_DIR))?;

        Ok(Self {
            config,
            base_dir,
            input_dir,
            output_dir,
            hooks: Arc::new(hooks),
            tree: Arc::new(tree),
            layout,
            formats: FormatRegistry::with_defaults(),
        })
    }

    /// Directory static assets are served from
    pub fn static_root(&self) -> PathBuf {
        self.base_dir.join(&self.config.server.static_root)
    }

    pub fn page_context(&self, id: NodeId, mode: UrlMode) -> Result<PageContext> {
        Renderer::new(self, mode).page_context(id)
    }

    pub fn template_env(&self, page: PageContext, mode: UrlMode) -> TemplateEnv {
        Renderer::new(self, mode).template_env(page)
    }

    /// Render one node
    pub fn render(&self, id: NodeId, mode: UrlMode) -> Result<Rendered> {
        Renderer::new(self, mode).render(id)
    }
}
