//! Render the whole site into the output directory

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::content::{Node, UrlMode};
use crate::error::Error;
use crate::helpers::is_local;
use crate::hooks::{AFTER_BUILD, BEFORE_BUILD};
use crate::Site;

/// Summary of a finished build
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub pages: usize,
    pub raw_files: usize,
    pub assets: usize,
}

/// Build the static site
pub fn run(site: &Site) -> Result<BuildStats> {
    let start = std::time::Instant::now();

    for handler in site.hooks.get(BEFORE_BUILD) {
        handler(site).map_err(|e| Error::hook("before_build", e))?;
    }

    fs::create_dir_all(&site.output_dir)
        .with_context(|| format!("Failed to create {:?}", site.output_dir))?;

    let mut stats = BuildStats::default();
    for id in site.tree.traverse() {
        let node = site.tree.get(id);
        let output = output_file(node);

        let rendered = site
            .render(id, UrlMode::Static)
            .map_err(|e| Error::Build {
                node: display_name(node),
                source: Box::new(e),
            })?;

        if rendered.is_page() {
            stats.pages += 1;
        } else {
            stats.raw_files += 1;
        }

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create {:?} for {}", parent, display_name(node))
            })?;
        }
        fs::write(&output, rendered.into_bytes())
            .with_context(|| format!("Failed to write {:?}", output))?;
        tracing::debug!("Wrote {:?}", output);
    }

    stats.assets = copy_static_assets(site)?;

    for handler in site.hooks.get(AFTER_BUILD) {
        handler(site).map_err(|e| Error::hook("after_build", e))?;
    }

    tracing::info!(
        "Built {} pages and {} files ({} static assets) in {:.2}s",
        stats.pages,
        stats.raw_files,
        stats.assets,
        start.elapsed().as_secs_f64()
    );
    Ok(stats)
}

/// Where a node is written: directories as `<dir>/index.html`
fn output_file(node: &Node) -> PathBuf {
    match node {
        Node::Directory(dir) => dir.info.output_path.join("index.html"),
        Node::Content(file) => file.info.output_path.clone(),
    }
}

fn display_name(node: &Node) -> String {
    let relative = &node.info().relative;
    if relative.is_empty() {
        node.name().to_string()
    } else {
        relative.clone()
    }
}

/// Copy the static root under the static URL path, when that path is local
fn copy_static_assets(site: &Site) -> Result<usize> {
    let static_root = site.static_root();
    let static_url = &site.config.server.static_url;
    if !static_root.is_dir() || !is_local(static_url) {
        return Ok(0);
    }

    let target = site.output_dir.join(static_url.trim_matches('/'));
    copy_dir(&static_root, &target)
}

fn copy_dir(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(from)?;
        let dest = to.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dest)
            .with_context(|| format!("Failed to copy {:?}", entry.path()))?;
        copied += 1;
    }
    Ok(copied)
}
