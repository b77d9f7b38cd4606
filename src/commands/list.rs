//! List the content tree

use anyhow::Result;
use std::io::Write;

use crate::content::UrlMode;
use crate::render::node_url;
use crate::Site;

/// One line per node: indented title, URL and depth
pub fn lines(site: &Site) -> Vec<String> {
    let tree = &site.tree;
    let base_url = &site.config.server.base_url;

    tree.traverse()
        .into_iter()
        .map(|id| {
            let node = tree.get(id);
            let depth = node.info().depth;
            format!(
                "{}{} [{}] (depth {})",
                "  ".repeat(depth),
                node.title(),
                node_url(tree, id, base_url, UrlMode::Static),
                depth
            )
        })
        .collect()
}

/// Print the tree to stdout
pub fn run(site: &Site) -> Result<()> {
    let lines = lines(site);
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{} ({} nodes):", site.config.project.name, lines.len())?;
    for line in lines {
        writeln!(stdout, "{}", line)?;
    }
    Ok(())
}
