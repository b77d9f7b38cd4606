//! Initialize a new documentation project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::{SiteConfig, CONFIG_FILE};
use crate::templates::TEMPLATES_DIR;

const STARTER_STYLESHEET: &str = include_str!("starter/docsite.css");

/// Create a starter project in `target_dir`.
///
/// Refuses to touch a directory that already has a configuration file
/// unless `force` is set.
pub fn init_site(target_dir: &Path, force: bool) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{:?} already exists (use --force to overwrite)",
            config_path
        );
    }

    let name = target_dir
        .canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Documentation".to_string());

    let config = SiteConfig::starter(&name);
    let input_dir = config.input_dir(target_dir);
    let static_dir = target_dir.join(&config.server.static_root);

    fs::create_dir_all(&input_dir)
        .with_context(|| format!("Failed to create {:?}", input_dir))?;
    fs::create_dir_all(target_dir.join(TEMPLATES_DIR))?;
    fs::create_dir_all(static_dir.join("css"))?;

    let yaml = serde_yaml::to_string(&config)?;
    fs::write(&config_path, yaml)?;

    let index = format!(
        "// title: {name}\n# {name}\n\nWelcome to your documentation. Edit `{}/index.md` to get started.\n",
        config.project.input_dir
    );
    fs::write(input_dir.join("index.md"), index)?;
    fs::write(static_dir.join("css").join("docsite.css"), STARTER_STYLESHEET)?;

    tracing::info!("Initialized {} in {:?}", name, target_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;

    #[test]
    fn test_init_creates_loadable_project() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("handbook");
        fs::create_dir_all(&target).unwrap();

        init_site(&target, false).unwrap();
        assert!(target.join(".docsite/templates").is_dir());
        assert!(target.join("static/css/docsite.css").is_file());

        let site = Site::load(&target, None).unwrap();
        assert_eq!(site.config.project.name, "handbook");
        assert_eq!(site.tree.get(site.tree.root()).title(), "handbook");
    }

    #[test]
    fn test_init_refuses_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path(), false).unwrap();
        fs::write(dir.path().join("docs/extra.md"), "# Extra").unwrap();

        assert!(init_site(dir.path(), false).is_err());
        init_site(dir.path(), true).unwrap();
        assert!(dir.path().join("docs/extra.md").exists());
    }
}
