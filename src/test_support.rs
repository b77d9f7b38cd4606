//! Fixtures shared by the unit tests

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::content::{ContentLoader, ContentTree};
use crate::hooks::{declare_core_points, HookError, HookRegistry};
use crate::Site;

/// A small documentation tree used across tests
pub const SAMPLE_FILES: &[(&str, &str)] = &[
    ("index.md", "// title: Sample Home\n# Welcome"),
    ("guide/index.md", "// title: Guide\n# Guide"),
    (
        "guide/setup.md",
        "// title: Setup\n// next: guide/advanced\n// previous: guide\n# Setup\n\nInstall things.",
    ),
    ("guide/advanced/deep.md", "# Deep"),
    ("notes.txt", "plain notes <3"),
];

pub fn sample_files() -> Vec<(&'static str, &'static str)> {
    SAMPLE_FILES.to_vec()
}

/// Registry with the core points and the loader's default handlers
pub fn default_hooks() -> HookRegistry {
    let mut hooks = HookRegistry::new();
    declare_core_points(&mut hooks).unwrap();
    crate::content::frontmatter::install_hooks(&mut hooks).unwrap();
    crate::render::formats::install_hooks(&mut hooks).unwrap();
    hooks
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

/// Write `files` under `<tmp>/docs` and load them with output in `<tmp>/out`
pub fn write_tree(files: &[(&str, &str)]) -> (TempDir, ContentTree) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("docs");
    fs::create_dir_all(&input).unwrap();
    write_files(&input, files);

    let hooks = default_hooks();
    let tree = ContentLoader::new(&hooks, &input, &dir.path().join("out"))
        .root_name("Sample")
        .load()
        .unwrap();
    (dir, tree)
}

pub fn sample_tree() -> (TempDir, ContentTree) {
    write_tree(SAMPLE_FILES)
}

pub fn sample_config() -> SiteConfig {
    let mut config = SiteConfig::starter("Sample");
    config.project.output_dir = "out".to_string();
    config
        .context
        .insert("team".to_string(), serde_yaml::Value::from("docs-team"));
    config
}

/// Full site over `files`, with extra hook registrations
pub fn write_site_with<F>(files: &[(&str, &str)], install: F) -> (TempDir, Site)
where
    F: FnOnce(&mut HookRegistry) -> Result<(), HookError>,
{
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("docs");
    fs::create_dir_all(&input).unwrap();
    write_files(&input, files);

    let site = Site::with_hooks(dir.path(), sample_config(), install).unwrap();
    (dir, site)
}

pub fn write_site(files: &[(&str, &str)]) -> (TempDir, Site) {
    write_site_with(files, |_| Ok(()))
}

pub fn sample_site() -> (TempDir, Site) {
    write_site(SAMPLE_FILES)
}
