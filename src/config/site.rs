//! Site configuration (docsite.yml)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::menu::Menu;

/// Default configuration file name
pub const CONFIG_FILE: &str = "docsite.yml";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    pub project: ProjectConfig,
    pub server: ServerConfig,

    /// Extra values exposed to templates as `ctx`
    pub context: IndexMap<String, serde_yaml::Value>,

    /// Explicit menu; derived from the content tree when absent or empty
    pub menu: Option<Menu>,

    /// Optional features to enable by id
    pub features: Vec<String>,
}

/// Project section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    pub repository: String,
    /// Documentation source directory
    #[serde(rename = "input")]
    pub input_dir: String,
    /// Output directory for `build`
    #[serde(rename = "output")]
    pub output_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: String::new(),
            repository: String::new(),
            input_dir: String::new(),
            output_dir: "docs_output".to_string(),
        }
    }
}

/// Server section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub hostname: String,
    pub port: u16,
    pub base_url: String,
    pub static_url: String,
    pub static_root: String,
    pub private_key: String,
    pub certificate: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 8080,
            base_url: "/".to_string(),
            static_url: "/static".to_string(),
            static_root: "static".to_string(),
            private_key: String::new(),
            certificate: String::new(),
        }
    }
}

impl SiteConfig {
    /// Load and validate configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NoConfig(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config: SiteConfig = serde_yaml::from_str(&content).map_err(|e| Error::Yaml {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.normalize();
        config.validate()?;

        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Fill in defaults for values that were given but left empty
    pub fn normalize(&mut self) {
        if self.server.port == 0 {
            self.server.port = 8080;
        }
        if self.server.base_url.is_empty() {
            self.server.base_url = "/".to_string();
        }
        if self.server.static_url.is_empty() {
            self.server.static_url = "/static".to_string();
        }
        if self.project.output_dir.is_empty() {
            self.project.output_dir = "docs_output".to_string();
        }
    }

    /// Check that every required field is present
    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(Error::MissingField("project.name"));
        }
        if self.project.version.trim().is_empty() {
            return Err(Error::MissingField("project.version"));
        }
        if self.project.input_dir.trim().is_empty() {
            return Err(Error::MissingField("project.input"));
        }
        Ok(())
    }

    /// Input directory resolved against `base_dir`
    pub fn input_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.project.input_dir)
    }

    /// Output directory resolved against `base_dir`
    pub fn output_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.project.output_dir)
    }

    /// Whether the configuration declares a menu with items
    pub fn has_explicit_menu(&self) -> bool {
        self.menu.as_ref().is_some_and(|m| !m.items.is_empty())
    }

    /// Render a starter configuration for `init`
    pub fn starter(name: &str) -> Self {
        Self {
            project: ProjectConfig {
                name: name.to_string(),
                version: "0.1.0".to_string(),
                input_dir: "docs".to_string(),
                ..ProjectConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.base_url, "/");
        assert_eq!(config.server.static_url, "/static");
        assert_eq!(config.project.output_dir, "docs_output");
        assert!(config.menu.is_none());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
project:
  name: My Docs
  version: 1.2.0
  input: documentation
server:
  port: 9000
  base_url: /docs/
context:
  zeta: 1
  alpha: two
menu:
  logo: logo.svg
  items:
    - name: Guide
      path: guide
    - path: https://example.com
features:
  - search
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.project.name, "My Docs");
        assert_eq!(config.project.input_dir, "documentation");
        assert_eq!(config.project.output_dir, "docs_output");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.base_url, "/docs/");
        assert_eq!(config.server.hostname, "localhost");
        assert_eq!(
            config.context.keys().collect::<Vec<_>>(),
            vec!["zeta", "alpha"]
        );
        let menu = config.menu.as_ref().unwrap();
        assert_eq!(menu.logo, "logo.svg");
        assert_eq!(menu.items.len(), 2);
        assert_eq!(menu.items[0].url, "guide");
        assert_eq!(config.features, vec!["search"]);
        assert!(config.has_explicit_menu());
    }

    #[test]
    fn test_validate_required_fields() {
        let mut config = SiteConfig::default();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingField("project.name"))
        ));

        config.project.name = "Docs".to_string();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingField("project.version"))
        ));

        config.project.version = "1.0".to_string();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingField("project.input"))
        ));

        config.project.input_dir = "docs".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_normalize_empty_values() {
        let yaml = r#"
project: { name: a, version: b, input: c, output: "" }
server: { port: 0, base_url: "", static_url: "" }
"#;
        let mut config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        config.normalize();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.base_url, "/");
        assert_eq!(config.server.static_url, "/static");
        assert_eq!(config.project.output_dir, "docs_output");
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SiteConfig::load(dir.path().join(CONFIG_FILE));
        assert!(matches!(result, Err(Error::NoConfig(_))));
    }
}
