//! Error types shared by the library

use std::path::PathBuf;

use crate::hooks::HookError;

/// Result alias for library operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort loading, building or serving a site.
///
/// Content-stage failures (template or format conversion) are not part of
/// this enum: the render pipeline turns those into inline error text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no config file found at {}", .0.display())]
    NoConfig(PathBuf),

    #[error("'{0}' is required in the configuration")]
    MissingField(&'static str),

    #[error("input root does not exist: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("no templates found in directory {}", .0.display())]
    NoTemplates(PathBuf),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("menu item not found: {0}")]
    MenuItemNotFound(String),

    #[error("menu item {index} has no URL: {name}")]
    MenuItemNoUrl { index: usize, name: String },

    #[error("menu item {name} has too many levels: {depth} > {max}")]
    MenuTooDeep {
        name: String,
        depth: usize,
        max: usize,
    },

    #[error("{node}: {field} reference '{path}' does not resolve to any page")]
    UnresolvedReference {
        node: String,
        field: &'static str,
        path: String,
    },

    #[error("feature not found: {0}")]
    UnknownFeature(String),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("{hook} handler failed: {message}")]
    HookFailed { hook: &'static str, message: String },

    #[error("layout template error: {0}")]
    Layout(#[from] tera::Error),

    #[error("error building {node}: {source}")]
    Build {
        node: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failed lifecycle or render callback
    pub fn hook(hook: &'static str, err: anyhow::Error) -> Self {
        Error::HookFailed {
            hook,
            message: format!("{:#}", err),
        }
    }
}

/// Render an error and its sources as one line
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
