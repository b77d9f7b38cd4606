//! Optional features
//!
//! A feature extends the core only by registering hook handlers. Features are
//! enabled by id from the `features:` list of the configuration.

mod search;

pub use search::{SearchEntry, SearchFeature, SEARCH_INDEX_FILE};

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::hooks::{HookError, HookRegistry};

/// An optional bundle of hook registrations
pub trait Feature: Send + Sync {
    /// Identifier used in the configuration
    fn id(&self) -> &'static str;

    /// Register the feature's handlers
    fn init(&self, registry: &mut HookRegistry, config: &SiteConfig) -> Result<(), HookError>;
}

/// Every feature that can be enabled
pub fn catalogue() -> Vec<Box<dyn Feature>> {
    vec![Box::new(SearchFeature)]
}

/// Initialise the features named by `ids`, in order
pub fn enable(ids: &[String], registry: &mut HookRegistry, config: &SiteConfig) -> Result<()> {
    let available = catalogue();
    for id in ids {
        let feature = available
            .iter()
            .find(|feature| feature.id() == id)
            .ok_or_else(|| Error::UnknownFeature(id.clone()))?;

        feature.init(registry, config)?;
        tracing::debug!("Enabled feature '{}'", id);
    }
    Ok(())
}
