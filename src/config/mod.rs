//! Configuration module

mod site;

pub use site::ProjectConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
pub use site::CONFIG_FILE;
