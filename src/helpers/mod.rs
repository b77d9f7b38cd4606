//! Helper functions shared by the render pipeline, menu and server

pub mod html;
pub mod url;

pub use html::{escape, strip_html, truncate};
pub use url::{asset_url, decode_path, encode_path, is_local, object_url};
