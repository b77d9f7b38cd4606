//! Content module - the content tree, front matter and markdown processing

pub mod frontmatter;
pub mod loader;
mod markdown;
mod node;
mod tree;

pub use frontmatter::{is_text_file, FrontMatter};
pub use loader::ContentLoader;
pub use markdown::MarkdownRenderer;
pub use node::{
    extension_of, is_index_file, Body, ContentNode, DirectoryNode, Node, NodeId, NodeInfo, UrlMode,
};
pub use tree::{split_path, ContentTree};
