//! Content and directory nodes

use indexmap::IndexMap;
use std::path::PathBuf;

use super::FrontMatter;

/// Handle to a node stored in a [`ContentTree`](super::ContentTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How URLs are produced for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlMode {
    /// Static build: text files link to their `.html` output
    Static,
    /// Live serving: files are addressed by their source name
    Serve,
}

/// Positional data shared by files and directories
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub name: String,
    /// Absolute source path
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    /// Slash-joined path relative to the input root, empty for the root
    pub relative: String,
    /// Number of segments in `relative`
    pub depth: usize,
    pub meta: FrontMatter,
}

impl NodeInfo {
    /// Title from metadata, falling back to the name
    pub fn title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or(&self.name)
    }
}

/// Stored file content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// UTF-8 content (front matter already removed for text files)
    Text(String),
    /// Opaque bytes passed through unchanged
    Binary(Vec<u8>),
}

/// A single source file
#[derive(Debug, Clone)]
pub struct ContentNode {
    pub info: NodeInfo,
    /// Pristine body as extracted at load time; rendering never mutates it
    pub body: Body,
    /// Renderable text page (as opposed to a passthrough file)
    pub is_text: bool,
}

impl ContentNode {
    /// Body as text, if it can be used as a template
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Text(text) => Some(text),
            Body::Binary(_) => None,
        }
    }

    /// File extension of the source name, lower-cased
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.info.name)
    }

    /// URL path relative to the site root
    pub fn url(&self, mode: UrlMode) -> String {
        let relative = &self.info.relative;
        match mode {
            UrlMode::Serve => format!("/{}", relative.trim_start_matches('/')),
            UrlMode::Static if self.is_text => {
                let stem = match relative.rfind('.') {
                    Some(dot) if dot > relative.rfind('/').map_or(0, |s| s + 1) => &relative[..dot],
                    _ => relative.as_str(),
                };
                format!("/{}.html", stem.trim_start_matches('/'))
            }
            UrlMode::Static => format!("/{}", relative.trim_start_matches('/')),
        }
    }
}

/// A source directory
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    pub info: NodeInfo,
    pub subdirectories: IndexMap<String, NodeId>,
    pub files: IndexMap<String, NodeId>,
    /// File named `index.*` or `readme.*`, kept out of `files`
    pub index: Option<NodeId>,
}

impl DirectoryNode {
    pub fn new(info: NodeInfo) -> Self {
        Self {
            info,
            subdirectories: IndexMap::new(),
            files: IndexMap::new(),
            index: None,
        }
    }

    /// URL path relative to the site root, always with a trailing slash
    pub fn url(&self) -> String {
        let relative = self.info.relative.trim_matches('/');
        if relative.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", relative)
        }
    }

    /// Children in listing order: subdirectories first, then files
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.subdirectories
            .values()
            .chain(self.files.values())
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.subdirectories.is_empty() && self.files.is_empty() && self.index.is_none()
    }
}

/// Either kind of tree node
#[derive(Debug, Clone)]
pub enum Node {
    Directory(DirectoryNode),
    Content(ContentNode),
}

impl Node {
    pub fn info(&self) -> &NodeInfo {
        match self {
            Node::Directory(dir) => &dir.info,
            Node::Content(file) => &file.info,
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn title(&self) -> &str {
        self.info().title()
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    pub fn next_path(&self) -> &[String] {
        &self.info().meta.next
    }

    pub fn previous_path(&self) -> &[String] {
        &self.info().meta.previous
    }

    /// URL path relative to the site root (without base URL)
    pub fn url(&self, mode: UrlMode) -> String {
        match self {
            Node::Directory(dir) => dir.url(),
            Node::Content(file) => file.url(mode),
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::Content(_) => None,
        }
    }

    pub fn as_content(&self) -> Option<&ContentNode> {
        match self {
            Node::Content(file) => Some(file),
            Node::Directory(_) => None,
        }
    }
}

/// Whether `name` follows the index-file convention
pub fn is_index_file(name: &str) -> bool {
    name.starts_with("index.") || name.to_lowercase().starts_with("readme.")
}

/// Lower-cased extension of a file name, without the dot
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}
