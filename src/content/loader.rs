//! Content loader - builds the content tree from the input directory

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::frontmatter::{self, FrontMatter};
use super::node::{is_index_file, Body, ContentNode, DirectoryNode, Node, NodeId, NodeInfo};
use super::ContentTree;
use crate::error::{Error, Result};
use crate::hooks::HookRegistry;

/// Builds a [`ContentTree`] with one synchronous scan of the input directory
pub struct ContentLoader<'a> {
    hooks: &'a HookRegistry,
    input_dir: PathBuf,
    output_dir: PathBuf,
    root_name: String,
    nodes: Vec<Node>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(hooks: &'a HookRegistry, input_dir: &Path, output_dir: &Path) -> Self {
        Self {
            hooks,
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            root_name: String::new(),
            nodes: Vec::new(),
        }
    }

    /// Name given to the root directory (usually the project name)
    pub fn root_name(mut self, name: &str) -> Self {
        self.root_name = name.to_string();
        self
    }

    /// Scan the input directory and build the tree
    pub fn load(mut self) -> Result<ContentTree> {
        let input_dir = self.input_dir.clone();
        let output_dir = self.output_dir.clone();
        let root_name = self.root_name.clone();

        let root = self.load_directory(&root_name, &input_dir, &output_dir, "", 0)?;
        tracing::info!(
            "Loaded {} nodes from {:?}",
            self.nodes.len(),
            self.input_dir
        );
        Ok(ContentTree::from_parts(self.nodes, root))
    }

    fn load_directory(
        &mut self,
        name: &str,
        path: &Path,
        output: &Path,
        relative: &str,
        depth: usize,
    ) -> Result<NodeId> {
        let entries = list_directory(path)?;
        if entries.is_empty() && depth == 0 {
            return Err(Error::NoTemplates(path.to_path_buf()));
        }

        let mut dir = DirectoryNode::new(NodeInfo {
            name: name.to_string(),
            source_path: path.to_path_buf(),
            output_path: output.to_path_buf(),
            relative: relative.to_string(),
            depth,
            meta: FrontMatter::default(),
        });

        for entry in entries {
            let entry_name = entry.file_name().to_string_lossy().to_string();
            let entry_path = entry.path();
            let entry_output = output.join(&entry_name);
            let entry_relative = join_relative(relative, &entry_name);

            if entry.file_type().is_dir() {
                let sub = self.load_directory(
                    &entry_name,
                    entry_path,
                    &entry_output,
                    &entry_relative,
                    depth + 1,
                )?;
                dir.subdirectories.insert(entry_name, sub);
                continue;
            }

            let file = self.load_file(&entry_name, entry_path, entry_output, entry_relative, depth + 1)?;
            if is_index_file(&entry_name) {
                dir.info.meta = file.info.meta.clone();
                dir.index = Some(self.push(Node::Content(file)));
            } else {
                let id = self.push(Node::Content(file));
                dir.files.insert(entry_name, id);
            }
        }

        tracing::debug!(
            "Directory {:?}: {} subdirectories, {} files, index: {}",
            path,
            dir.subdirectories.len(),
            dir.files.len(),
            dir.index.is_some()
        );
        Ok(self.push(Node::Directory(dir)))
    }

    /// Load a single file and extract its front matter
    fn load_file(
        &self,
        name: &str,
        path: &Path,
        output: PathBuf,
        relative: String,
        depth: usize,
    ) -> Result<ContentNode> {
        let content = fs::read(path).map_err(|e| Error::io(path, e))?;
        let is_text = frontmatter::is_text_file(self.hooks, name, &content);

        // Known only now: text-ness depends on the content, not just the name
        let output_path = if is_text {
            output.with_extension("html")
        } else {
            output
        };

        let (meta, body) = if is_text {
            // Only the first line decides text-ness; later invalid bytes are replaced
            let text = match String::from_utf8(content) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(
                        "{:?} is not valid UTF-8 after its first line; invalid bytes replaced",
                        path
                    );
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };
            let (meta, body) = FrontMatter::parse(&text);
            (meta, Body::Text(body))
        } else {
            let body = match String::from_utf8(content) {
                Ok(text) => Body::Text(text),
                Err(e) => Body::Binary(e.into_bytes()),
            };
            (FrontMatter::default(), body)
        };

        tracing::debug!("Loaded {:?} (text: {})", path, is_text);

        Ok(ContentNode {
            info: NodeInfo {
                name: name.to_string(),
                source_path: path.to_path_buf(),
                output_path,
                relative,
                depth,
                meta,
            },
            body,
            is_text,
        })
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

/// List a directory's entries, directories first, then by name
fn list_directory(path: &Path) -> Result<Vec<DirEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by(|a, b| directories_first(a, b))
    {
        let entry = entry.map_err(|e| {
            let entry_path = e.path().unwrap_or(path).to_path_buf();
            Error::io(entry_path, e.into())
        })?;

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        entries.push(entry);
    }

    Ok(entries)
}

fn directories_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    b.file_type()
        .is_dir()
        .cmp(&a.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn join_relative(relative: &str, name: &str) -> String {
    if relative.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", relative, name)
    }
}
