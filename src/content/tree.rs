//! Arena-backed content tree and path resolution
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`], so no
//! node needs a pointer back to the root: every lookup goes through the
//! tree. Resolution walks one segment per directory level, O(depth).

use super::node::{ContentNode, DirectoryNode, Node, NodeId};
use crate::error::{Error, Result};

/// The content tree for one build or serve run
#[derive(Debug, Clone)]
pub struct ContentTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ContentTree {
    pub(crate) fn from_parts(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_directory(&self) -> &DirectoryNode {
        match self.get(self.root) {
            Node::Directory(dir) => dir,
            Node::Content(_) => unreachable!("tree root is always a directory"),
        }
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn directory(&self, id: NodeId) -> Option<&DirectoryNode> {
        self.get(id).as_directory()
    }

    pub fn content(&self, id: NodeId) -> Option<&ContentNode> {
        self.get(id).as_content()
    }

    /// Number of nodes, index files included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve path segments starting at the root
    pub fn walk<S: AsRef<str>>(&self, segments: &[S]) -> Option<NodeId> {
        self.walk_from(self.root, segments)
    }

    /// Resolve path segments starting at `from`.
    ///
    /// An empty path resolves to `from` itself. A single segment naming a
    /// directory's index file resolves to the directory. Trailing empty
    /// segments (from a trailing slash) are ignored; any other leftover
    /// segment after reaching a file is a miss.
    pub fn walk_from<S: AsRef<str>>(&self, from: NodeId, segments: &[S]) -> Option<NodeId> {
        let mut current = from;
        let mut rest = segments;

        loop {
            if all_empty(rest) {
                return Some(current);
            }

            let dir = self.directory(current)?;
            let (head, tail) = rest.split_first()?;
            let head = head.as_ref();

            if let Some(index) = dir.index {
                if all_empty(tail) && self.get(index).name() == head {
                    return Some(current);
                }
            }

            if let Some(&sub) = dir.subdirectories.get(head) {
                current = sub;
                rest = tail;
                continue;
            }

            if let Some(&file) = dir.files.get(head) {
                return all_empty(tail).then_some(file);
            }

            return None;
        }
    }

    /// Resolve a slash-delimited path starting at the root
    pub fn resolve(&self, path: &str) -> Option<NodeId> {
        self.walk(&split_path(path))
    }

    /// Node referenced by `id`'s explicit next path
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        let path = self.get(id).next_path();
        if path.is_empty() {
            return None;
        }
        self.walk(path)
    }

    /// Node referenced by `id`'s explicit previous path
    pub fn previous(&self, id: NodeId) -> Option<NodeId> {
        let path = self.get(id).previous_path();
        if path.is_empty() {
            return None;
        }
        self.walk(path)
    }

    /// Pre-order traversal: a directory, its subdirectories (recursively),
    /// then its files. Index files are represented by their directory.
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.collect_from(self.root, &mut order);
        order
    }

    fn collect_from(&self, id: NodeId, order: &mut Vec<NodeId>) {
        order.push(id);
        if let Some(dir) = self.directory(id) {
            for &sub in dir.subdirectories.values() {
                self.collect_from(sub, order);
            }
            order.extend(dir.files.values().copied());
        }
    }

    /// Check that every explicit next/previous reference resolves
    pub fn validate_references(&self) -> Result<()> {
        for id in self.traverse() {
            let node = self.get(id);
            for (field, path) in [("next", node.next_path()), ("previous", node.previous_path())] {
                if !path.is_empty() && self.walk(path).is_none() {
                    return Err(Error::UnresolvedReference {
                        node: display_path(node),
                        field,
                        path: path.join("/"),
                    });
                }
            }
        }
        Ok(())
    }
}

fn all_empty<S: AsRef<str>>(segments: &[S]) -> bool {
    segments.iter().all(|s| s.as_ref().is_empty())
}

fn display_path(node: &Node) -> String {
    let relative = &node.info().relative;
    if relative.is_empty() {
        node.name().to_string()
    } else {
        relative.clone()
    }
}

/// Split a URL-like path into non-empty segments
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
