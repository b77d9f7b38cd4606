//! Comment-style front matter and text/binary classification
//!
//! A text file may start with lines such as
//!
//! ```text
//! // title: Setup
//! // next: guide/advanced
//! // previous:
//! ```
//!
//! Scanning stops at the first line that is not a `// key: value` comment
//! with a recognized key; that line starts the body. Malformed lines are
//! never errors, they simply become content.

use serde::Serialize;
use std::sync::Arc;

use crate::hooks::{HookError, HookRegistry, IsTextFileFn, IS_TEXT_FILE};

/// Marker that introduces a metadata line
pub const COMMENT_MARKER: &str = "//";

/// Metadata extracted from the head of a content file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// Path segments of the explicit next page
    pub next: Vec<String>,
    /// Path segments of the explicit previous page
    pub previous: Vec<String>,
}

impl FrontMatter {
    /// Parse front matter from content.
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> (Self, String) {
        let normalized = content.trim().replace("\r\n", "\n");
        let lines: Vec<&str> = normalized.split('\n').collect();

        let mut fm = FrontMatter::default();
        let mut body_start = lines.len();

        for (i, line) in lines.iter().enumerate() {
            let Some((key, value)) = parse_line(line) else {
                body_start = i;
                break;
            };

            match key.to_lowercase().as_str() {
                "title" => fm.title = Some(value.to_string()).filter(|t| !t.is_empty()),
                "next" => fm.next = split_reference(value),
                "previous" => fm.previous = split_reference(value),
                _ => {
                    body_start = i;
                    break;
                }
            }
        }

        let body = lines[body_start..].join("\n").trim().to_string();
        (fm, body)
    }

    /// Whether no metadata was found
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.next.is_empty() && self.previous.is_empty()
    }
}

/// Split a `// key: value` line into its key and value
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim().strip_prefix(COMMENT_MARKER)?;
    let (key, value) = rest.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

/// Split a slash-delimited reference into path segments
pub fn split_reference(value: &str) -> Vec<String> {
    value
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether the first line of `content` is valid UTF-8
pub fn first_line_is_utf8(content: &[u8]) -> bool {
    let end = content
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(content.len());
    std::str::from_utf8(&content[..end]).is_ok()
}

/// Ask every registered `is_text_file` handler; all of them must agree
pub fn is_text_file(hooks: &HookRegistry, name: &str, content: &[u8]) -> bool {
    hooks
        .get(IS_TEXT_FILE)
        .iter()
        .all(|handler| handler(name, content))
}

/// Register the default UTF-8 text detection
pub fn install_hooks(registry: &mut HookRegistry) -> Result<(), HookError> {
    let handler: Arc<IsTextFileFn> =
        Arc::new(|_name: &str, content: &[u8]| first_line_is_utf8(content));
    registry.register(IS_TEXT_FILE, 100, handler)
}
