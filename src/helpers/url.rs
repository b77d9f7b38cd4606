//! URL helper functions

use lazy_static::lazy_static;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;

lazy_static! {
    static ref SCHEME: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").unwrap();
}

/// Characters escaped when a path segment is placed in a URL
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Whether `target` refers to something inside the site rather than an
/// external resource with a URL scheme
///
/// # Examples
/// ```ignore
/// is_local("guide/setup.md")      // -> true
/// is_local("https://example.com") // -> false
/// ```
pub fn is_local(target: &str) -> bool {
    !SCHEME.is_match(target)
}

/// Join URL path pieces with single slashes, keeping a leading slash
pub fn join(base: &str, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let joined = segments.join("/");
    if base.starts_with('/') || (base.is_empty() && path.starts_with('/')) {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Public URL of a node: its site-relative URL under `base_url`.
/// Directory URLs always end with a slash.
///
/// # Examples
/// ```ignore
/// object_url("/docs/", "/guide/", true)         // -> "/docs/guide/"
/// object_url("/docs/", "/guide/setup.html", false) // -> "/docs/guide/setup.html"
/// ```
pub fn object_url(base_url: &str, url: &str, is_directory: bool) -> String {
    let url = url.replace('\\', "/");
    let mut joined = join(base_url, &url);
    if joined.is_empty() {
        joined.push('/');
    }
    if is_directory && !joined.ends_with('/') {
        joined.push('/');
    }
    joined
}

/// URL of a static asset under `static_url`.
///
/// A local static root yields an absolute path; an external one (for
/// example a repository's raw file host) gets `?raw=true` appended.
pub fn asset_url(static_url: &str, name: &str) -> String {
    if is_local(static_url) {
        let path = join(static_url, name);
        return if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
    }

    let mut name = name.to_string();
    if name.starts_with('/') && static_url.ends_with('/') {
        name.remove(0);
    }
    if !static_url.ends_with('/') && !name.starts_with('/') {
        name.insert(0, '/');
    }
    format!("{}{}?raw=true", static_url, name)
}

/// Percent-encode each segment of a path
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Decode a percent-encoded request path
pub fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}
