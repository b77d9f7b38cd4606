//! Functions available to content and layout templates

use chrono::format::{Item, StrftimeItems};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tera::{Function, Tera, Value};

use super::context::{node_url, PageContext};
use crate::content::{extension_of, ContentTree, NodeId, UrlMode};
use crate::helpers::{asset_url, is_local};
use crate::hooks::{HookRegistry, RenderHookFn};

/// Shared data the template functions of one page are bound to
#[derive(Clone)]
pub struct TemplateEnv {
    pub tree: Arc<ContentTree>,
    pub hooks: Arc<HookRegistry>,
    pub page: Arc<PageContext>,
    pub mode: UrlMode,
}

/// Register every template function on `tera`
pub fn register(tera: &mut Tera, env: TemplateEnv) {
    let static_url = env.page.static_url.clone();
    tera.register_function("asset", move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let name = string_arg(args, "asset", "name")?;
        Ok(Value::String(asset_url(&static_url, &name)))
    });

    let url_env = env.clone();
    tera.register_function("url_for", move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let path = string_arg(args, "url_for", "path")?;
        if !is_local(&path) {
            return Ok(Value::String(path));
        }
        let id = url_env
            .tree
            .resolve(&path)
            .ok_or_else(|| tera::Error::msg(format!("url_for: no page at '{}'", path)))?;
        Ok(Value::String(node_url(
            &url_env.tree,
            id,
            &url_env.page.base_url,
            url_env.mode,
        )))
    });

    tera.register_function("tree", TreeLookup::new(&env));

    let hook_env = env.clone();
    tera.register_function("render_hook", move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let name = string_arg(args, "render_hook", "name")?;
        let handlers = hook_env
            .hooks
            .get_named::<RenderHookFn>(&name)
            .map_err(|e| tera::Error::msg(e.to_string()))?;
        let markup: Vec<String> = handlers
            .iter()
            .map(|handler| handler(hook_env.page.as_ref()))
            .collect();
        Ok(Value::String(markup.join("\n")))
    });

    tera.register_function("env", |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let key = string_arg(args, "env", "key")?;
        let value = std::env::var(&key).ok().or_else(|| {
            args.get("default")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        });
        Ok(value.map(Value::String).unwrap_or(Value::Null))
    });

    tera.register_function("current_date", |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let format = args
            .get("format")
            .and_then(|v| v.as_str())
            .unwrap_or("%Y-%m-%d");
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(tera::Error::msg(format!(
                "current_date: invalid format '{}'",
                format
            )));
        }
        Ok(Value::String(
            chrono::Local::now().format(format).to_string(),
        ))
    });

    tera.register_function("json", |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let value = args.get("value").cloned().unwrap_or(Value::Null);
        serde_json::to_string_pretty(&value)
            .map(Value::String)
            .map_err(|e| tera::Error::msg(format!("json: {}", e)))
    });
}

fn string_arg(args: &HashMap<String, Value>, function: &str, key: &str) -> tera::Result<String> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(tera::Error::msg(format!(
            "Function `{}` was called without a `{}` argument",
            function, key
        ))),
    }
}

/// A node as seen through `tree()`
#[derive(Debug, Serialize)]
struct TreeEntry {
    name: String,
    title: String,
    url: String,
    path: String,
    is_dir: bool,
    /// Source text; a directory's is its index page's
    content: String,
}

/// `tree(path?)`: nested name to node lookup, built on first use and cached
/// per path for the rest of the page. A directory maps to its children plus
/// `root` for itself; a file maps to its entry.
struct TreeLookup {
    tree: Arc<ContentTree>,
    base_url: String,
    mode: UrlMode,
    cache: Mutex<HashMap<String, Value>>,
}

impl TreeLookup {
    fn new(env: &TemplateEnv) -> Self {
        Self {
            tree: env.tree.clone(),
            base_url: env.page.base_url.clone(),
            mode: env.mode,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn text_of(&self, id: NodeId) -> Option<&str> {
        self.tree.content(id).and_then(|file| file.text())
    }

    fn entry(&self, id: NodeId) -> TreeEntry {
        let node = self.tree.get(id);
        let content = match self.tree.directory(id) {
            Some(dir) => dir.index.and_then(|index| self.text_of(index)),
            None => self.text_of(id),
        };
        TreeEntry {
            name: node.name().to_string(),
            title: node.title().to_string(),
            url: node_url(&self.tree, id, &self.base_url, self.mode),
            path: node.info().relative.clone(),
            is_dir: node.is_directory(),
            content: content.unwrap_or_default().to_string(),
        }
    }

    fn build(&self, path: &str) -> tera::Result<Value> {
        let id = self
            .tree
            .resolve(path)
            .ok_or_else(|| tera::Error::msg(format!("tree: no page at '{}'", path)))?;
        self.subtree(id)
    }

    fn subtree(&self, id: NodeId) -> tera::Result<Value> {
        let Some(dir) = self.tree.directory(id) else {
            return to_value(&self.entry(id));
        };

        let mut map = serde_json::Map::new();
        map.insert("root".to_string(), to_value(&self.entry(id))?);
        for child in dir.children() {
            let node = self.tree.get(child);
            let key = lookup_key(node.name(), node.is_directory());
            map.insert(key, self.subtree(child)?);
        }
        Ok(Value::Object(map))
    }
}

impl Function for TreeLookup {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let path = match args.get("path") {
            Some(_) => string_arg(args, "tree", "path")?,
            None => String::new(),
        };

        let mut cache = self
            .cache
            .lock()
            .map_err(|_| tera::Error::msg("tree: lookup cache poisoned"))?;
        if let Some(value) = cache.get(&path) {
            return Ok(value.clone());
        }

        let value = self.build(&path)?;
        cache.insert(path, value.clone());
        Ok(value)
    }
}

fn to_value(entry: &TreeEntry) -> tera::Result<Value> {
    serde_json::to_value(entry).map_err(|e| tera::Error::msg(e.to_string()))
}

/// Template-friendly key for a node name: lower-cased, extension dropped for
/// files, with spaces, dashes and dots turned into underscores
pub fn lookup_key(name: &str, is_directory: bool) -> String {
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !is_directory && extension_of(name).is_some() => stem,
        _ => name,
    };
    stem.to_lowercase().replace([' ', '-', '.'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_site;

    fn render(template: &str) -> tera::Result<String> {
        let (_dir, site) = sample_site();
        let id = site.tree.resolve("guide/setup.md").unwrap();
        let page = site.page_context(id, UrlMode::Static).unwrap();

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        register(&mut tera, site.template_env(page.clone(), UrlMode::Static));
        let context = tera::Context::from_serialize(&page)?;
        tera.render_str(template, &context)
    }

    #[test]
    fn test_lookup_key() {
        assert_eq!(lookup_key("Getting Started.md", false), "getting_started");
        assert_eq!(lookup_key("api-v1.2", true), "api_v1_2");
        assert_eq!(lookup_key("LICENSE", false), "license");
    }

    #[test]
    fn test_asset_and_url_for() {
        let html = render(r#"{{ asset(name="css/site.css") }} {{ url_for(path="guide/advanced") }}"#)
            .unwrap();
        assert_eq!(html, "/static/css/site.css /guide/advanced/");
    }

    #[test]
    fn test_url_for_unknown_path_fails() {
        assert!(render(r#"{{ url_for(path="nope") }}"#).is_err());
    }

    #[test]
    fn test_tree_lookup() {
        let html = render(r#"{% set t = tree() %}{{ t.guide.root.title }}|{{ t.notes.url }}|{{ t.root.is_dir }}"#)
            .unwrap();
        assert_eq!(html, "Guide|/notes.html|true");

        let html = render(r#"{{ tree(path="guide").setup.title }}"#).unwrap();
        assert_eq!(html, "Setup");
    }

    #[test]
    fn test_tree_lookup_is_nested() {
        let html = render(r#"{% set t = tree() %}{{ t.guide.setup.title }}|{{ t.guide.advanced.deep.url }}"#)
            .unwrap();
        assert_eq!(html, "Setup|/guide/advanced/deep.html");

        let html = render(r#"{{ tree().guide.setup.content }}|{{ tree().notes.content }}"#).unwrap();
        assert_eq!(html, "# Setup\n\nInstall things.|plain notes <3");

        let html = render(r#"{{ tree(path="guide/setup.md").path }}"#).unwrap();
        assert_eq!(html, "guide/setup.md");
    }

    #[test]
    fn test_render_hook() {
        let html = render(r#"{{ render_hook(name="render_navbar_content") }}"#).unwrap();
        assert!(html.contains("navbar-menu"));
        assert_eq!(render(r#"{{ render_hook(name="nothing") }}"#).unwrap(), "");
    }

    #[test]
    fn test_render_hook_with_wrong_signature_fails() {
        assert!(render(r#"{{ render_hook(name="construct_menu") }}"#).is_err());
    }

    #[test]
    fn test_env_current_date_and_json() {
        let html = render(r#"{{ env(key="DOCSITE_SURELY_UNSET", default="fallback") }}"#).unwrap();
        assert_eq!(html, "fallback");

        let date = render("{{ current_date() }}").unwrap();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");

        let json = render(r#"{{ json(value=page.title) }}"#).unwrap();
        assert_eq!(json, "\"Setup\"");
    }
}
