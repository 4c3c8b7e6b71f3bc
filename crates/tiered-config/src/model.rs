//! Key-path model: the hierarchical tree every source writes into.

use crate::loader::merge::merge_values;
use serde_json::{Map, Value};
use std::fmt;

/// Ordered sequence of lower-cased, non-empty key segments.
///
/// The empty path addresses the model root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Split `raw` on `delimiter`, lower-casing segments and dropping empty ones.
    pub fn parse(raw: &str, delimiter: &str) -> Self {
        if delimiter.is_empty() {
            return Self::from_segments([raw]);
        }
        Self::from_segments(raw.split(delimiter))
    }

    /// Build a path from pre-split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .filter(|segment| !segment.as_ref().is_empty())
            .map(|segment| segment.as_ref().to_lowercase())
            .collect();
        Self { segments }
    }

    /// Lower-cased segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True for the empty path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path extended with one more segment (ignored when empty).
    pub fn child(&self, segment: &str) -> Self {
        let mut next = self.clone();
        next.extend(&KeyPath::from_segments([segment]));
        next
    }

    /// Append all segments of `other`.
    pub fn extend(&mut self, other: &KeyPath) {
        self.segments.extend(other.segments.iter().cloned());
    }

    /// Render with the given delimiter.
    pub fn join(&self, delimiter: &str) -> String {
        self.segments.join(delimiter)
    }
}

/// Renders dot-delimited; the root renders as `<root>`.
impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }
        f.write_str(&self.join("."))
    }
}

/// Progressively merged configuration, rooted at a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    root: Value,
}

impl Default for Tree {
    fn default() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }
}

impl Tree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` at `path`.
    ///
    /// Mappings merge key-by-key into an existing mapping; anything else
    /// replaces what was there. A non-mapping write at the root is ignored.
    pub fn set(&mut self, path: &KeyPath, value: Value) {
        if path.is_root() && !value.is_object() {
            return;
        }
        insert_at(&mut self.root, path.segments(), value);
    }

    /// Value rooted at `path`, or `None` when the path does not exist.
    pub fn subtree(&self, path: &KeyPath) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(&self.root, |node, segment| node.as_object()?.get(segment))
    }

    /// Lookup by a delimited string path.
    pub fn get(&self, raw: &str, delimiter: &str) -> Option<&Value> {
        self.subtree(&KeyPath::parse(raw, delimiter))
    }

    /// Every leaf key path, rendered with `delimiter`, in sorted order.
    pub fn keys(&self, delimiter: &str) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.root, &KeyPath::root(), delimiter, &mut keys);
        keys.sort();
        keys
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.root.as_object().is_none_or(Map::is_empty)
    }

    /// The root mapping.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Consume the tree, returning the root mapping.
    pub fn into_value(self) -> Value {
        self.root
    }
}

fn insert_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        merge_values(node, value);
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(head.clone()).or_insert(Value::Null);
        insert_at(child, rest, value);
    }
}

fn collect_keys(node: &Value, prefix: &KeyPath, delimiter: &str, out: &mut Vec<String>) {
    match node {
        Value::Object(map) if !map.is_empty() => {
            for (key, value) in map {
                collect_keys(value, &prefix.child(key), delimiter, out);
            }
        }
        _ if !prefix.is_root() => out.push(prefix.join(delimiter)),
        _ => {}
    }
}

/// Human-readable kind of a value, for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parse_lowercases_and_drops_empty_segments() {
        let path = KeyPath::parse("Server..HTTP.Port.", ".");
        assert_eq!(path.segments(), ["server", "http", "port"]);
        assert_eq!(path, KeyPath::from_segments(["server", "http", "port"]));
    }

    #[test]
    fn parse_with_custom_delimiter() {
        let path = KeyPath::parse("a::b", "::");
        assert_eq!(path.join("/"), "a/b");
        assert!(KeyPath::parse("", ".").is_root());
    }

    #[test]
    fn set_creates_intermediate_mappings() {
        let mut tree = Tree::new();
        tree.set(&KeyPath::parse("child.data", "."), json!("v"));
        assert_eq!(tree.as_value(), &json!({"child": {"data": "v"}}));
    }

    #[test]
    fn set_merges_mappings_and_replaces_scalars() {
        let mut tree = Tree::new();
        tree.set(&KeyPath::parse("server", "."), json!({"host": "a", "port": 1}));
        tree.set(&KeyPath::parse("server", "."), json!({"port": 2}));
        tree.set(&KeyPath::parse("server.host", "."), json!(["x"]));
        assert_eq!(
            tree.as_value(),
            &json!({"server": {"host": ["x"], "port": 2}})
        );
    }

    #[test]
    fn set_through_scalar_replaces_it() {
        let mut tree = Tree::new();
        tree.set(&KeyPath::parse("child", "."), json!("flat"));
        tree.set(&KeyPath::parse("child.data", "."), json!(1));
        assert_eq!(tree.as_value(), &json!({"child": {"data": 1}}));
    }

    #[test]
    fn root_scalar_write_is_ignored() {
        let mut tree = Tree::new();
        tree.set(&KeyPath::root(), json!("value"));
        assert!(tree.is_empty());
        tree.set(&KeyPath::root(), json!({"a": 1}));
        assert_eq!(tree.get("a", "."), Some(&json!(1)));
    }

    #[test]
    fn subtree_distinguishes_empty_from_missing() {
        let mut tree = Tree::new();
        tree.set(&KeyPath::parse("empty", "."), json!({}));
        tree.set(&KeyPath::parse("leaf", "."), json!(3));
        assert_eq!(tree.get("empty", "."), Some(&json!({})));
        assert_eq!(tree.get("missing", "."), None);
        assert_eq!(tree.get("leaf.below", "."), None);
        assert_eq!(tree.subtree(&KeyPath::root()), Some(tree.as_value()));
    }

    #[test]
    fn keys_lists_leaves() {
        let mut tree = Tree::new();
        tree.set(&KeyPath::parse("b.c", "."), json!(1));
        tree.set(&KeyPath::parse("a", "."), json!([1, 2]));
        tree.set(&KeyPath::parse("d", "."), json!({}));
        assert_eq!(tree.keys("/"), vec!["a", "b/c", "d"]);
    }
}
