//! Nested template trees and `{n}` placeholder substitution.
//!
//! A provider describes its metadata (`info`) and markup (`render`) as a tree
//! of ordered maps whose leaves are scalars. String leaves may contain
//! positional placeholders such as `{1}` that refer to capture groups of the
//! URL match.
//!
//! # Example
//!
//! ```rust
//! use media_embed::matcher::Captures;
//! use media_embed::template::{substitute, TemplateMap, TemplateNode};
//!
//! let mut iframe = TemplateMap::new();
//! iframe.insert("src".into(), TemplateNode::from("https://youtube.com/embed/{1}"));
//! let mut render = TemplateMap::new();
//! render.insert("iframe".into(), TemplateNode::Node(iframe));
//!
//! let out = substitute(&render, &Captures::from(vec!["abc123".to_string()]));
//! let src = out["iframe"].get("src").and_then(TemplateNode::as_str);
//! assert_eq!(src, Some("https://youtube.com/embed/abc123"));
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::matcher::Captures;

/// Insertion-ordered map of template nodes.
pub type TemplateMap = IndexMap<String, TemplateNode>;

/// A single template value or caller-supplied attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Numeric view of the value. Numeric strings such as `"640"` count.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a command-line style value: bool, integer, float, else string.
    pub fn parse_loose(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            return Self::Bool(b);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::Float(f),
            _ => Self::Str(raw.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A node of a provider template: either a scalar leaf or a nested map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateNode {
    Leaf(Scalar),
    Node(TemplateMap),
}

impl TemplateNode {
    pub fn as_map(&self) -> Option<&TemplateMap> {
        match self {
            Self::Node(map) => Some(map),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut TemplateMap> {
        match self {
            Self::Node(map) => Some(map),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Leaf(value) => Some(value),
            Self::Node(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Child lookup; `None` for leaves and missing keys.
    pub fn get(&self, key: &str) -> Option<&TemplateNode> {
        self.as_map().and_then(|map| map.get(key))
    }
}

macro_rules! leaf_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for TemplateNode {
                fn from(value: $ty) -> Self {
                    Self::Leaf(Scalar::from(value))
                }
            }
        )*
    };
}

leaf_from!(&str, String, bool, i64, i32, u32, f64);

impl From<Scalar> for TemplateNode {
    fn from(value: Scalar) -> Self {
        Self::Leaf(value)
    }
}

/// Replace `{i}` placeholders in every string leaf with capture group `i`.
///
/// Returns a fresh tree of the same shape; `tree` is left untouched. Keys and
/// non-string leaves are copied as-is.
pub fn substitute(tree: &TemplateMap, captures: &Captures) -> TemplateMap {
    tree.iter()
        .map(|(key, node)| (key.clone(), substitute_node(node, captures)))
        .collect()
}

fn substitute_node(node: &TemplateNode, captures: &Captures) -> TemplateNode {
    match node {
        TemplateNode::Node(map) => TemplateNode::Node(substitute(map, captures)),
        TemplateNode::Leaf(Scalar::Str(text)) => {
            TemplateNode::Leaf(Scalar::Str(substitute_str(text, captures)))
        }
        TemplateNode::Leaf(other) => TemplateNode::Leaf(other.clone()),
    }
}

fn substitute_str(text: &str, captures: &Captures) -> String {
    if !text.contains('{') {
        return text.to_string();
    }
    let mut out = text.to_string();
    for (index, value) in captures.iter() {
        let placeholder = format!("{{{index}}}");
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captures(values: &[&str]) -> Captures {
        Captures::from(values.iter().map(ToString::to_string).collect::<Vec<_>>())
    }

    fn leaf(s: &str) -> TemplateNode {
        TemplateNode::from(s)
    }

    #[test]
    fn replaces_every_occurrence_of_each_index() {
        let mut tree = TemplateMap::new();
        tree.insert("a".into(), leaf("{1}/{2}/{1}"));
        let out = substitute(&tree, &captures(&["x", "y"]));
        assert_eq!(out["a"].as_str(), Some("x/y/x"));
    }

    #[test]
    fn recurses_into_nested_maps() {
        let mut inner = TemplateMap::new();
        inner.insert("src".into(), leaf("//player/{1}"));
        let mut mid = TemplateMap::new();
        mid.insert("embed".into(), TemplateNode::Node(inner));
        let mut tree = TemplateMap::new();
        tree.insert("object".into(), TemplateNode::Node(mid));

        let out = substitute(&tree, &captures(&["42"]));
        let src = out["object"].get("embed").and_then(|e| e.get("src"));
        assert_eq!(src.and_then(TemplateNode::as_str), Some("//player/42"));
    }

    #[test]
    fn leaves_out_of_range_placeholders_alone() {
        let mut tree = TemplateMap::new();
        tree.insert("a".into(), leaf("{1}-{2}"));
        let out = substitute(&tree, &captures(&["only"]));
        assert_eq!(out["a"].as_str(), Some("only-{2}"));
    }

    #[test]
    fn empty_captures_pass_through() {
        let mut tree = TemplateMap::new();
        tree.insert("a".into(), leaf("{1}"));
        let out = substitute(&tree, &Captures::default());
        assert_eq!(out, tree);
    }

    #[test]
    fn double_digit_indices_are_not_confused_with_single() {
        let values: Vec<String> = (1..=10).map(|i| format!("c{i}")).collect();
        let mut tree = TemplateMap::new();
        tree.insert("a".into(), leaf("{1}{10}"));
        let out = substitute(&tree, &Captures::from(values));
        assert_eq!(out["a"].as_str(), Some("c1c10"));
    }

    #[test]
    fn non_string_leaves_and_keys_are_copied() {
        let mut tree = TemplateMap::new();
        tree.insert("{1}".into(), TemplateNode::from(1.5));
        tree.insert("flag".into(), TemplateNode::from(true));
        let out = substitute(&tree, &captures(&["x"]));
        assert_eq!(out["{1}"], TemplateNode::from(1.5));
        assert_eq!(out["flag"], TemplateNode::from(true));
    }

    #[test]
    fn input_tree_is_not_mutated() {
        let mut tree = TemplateMap::new();
        tree.insert("a".into(), leaf("{1}"));
        let before = tree.clone();
        let _ = substitute(&tree, &captures(&["x"]));
        assert_eq!(tree, before);
    }

    #[test]
    fn scalar_display_forms() {
        assert_eq!(Scalar::from(640).to_string(), "640");
        assert_eq!(Scalar::from(400.0).to_string(), "400");
        assert_eq!(Scalar::from(true).to_string(), "true");
        assert_eq!(Scalar::from("x").to_string(), "x");
    }

    #[test]
    fn parse_loose_prefers_bool_then_int_then_float() {
        assert_eq!(Scalar::parse_loose("true"), Scalar::Bool(true));
        assert_eq!(Scalar::parse_loose("640"), Scalar::Int(640));
        assert_eq!(Scalar::parse_loose("1.5"), Scalar::Float(1.5));
        assert_eq!(Scalar::parse_loose("auto"), Scalar::Str("auto".into()));
    }

    #[test]
    fn numeric_strings_expose_f64() {
        assert_eq!(Scalar::from("640").as_f64(), Some(640.0));
        assert_eq!(Scalar::from("wide").as_f64(), None);
        assert_eq!(Scalar::from(false).as_f64(), None);
    }

    #[test]
    fn deserializes_nested_toml() {
        let tree: TemplateMap = toml::from_str(
            r#"
sizeRatio = 1.5
[iframe]
src = "x/{1}"
width = 640
allowfullscreen = true
"#,
        )
        .unwrap();
        assert_eq!(tree["sizeRatio"], TemplateNode::from(1.5));
        let iframe = tree["iframe"].as_map().unwrap();
        let keys: Vec<&str> = iframe.keys().map(String::as_str).collect();
        assert_eq!(keys, ["src", "width", "allowfullscreen"]);
        assert_eq!(iframe["width"], TemplateNode::from(640));
    }
}
