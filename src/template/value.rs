//! The manifest data model.
//!
//! A parsed manifest document is held as a [`TreeValue`], a tagged sum type
//! over the shapes YAML/JSON scalars and containers can take. The
//! substitution engine pattern-matches over the variants instead of
//! inspecting runtime types, and non-string scalars keep their parsed type
//! until a substitution or modifier explicitly coerces them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A mapping node inside a [`TreeValue`]. Kubernetes manifests only use
/// string keys, and key order is irrelevant to substitution.
pub type Mapping = BTreeMap<String, TreeValue>;

/// The key/value set fetched once per resource from a backend. Read many
/// times during one substitution pass, never mutated.
pub type SecretMap = BTreeMap<String, TreeValue>;

/// One node of a manifest tree: a container or a typed scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeValue {
    /// YAML/JSON null.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer or float scalar, kept in its parsed representation.
    Number(serde_yaml::Number),
    /// String scalar; the only variant placeholders can appear in.
    Text(String),
    /// Ordered sequence of nodes.
    Sequence(Vec<TreeValue>),
    /// String-keyed mapping of nodes.
    Map(Mapping),
}

impl TreeValue {
    /// Returns the string content if this node is a text scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TreeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the mapping if this node is a map.
    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            TreeValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// True for `Map` and `Sequence` nodes.
    pub fn is_container(&self) -> bool {
        matches!(self, TreeValue::Map(_) | TreeValue::Sequence(_))
    }

    /// Renders a scalar for splicing into a larger string. Containers are
    /// rendered as compact JSON so an embedded placeholder backed by a
    /// structured secret still produces a single-line string.
    pub fn render_embedded(&self) -> Result<String, serde_json::Error> {
        match self {
            TreeValue::Null => Ok("null".to_string()),
            TreeValue::Bool(b) => Ok(b.to_string()),
            TreeValue::Number(n) => Ok(n.to_string()),
            TreeValue::Text(s) => Ok(s.clone()),
            TreeValue::Sequence(_) | TreeValue::Map(_) => serde_json::to_string(self),
        }
    }
}

impl fmt::Display for TreeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render_embedded() {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str("<unrenderable>"),
        }
    }
}

impl From<serde_json::Value> for TreeValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => TreeValue::Null,
            serde_json::Value::Bool(b) => TreeValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    TreeValue::Number(i.into())
                } else if let Some(u) = n.as_u64() {
                    TreeValue::Number(u.into())
                } else {
                    // JSON numbers are always representable as f64
                    TreeValue::Number(n.as_f64().unwrap_or(f64::NAN).into())
                }
            }
            serde_json::Value::String(s) => TreeValue::Text(s),
            serde_json::Value::Array(items) => {
                TreeValue::Sequence(items.into_iter().map(TreeValue::from).collect())
            }
            serde_json::Value::Object(entries) => {
                TreeValue::Map(entries.into_iter().map(|(k, v)| (k, TreeValue::from(v))).collect())
            }
        }
    }
}

impl From<&str> for TreeValue {
    fn from(s: &str) -> Self {
        TreeValue::Text(s.to_string())
    }
}

impl From<String> for TreeValue {
    fn from(s: String) -> Self {
        TreeValue::Text(s)
    }
}

impl From<i64> for TreeValue {
    fn from(n: i64) -> Self {
        TreeValue::Number(n.into())
    }
}

impl From<bool> for TreeValue {
    fn from(b: bool) -> Self {
        TreeValue::Bool(b)
    }
}
