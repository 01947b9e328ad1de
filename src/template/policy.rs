//! # Resource Policy
//!
//! Decides, per resource, whether substitution runs at all and with which
//! parameters, based on the resource's `metadata.annotations`. Recognized
//! annotation keys are implementation-defined constants shared between the
//! engine and its callers.

use std::collections::BTreeMap;

use crate::errors::{Result, SecretweaveError};

use super::parser;
use super::value::TreeValue;

/// Overrides the kind-default secret path for a resource.
pub const ANNOTATION_PATH: &str = "secretweave.io/path";
/// Skips the resource entirely; no backend call is made.
pub const ANNOTATION_IGNORE: &str = "secretweave.io/ignore";
/// Selects versioned (`"2"`) or unversioned (`"1"`) KV semantics.
pub const ANNOTATION_KV_VERSION: &str = "secretweave.io/kv-version";
/// Pins a specific secret revision; forwarded verbatim to the backend.
pub const ANNOTATION_SECRET_VERSION: &str = "secretweave.io/secret-version";
/// Deletes fields whose placeholder cannot be resolved instead of erroring.
pub const ANNOTATION_REMOVE_MISSING: &str = "secretweave.io/remove-missing";

/// Kind segment used for documents that carry no `kind` field.
const FALLBACK_KIND: &str = "resource";

/// KV engine flavor forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KvVersion {
    V1,
    #[default]
    V2,
}

impl KvVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "1",
            Self::V2 => "2",
        }
    }
}

/// What the policy decided for one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    /// True when the resource contains at least one placeholder and is not
    /// annotated as ignored. The engine must not call a backend for a
    /// non-replaceable resource.
    pub replaceable: bool,
    /// Secret path to fetch, annotation override or kind default.
    pub secret_path: String,
    pub kv_version: KvVersion,
    /// Revision pin, passed through verbatim.
    pub secret_version: Option<String>,
    pub remove_missing: bool,
}

/// Evaluates annotations and placeholder presence for resources.
#[derive(Debug, Clone)]
pub struct ResourcePolicy {
    default_path_prefix: String,
}

impl ResourcePolicy {
    pub fn new(default_path_prefix: impl Into<String>) -> Self {
        Self { default_path_prefix: default_path_prefix.into() }
    }

    /// Inspects a resource tree and produces the substitution parameters.
    ///
    /// Fails only on unintelligible annotations (e.g. a KV version that is
    /// neither `"1"` nor `"2"`); everything else degrades to defaults.
    pub fn evaluate(&self, tree: &TreeValue) -> Result<PolicyDecision> {
        let annotations = annotations(tree);

        let ignored = flag(&annotations, ANNOTATION_IGNORE);
        let replaceable = !ignored && scan_for_placeholders(tree);

        let secret_path = match annotations.get(ANNOTATION_PATH) {
            Some(path) if !path.is_empty() => path.clone(),
            _ => self.default_path(kind(tree)),
        };

        let kv_version = match annotations.get(ANNOTATION_KV_VERSION).map(String::as_str) {
            None => KvVersion::default(),
            Some("1") => KvVersion::V1,
            Some("2") => KvVersion::V2,
            Some(other) => {
                return Err(SecretweaveError::policy(format!(
                    "annotation {} must be \"1\" or \"2\", got \"{}\"",
                    ANNOTATION_KV_VERSION, other
                )))
            }
        };

        Ok(PolicyDecision {
            replaceable,
            secret_path,
            kv_version,
            secret_version: annotations.get(ANNOTATION_SECRET_VERSION).cloned(),
            remove_missing: flag(&annotations, ANNOTATION_REMOVE_MISSING),
        })
    }

    fn default_path(&self, kind: Option<&str>) -> String {
        format!(
            "{}/{}",
            self.default_path_prefix,
            kind.unwrap_or(FALLBACK_KIND).to_lowercase()
        )
    }
}

/// Reads the string-valued entries of `metadata.annotations`.
pub fn annotations(tree: &TreeValue) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let annotations = tree
        .as_map()
        .and_then(|m| m.get("metadata"))
        .and_then(TreeValue::as_map)
        .and_then(|m| m.get("annotations"))
        .and_then(TreeValue::as_map);

    if let Some(entries) = annotations {
        for (key, value) in entries {
            if let Some(text) = value.as_str() {
                out.insert(key.clone(), text.to_string());
            }
        }
    }
    out
}

/// The resource's `kind` field, if present.
pub fn kind(tree: &TreeValue) -> Option<&str> {
    tree.as_map().and_then(|m| m.get("kind")).and_then(TreeValue::as_str)
}

/// Pre-scan: does any string scalar anywhere in the tree contain a
/// placeholder? Runs before any backend call so resources without
/// placeholders never trigger a fetch.
pub fn scan_for_placeholders(tree: &TreeValue) -> bool {
    match tree {
        TreeValue::Text(text) => parser::contains_placeholder(text),
        TreeValue::Sequence(items) => items.iter().any(scan_for_placeholders),
        TreeValue::Map(map) => map.values().any(scan_for_placeholders),
        _ => false,
    }
}

fn flag(annotations: &BTreeMap<String, String>, key: &str) -> bool {
    annotations.get(key).map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false)
}
