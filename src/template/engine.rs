//! # Tree Substitution Engine
//!
//! Walks a resource tree in place, resolving placeholders in string scalars
//! against the resource's secret map and piping resolved values through any
//! modifier chains. The walk always completes; failures are collected as
//! [`ReplacementError`] values returned out of each recursive call and merged
//! by the caller.
//!
//! Substitution is type-preserving: a field whose entire (trimmed) value is
//! one placeholder takes the resolved value's own type, so `"<replicas>"`
//! backed by the integer `3` becomes the integer `3`. A placeholder embedded
//! in a larger string always splices in as text.

use tracing::{debug, trace};

use super::error::{ReplacementError, ReplacementErrorKind};
use super::modifiers;
use super::parser::{self, PlaceholderMatch};
use super::value::{Mapping, SecretMap, TreeValue};

/// One substitution pass over a resource tree.
#[derive(Debug)]
pub struct Substitution<'a> {
    secrets: &'a SecretMap,
    remove_missing: bool,
}

/// Outcome of processing one string scalar.
enum FieldAction {
    Keep,
    Replace(TreeValue),
    Delete,
}

impl<'a> Substitution<'a> {
    pub fn new(secrets: &'a SecretMap, remove_missing: bool) -> Self {
        Self { secrets, remove_missing }
    }

    /// Substitutes placeholders throughout `tree`, mutating it in place.
    ///
    /// Returns every field-level failure encountered; an empty vector means
    /// the pass fully succeeded. A non-empty result leaves the tree in
    /// whatever partially-substituted state the walk produced; rollback is
    /// the caller's decision.
    pub fn run(&self, tree: &mut TreeValue) -> Vec<ReplacementError> {
        let errors = match tree {
            TreeValue::Map(map) => self.walk_map(map, ""),
            _ => Vec::new(),
        };
        debug!(errors = errors.len(), "substitution pass finished");
        errors
    }

    fn walk_map(&self, map: &mut Mapping, path: &str) -> Vec<ReplacementError> {
        let mut errors = Vec::new();
        let mut doomed: Vec<String> = Vec::new();

        for (key, value) in map.iter_mut() {
            let field_path = join_path(path, key);
            match value {
                TreeValue::Map(child) => {
                    errors.extend(self.walk_map(child, &field_path));
                }
                TreeValue::Sequence(items) => {
                    errors.extend(self.walk_sequence(items, &field_path));
                }
                TreeValue::Text(text) => {
                    let (action, field_errors) = self.process_scalar(text, &field_path);
                    errors.extend(field_errors);
                    match action {
                        FieldAction::Keep => {}
                        FieldAction::Replace(new_value) => *value = new_value,
                        FieldAction::Delete => doomed.push(key.clone()),
                    }
                }
                _ => {}
            }
        }

        for key in doomed {
            trace!(field = %join_path(path, &key), "removing field with unresolved placeholder");
            map.remove(&key);
        }

        errors
    }

    /// Only map-shaped sequence elements are walkable; scalar elements are
    /// left untouched, mirroring the list-of-objects shape of real manifests.
    fn walk_sequence(&self, items: &mut [TreeValue], path: &str) -> Vec<ReplacementError> {
        let mut errors = Vec::new();
        for (index, item) in items.iter_mut().enumerate() {
            if let TreeValue::Map(child) = item {
                errors.extend(self.walk_map(child, &format!("{}[{}]", path, index)));
            }
        }
        errors
    }

    fn process_scalar(&self, text: &str, path: &str) -> (FieldAction, Vec<ReplacementError>) {
        let matches = match parser::parse(text) {
            Ok(matches) => matches,
            Err(err) => return (FieldAction::Keep, vec![ReplacementError::parse(path, err)]),
        };
        if matches.is_empty() {
            return (FieldAction::Keep, Vec::new());
        }

        // Resolve every placeholder before touching the field: a string is
        // substituted fully or not at all.
        let mut errors = Vec::new();
        let mut delete = false;
        let mut resolved: Vec<TreeValue> = Vec::with_capacity(matches.len());

        for m in &matches {
            match self.resolve(m, path) {
                Resolution::Value(v) => resolved.push(v),
                Resolution::Missing => delete = true,
                Resolution::Error(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return (FieldAction::Keep, errors);
        }
        if delete {
            return (FieldAction::Delete, Vec::new());
        }

        // Typed whole-value substitution.
        if matches.len() == 1 && matches[0].whole_value && !matches!(resolved[0], TreeValue::Text(_))
        {
            return (FieldAction::Replace(resolved.remove(0)), Vec::new());
        }

        // String splice at each match position.
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (m, value) in matches.iter().zip(&resolved) {
            out.push_str(&text[cursor..m.start]);
            match value.render_embedded() {
                Ok(s) => out.push_str(&s),
                Err(e) => {
                    errors.push(ReplacementError {
                        path: path.to_string(),
                        kind: ReplacementErrorKind::Modifier(
                            super::error::ModifierError::failed("render", e.to_string()),
                        ),
                    });
                    return (FieldAction::Keep, errors);
                }
            }
            cursor = m.end;
        }
        out.push_str(&text[cursor..]);

        (FieldAction::Replace(TreeValue::Text(out)), Vec::new())
    }

    fn resolve(&self, m: &PlaceholderMatch, path: &str) -> Resolution {
        let value = match self.secrets.get(&m.key) {
            Some(value) => value.clone(),
            None if self.remove_missing => return Resolution::Missing,
            None => return Resolution::Error(ReplacementError::unresolved(path, &m.key)),
        };

        if m.modifiers.is_empty() {
            return Resolution::Value(value);
        }

        match modifiers::apply_chain(&m.modifiers, value) {
            Ok(transformed) => Resolution::Value(transformed),
            Err(err) => Resolution::Error(ReplacementError::modifier(path, err)),
        }
    }
}

enum Resolution {
    Value(TreeValue),
    Missing,
    Error(ReplacementError),
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}
