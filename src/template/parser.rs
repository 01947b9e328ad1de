//! Placeholder grammar.
//!
//! A placeholder is a `<...>` span inside a string scalar. The opening and
//! closing brackets must sit on the same line, and matching is non-greedy:
//! the first `>` after a `<` closes the span. The span content is a secret
//! key, optionally followed by a pipe-separated chain of modifier
//! invocations:
//!
//! ```text
//! <db-password>
//! <config | jsonParse | jsonPath({.host})>
//! <blob | base64decode>
//! ```
//!
//! A literal pipe inside a key or parameter is written `\|`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ParseError;

/// Non-greedy placeholder span. `.` does not cross newlines, which keeps
/// matching per-line as required.
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(.*?)>").expect("placeholder pattern is valid"));

/// `name` or `name(p1, p2)` modifier spec.
static MODIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?:\((.*)\))?$").expect("modifier pattern is valid")
});

/// A modifier name plus its string parameters, applied left-to-right.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierInvocation {
    pub name: String,
    pub params: Vec<String>,
}

/// One placeholder found in a string scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderMatch {
    /// Byte offset of the opening `<` in the scanned string.
    pub start: usize,
    /// Byte offset one past the closing `>`.
    pub end: usize,
    /// The secret key named by the placeholder.
    pub key: String,
    /// Modifier chain, possibly empty.
    pub modifiers: Vec<ModifierInvocation>,
    /// True when this is the only placeholder and the trimmed value is
    /// exactly the placeholder span; enables typed substitution.
    pub whole_value: bool,
}

/// Returns true if the string contains at least one placeholder span.
/// Used by the policy pre-scan, which only needs presence, not structure.
pub fn contains_placeholder(value: &str) -> bool {
    PLACEHOLDER_RE.is_match(value)
}

/// Extracts all placeholders from a string scalar.
///
/// A string with zero matches yields an empty vector. Malformed content
/// inside a matched span (empty key, bad modifier spec) fails the whole
/// field with a [`ParseError`].
pub fn parse(value: &str) -> Result<Vec<PlaceholderMatch>, ParseError> {
    let mut matches = Vec::new();

    for caps in PLACEHOLDER_RE.captures_iter(value) {
        let span = caps.get(0).expect("group 0 always present");
        let content = caps.get(1).expect("group 1 always present").as_str();

        let mut segments = split_unescaped_pipe(content);
        let key = segments.remove(0).trim().to_string();
        if key.is_empty() {
            return Err(ParseError(format!("empty secret key in '{}'", span.as_str())));
        }

        let mut modifiers = Vec::with_capacity(segments.len());
        for segment in segments {
            modifiers.push(parse_modifier(segment.trim())?);
        }

        matches.push(PlaceholderMatch {
            start: span.start(),
            end: span.end(),
            key,
            modifiers,
            whole_value: false,
        });
    }

    // Whole-value only applies to a lone placeholder whose span is the
    // entire value after trimming surrounding whitespace.
    if matches.len() == 1 {
        let m = &matches[0];
        let whole = value.trim() == &value[m.start..m.end];
        matches[0].whole_value = whole;
    }

    Ok(matches)
}

/// Splits placeholder content on `|`, honoring the `\|` escape. Escapes are
/// resolved in the returned segments.
fn split_unescaped_pipe(content: &str) -> Vec<String> {
    let mut segments = vec![String::new()];
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                chars.next();
                segments.last_mut().expect("never empty").push('|');
            }
            '|' => segments.push(String::new()),
            _ => segments.last_mut().expect("never empty").push(c),
        }
    }

    segments
}

fn parse_modifier(spec: &str) -> Result<ModifierInvocation, ParseError> {
    let caps = MODIFIER_RE
        .captures(spec)
        .ok_or_else(|| ParseError(format!("malformed modifier spec '{}'", spec)))?;

    let name = caps.get(1).expect("name group").as_str().to_string();
    let params = match caps.get(2) {
        None => Vec::new(),
        Some(raw) if raw.as_str().trim().is_empty() => Vec::new(),
        Some(raw) => raw.as_str().split(',').map(|p| p.trim().to_string()).collect(),
    };

    Ok(ModifierInvocation { name, params })
}
