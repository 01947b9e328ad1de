//! Minimal JSONPath-style navigation for the `jsonPath` modifier.
//!
//! Supports the bracketed dot form used in Kubernetes tooling:
//!
//! ```text
//! {.spec.host}
//! {.users[0].name}
//! {.matrix[1][2]}
//! ```
//!
//! The surrounding braces and a leading `$` are optional. Keys are strict: a
//! key missing from a map is an error, and an index past the end of a
//! sequence yields "empty results".

use super::super::value::TreeValue;

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Key(String),
    Index(usize),
}

/// Evaluates `expr` against `root`, returning the matched node.
pub fn evaluate<'a>(root: &'a TreeValue, expr: &str) -> Result<&'a TreeValue, String> {
    let steps = parse_expression(expr)?;

    let mut current = root;
    for step in &steps {
        current = match (step, current) {
            (Step::Key(k), TreeValue::Map(map)) => {
                map.get(k).ok_or_else(|| format!("unknown key '{}'", k))?
            }
            (Step::Key(k), _) => {
                return Err(format!("cannot select key '{}' from a non-map value", k))
            }
            (Step::Index(i), TreeValue::Sequence(items)) => {
                items.get(*i).ok_or_else(|| "empty results".to_string())?
            }
            (Step::Index(i), _) => {
                return Err(format!("cannot index [{}] into a non-sequence value", i))
            }
        };
    }

    Ok(current)
}

fn parse_expression(expr: &str) -> Result<Vec<Step>, String> {
    let mut body = expr.trim();
    if let Some(inner) = body.strip_prefix('{') {
        body = inner
            .strip_suffix('}')
            .ok_or_else(|| format!("unbalanced braces in expression '{}'", expr))?;
        body = body.trim();
    }
    body = body.strip_prefix('$').unwrap_or(body);

    let mut steps = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                let mut key = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '.' || next == '[' {
                        break;
                    }
                    key.push(next);
                    chars.next();
                }
                // A trailing or doubled dot selects nothing; `{.}` is the root.
                if !key.is_empty() {
                    steps.push(Step::Key(key));
                }
            }
            '[' => {
                let mut digits = String::new();
                for next in chars.by_ref() {
                    if next == ']' {
                        break;
                    }
                    digits.push(next);
                }
                let index: usize = digits
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid index '[{}]' in expression '{}'", digits, expr))?;
                steps.push(Step::Index(index));
            }
            other => {
                return Err(format!("unexpected '{}' in expression '{}'", other, expr));
            }
        }
    }

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeValue {
        serde_yaml::from_str(
            r#"
spec:
  host: db.internal
  ports:
    - 5432
    - 5433
users:
  - name: admin
  - name: reader
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_key_navigation() {
        let root = sample();
        let v = evaluate(&root, "{.spec.host}").unwrap();
        assert_eq!(v, &TreeValue::from("db.internal"));
    }

    #[test]
    fn test_index_navigation() {
        let root = sample();
        assert_eq!(evaluate(&root, "{.spec.ports[1]}").unwrap(), &TreeValue::from(5433));
        assert_eq!(evaluate(&root, "{.users[0].name}").unwrap(), &TreeValue::from("admin"));
    }

    #[test]
    fn test_optional_braces_and_dollar() {
        let root = sample();
        assert_eq!(evaluate(&root, ".spec.host").unwrap(), &TreeValue::from("db.internal"));
        assert_eq!(evaluate(&root, "{$.spec.host}").unwrap(), &TreeValue::from("db.internal"));
    }

    #[test]
    fn test_root_expression() {
        let root = sample();
        assert_eq!(evaluate(&root, "{.}").unwrap(), &root);
    }

    #[test]
    fn test_unknown_key_is_strict_error() {
        let root = sample();
        let err = evaluate(&root, "{.spec.missing}").unwrap_err();
        assert!(err.contains("unknown key 'missing'"));
    }

    #[test]
    fn test_out_of_range_index_is_empty_results() {
        let root = sample();
        let err = evaluate(&root, "{.spec.ports[9]}").unwrap_err();
        assert_eq!(err, "empty results");
    }

    #[test]
    fn test_key_on_scalar_fails() {
        let root = sample();
        let err = evaluate(&root, "{.spec.host.more}").unwrap_err();
        assert!(err.contains("non-map"));
    }

    #[test]
    fn test_syntax_errors() {
        let root = sample();
        assert!(evaluate(&root, "{.spec.host").is_err());
        assert!(evaluate(&root, "{.ports[x]}").is_err());
        assert!(evaluate(&root, "spec.host").is_err());
    }
}
