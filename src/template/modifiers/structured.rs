//! Structural modifiers: parsing, path selection, and re-indentation.

use super::super::error::ModifierError;
use super::super::value::TreeValue;
use super::jsonpath;

fn expect_text(name: &'static str, input: TreeValue) -> Result<String, ModifierError> {
    match input {
        TreeValue::Text(s) => Ok(s),
        _ => Err(ModifierError::InputShape { name, expected: "string" }),
    }
}

pub(super) fn json_parse(_params: &[String], input: TreeValue) -> Result<TreeValue, ModifierError> {
    let text = expect_text("jsonParse", input)?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| ModifierError::failed("jsonParse", e.to_string()))?;
    Ok(TreeValue::from(value))
}

pub(super) fn yaml_parse(_params: &[String], input: TreeValue) -> Result<TreeValue, ModifierError> {
    let text = expect_text("yamlParse", input)?;
    serde_yaml::from_str(&text).map_err(|e| ModifierError::failed("yamlParse", e.to_string()))
}

/// Evaluates a JSONPath-style expression and returns the match as a string.
///
/// A JSON-encoded string input is parsed first; structured input is used
/// directly. There is no YAML fallback for string input: chain `yamlParse`
/// explicitly when the value holds YAML.
pub(super) fn json_path(params: &[String], input: TreeValue) -> Result<TreeValue, ModifierError> {
    let root = match input {
        TreeValue::Text(s) => {
            let value: serde_json::Value = serde_json::from_str(&s)
                .map_err(|e| ModifierError::failed("jsonPath", e.to_string()))?;
            TreeValue::from(value)
        }
        other => other,
    };

    let matched =
        jsonpath::evaluate(&root, &params[0]).map_err(|e| ModifierError::failed("jsonPath", e))?;
    let rendered = matched
        .render_embedded()
        .map_err(|e| ModifierError::failed("jsonPath", e.to_string()))?;
    Ok(TreeValue::Text(rendered))
}

/// Re-indents every line after the first by `n` spaces, trimming incidental
/// whitespace per line. Single-line input is returned unchanged.
pub(super) fn indent(params: &[String], input: TreeValue) -> Result<TreeValue, ModifierError> {
    let n: usize = params[0]
        .parse()
        .map_err(|_| ModifierError::failed("indent", format!("'{}' is not an integer", params[0])))?;
    let text = expect_text("indent", input)?;

    let mut lines = text.lines();
    let first = match lines.next() {
        Some(line) => line,
        None => return Ok(TreeValue::Text(text)),
    };

    let prefix = " ".repeat(n);
    let mut out = first.to_string();
    for line in lines {
        out.push('\n');
        out.push_str(&prefix);
        out.push_str(line.trim());
    }
    Ok(TreeValue::Text(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::value::Mapping;

    #[test]
    fn test_json_parse() {
        let parsed = json_parse(&[], TreeValue::from(r#"{"a": 1}"#)).unwrap();
        let mut expected = Mapping::new();
        expected.insert("a".into(), TreeValue::from(1));
        assert_eq!(parsed, TreeValue::Map(expected));
    }

    #[test]
    fn test_json_parse_malformed_surfaces_cause() {
        let err = json_parse(&[], TreeValue::from("{not json")).unwrap_err();
        match err {
            ModifierError::Failed { name, message } => {
                assert_eq!(name, "jsonParse");
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_yaml_parse() {
        let parsed = yaml_parse(&[], TreeValue::from("a: 1\nb: two\n")).unwrap();
        let map = parsed.as_map().unwrap();
        assert_eq!(map["a"], TreeValue::from(1));
        assert_eq!(map["b"], TreeValue::from("two"));
    }

    #[test]
    fn test_json_path_on_structured_value() {
        let root: TreeValue = serde_yaml::from_str("a:\n  b: z\n").unwrap();
        let out = json_path(&["{.a.b}".to_string()], root).unwrap();
        assert_eq!(out, TreeValue::from("z"));
    }

    #[test]
    fn test_json_path_auto_parses_json_string() {
        let out = json_path(&["{.a}".to_string()], TreeValue::from(r#"{"a":"z"}"#)).unwrap();
        assert_eq!(out, TreeValue::from("z"));
    }

    #[test]
    fn test_json_path_no_yaml_fallback() {
        // YAML that is not JSON must not be auto-detected.
        let err = json_path(&["{.a}".to_string()], TreeValue::from("a: z")).unwrap_err();
        assert!(matches!(err, ModifierError::Failed { name: "jsonPath", .. }));
    }

    #[test]
    fn test_json_path_empty_results() {
        let root: TreeValue = serde_yaml::from_str("items:\n  - one\n").unwrap();
        let err = json_path(&["{.items[5]}".to_string()], root).unwrap_err();
        match err {
            ModifierError::Failed { message, .. } => assert_eq!(message, "empty results"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_indent_multiline() {
        let input = TreeValue::from("line1\n  line2\n\tline3");
        let out = indent(&["4".to_string()], input).unwrap();
        assert_eq!(out, TreeValue::from("line1\n    line2\n    line3"));
    }

    #[test]
    fn test_indent_single_line_unchanged() {
        let out = indent(&["8".to_string()], TreeValue::from("only")).unwrap();
        assert_eq!(out, TreeValue::from("only"));
    }

    #[test]
    fn test_indent_non_integer_param() {
        let err = indent(&["four".to_string()], TreeValue::from("a\nb")).unwrap_err();
        assert!(matches!(err, ModifierError::Failed { name: "indent", .. }));
    }
}
