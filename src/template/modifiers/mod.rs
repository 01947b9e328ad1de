//! # Modifier Registry
//!
//! Maps modifier names to pure transformation functions applied to resolved
//! secret values. Each entry declares its parameter arity; the registry
//! checks arity before dispatch and each function checks its accepted input
//! shape, so a bad invocation is always a reported [`ModifierError`], never
//! a panic.
//!
//! Chains are applied strictly left-to-right with no reordering; the first
//! failing modifier aborts the chain and its error is the one surfaced for
//! the field.

mod encoding;
mod jsonpath;
mod structured;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::error::ModifierError;
use super::parser::ModifierInvocation;
use super::value::TreeValue;

type ModifierFn = fn(&[String], TreeValue) -> Result<TreeValue, ModifierError>;

struct Modifier {
    name: &'static str,
    arity: usize,
    func: ModifierFn,
}

static REGISTRY: Lazy<HashMap<&'static str, Modifier>> = Lazy::new(|| {
    let builtins = [
        Modifier { name: "base64encode", arity: 0, func: encoding::base64encode },
        Modifier { name: "base64decode", arity: 0, func: encoding::base64decode },
        Modifier { name: "sha256sum", arity: 0, func: encoding::sha256sum },
        Modifier { name: "jsonParse", arity: 0, func: structured::json_parse },
        Modifier { name: "yamlParse", arity: 0, func: structured::yaml_parse },
        Modifier { name: "jsonPath", arity: 1, func: structured::json_path },
        Modifier { name: "indent", arity: 1, func: structured::indent },
    ];
    builtins.into_iter().map(|m| (m.name, m)).collect()
});

/// Applies a single named modifier to a value.
pub fn apply(name: &str, params: &[String], input: TreeValue) -> Result<TreeValue, ModifierError> {
    let modifier =
        REGISTRY.get(name).ok_or_else(|| ModifierError::Unknown(name.to_string()))?;

    if params.len() != modifier.arity {
        return Err(ModifierError::Arity {
            name: modifier.name,
            expected: modifier.arity,
            got: params.len(),
        });
    }

    (modifier.func)(params, input)
}

/// Pipes a value through a modifier chain, left-to-right.
pub fn apply_chain(
    chain: &[ModifierInvocation],
    input: TreeValue,
) -> Result<TreeValue, ModifierError> {
    let mut value = input;
    for invocation in chain {
        value = apply(&invocation.name, &invocation.params, value)?;
    }
    Ok(value)
}

/// Names of all registered modifiers, for diagnostics.
pub fn registered_names() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(name: &str, params: &[&str]) -> ModifierInvocation {
        ModifierInvocation {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_unknown_modifier() {
        let err = apply("rot13", &[], TreeValue::from("x")).unwrap_err();
        assert_eq!(err, ModifierError::Unknown("rot13".to_string()));
    }

    #[test]
    fn test_arity_checked_before_dispatch() {
        let err = apply("base64encode", &["extra".to_string()], TreeValue::from("x")).unwrap_err();
        assert!(matches!(err, ModifierError::Arity { name: "base64encode", expected: 0, got: 1 }));

        let err = apply("indent", &[], TreeValue::from("x")).unwrap_err();
        assert!(matches!(err, ModifierError::Arity { name: "indent", expected: 1, got: 0 }));
    }

    #[test]
    fn test_chain_applies_left_to_right() {
        // jsonParse then jsonPath: selects from the parsed structure.
        let chain = [invocation("jsonParse", &[]), invocation("jsonPath", &["{.a}"])];
        let out = apply_chain(&chain, TreeValue::from(r#"{"a":"z"}"#)).unwrap();
        assert_eq!(out, TreeValue::from("z"));
    }

    #[test]
    fn test_chain_order_matters() {
        // Reversed: jsonPath runs first. Its auto-parse accepts the JSON
        // string, selects "z", and the trailing jsonParse then fails on the
        // bare word. Opposite outcome of the correct ordering.
        let chain = [invocation("jsonPath", &["{.a}"]), invocation("jsonParse", &[])];
        let err = apply_chain(&chain, TreeValue::from(r#"{"a":"z"}"#)).unwrap_err();
        assert!(matches!(err, ModifierError::Failed { name: "jsonParse", .. }));
    }

    #[test]
    fn test_chain_aborts_on_first_failure() {
        let chain = [invocation("jsonParse", &[]), invocation("base64encode", &[])];
        let err = apply_chain(&chain, TreeValue::from("not json")).unwrap_err();
        // jsonParse failed, so base64encode never saw the value.
        assert!(matches!(err, ModifierError::Failed { name: "jsonParse", .. }));
    }

    #[test]
    fn test_registered_names() {
        let names = registered_names();
        assert!(names.contains(&"base64encode"));
        assert!(names.contains(&"jsonPath"));
        assert_eq!(names.len(), 7);
    }
}
