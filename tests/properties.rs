//! Property tests for the algebraic guarantees of the substitution core.

use proptest::prelude::*;

use secretweave::template::engine::Substitution;
use secretweave::template::{modifiers, SecretMap, TreeValue};

proptest! {
    /// Strings without placeholders are byte-for-byte untouched.
    #[test]
    fn substitute_is_identity_without_placeholders(value in "[^<>]*") {
        let mut tree = TreeValue::Map(
            [("field".to_string(), TreeValue::Text(value.clone()))].into_iter().collect(),
        );
        let expected = tree.clone();

        let errors = Substitution::new(&SecretMap::new(), false).run(&mut tree);
        prop_assert!(errors.is_empty());
        prop_assert_eq!(tree, expected);
    }

    /// base64decode inverts base64encode for all strings.
    #[test]
    fn base64_round_trip(value in ".*") {
        let encoded = modifiers::apply("base64encode", &[], TreeValue::Text(value.clone()))
            .expect("encoding never fails on strings");
        let decoded = modifiers::apply("base64decode", &[], encoded)
            .expect("decoding an encoded value never fails");
        prop_assert_eq!(decoded, TreeValue::Text(value));
    }

    /// A second substitution pass over an already-substituted tree is a
    /// no-op when the resolved values contain no placeholders themselves.
    #[test]
    fn substitution_is_idempotent(resolved in "[^<>]*") {
        let secrets: SecretMap =
            [("key".to_string(), TreeValue::Text(resolved))].into_iter().collect();
        let mut tree = TreeValue::Map(
            [
                ("whole".to_string(), TreeValue::from("<key>")),
                ("embedded".to_string(), TreeValue::from("prefix-<key>")),
            ]
            .into_iter()
            .collect(),
        );

        let substitution = Substitution::new(&secrets, false);
        prop_assert!(substitution.run(&mut tree).is_empty());
        let after_first = tree.clone();

        prop_assert!(substitution.run(&mut tree).is_empty());
        prop_assert_eq!(tree, after_first);
    }

    /// sha256sum is deterministic and always a 64-char lowercase hex digest.
    #[test]
    fn sha256_digest_shape(value in ".*") {
        let first = modifiers::apply("sha256sum", &[], TreeValue::Text(value.clone())).unwrap();
        let second = modifiers::apply("sha256sum", &[], TreeValue::Text(value)).unwrap();
        prop_assert_eq!(&first, &second);

        let digest = first.as_str().unwrap().to_string();
        prop_assert_eq!(digest.len(), 64);
        prop_assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
