//! Byte-level modifiers: base64 transcoding and digests.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use super::super::error::ModifierError;
use super::super::value::TreeValue;

fn expect_text(name: &'static str, input: TreeValue) -> Result<String, ModifierError> {
    match input {
        TreeValue::Text(s) => Ok(s),
        _ => Err(ModifierError::InputShape { name, expected: "string" }),
    }
}

pub(super) fn base64encode(_params: &[String], input: TreeValue) -> Result<TreeValue, ModifierError> {
    let text = expect_text("base64encode", input)?;
    Ok(TreeValue::Text(BASE64.encode(text)))
}

pub(super) fn base64decode(_params: &[String], input: TreeValue) -> Result<TreeValue, ModifierError> {
    let text = expect_text("base64decode", input)?;
    let bytes =
        BASE64.decode(text).map_err(|e| ModifierError::failed("base64decode", e.to_string()))?;
    let decoded = String::from_utf8(bytes)
        .map_err(|e| ModifierError::failed("base64decode", e.to_string()))?;
    Ok(TreeValue::Text(decoded))
}

pub(super) fn sha256sum(_params: &[String], input: TreeValue) -> Result<TreeValue, ModifierError> {
    let text = expect_text("sha256sum", input)?;
    let digest = Sha256::digest(text.as_bytes());
    Ok(TreeValue::Text(hex::encode(digest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_round_trip() {
        let encoded = base64encode(&[], TreeValue::from("mysecret")).unwrap();
        assert_eq!(encoded, TreeValue::from("bXlzZWNyZXQ="));

        let decoded = base64decode(&[], encoded).unwrap();
        assert_eq!(decoded, TreeValue::from("mysecret"));
    }

    #[test]
    fn test_base64decode_invalid_input() {
        let err = base64decode(&[], TreeValue::from("not base64!!")).unwrap_err();
        assert!(matches!(err, ModifierError::Failed { name: "base64decode", .. }));
    }

    #[test]
    fn test_sha256sum_known_digest() {
        let digest = sha256sum(&[], TreeValue::from("mysecret")).unwrap();
        assert_eq!(
            digest,
            TreeValue::from("652c7dc687d98c9889304ed2e408c74b611e86a40caa51c4b43f1dd5913c5cd0")
        );
    }

    #[test]
    fn test_non_string_input_rejected() {
        for f in [base64encode, base64decode, sha256sum] {
            let err = f(&[], TreeValue::from(42)).unwrap_err();
            assert!(matches!(err, ModifierError::InputShape { .. }));
        }
    }
}
