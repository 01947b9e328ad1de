//! # Resource Wrapper
//!
//! Binds one manifest document's tree to its policy decision, fetched secret
//! map, and accumulated substitution errors, and enforces the per-resource
//! lifecycle:
//!
//! ```text
//! Unscanned → Scanned{replaceable|skipped} → SecretsFetched
//!           → Substituted | Failed → Serialized
//! ```
//!
//! Skipped resources jump from `Scanned` straight to serialization with the
//! tree unchanged. `Failed` (any accumulated replacement error) is terminal:
//! the aggregate error is surfaced once and never auto-retried.

use tracing::{debug, info};

use crate::backends::{BackendAnnotations, SecretBackend};
use crate::errors::{Result, SecretweaveError};

use super::engine::Substitution;
use super::error::ReplacementError;
use super::policy::{self, PolicyDecision, ResourcePolicy};
use super::value::{SecretMap, TreeValue};

/// Lifecycle state of one resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState {
    Unscanned,
    Scanned { replaceable: bool },
    SecretsFetched,
    Substituted,
    Failed,
    Serialized,
}

/// One manifest document being processed as a unit.
#[derive(Debug)]
pub struct Resource {
    tree: TreeValue,
    state: ResourceState,
    decision: Option<PolicyDecision>,
    secrets: SecretMap,
    errors: Vec<ReplacementError>,
}

impl Resource {
    pub fn new(tree: TreeValue) -> Self {
        Self {
            tree,
            state: ResourceState::Unscanned,
            decision: None,
            secrets: SecretMap::new(),
            errors: Vec::new(),
        }
    }

    /// Parses one YAML document into a resource.
    pub fn from_yaml(doc: &str) -> Result<Self> {
        let tree: TreeValue = serde_yaml::from_str(doc)?;
        Ok(Self::new(tree))
    }

    /// `Kind/name` label for logs and aggregate errors.
    pub fn display_name(&self) -> String {
        let kind = policy::kind(&self.tree).unwrap_or("Unknown");
        let name = self
            .tree
            .as_map()
            .and_then(|m| m.get("metadata"))
            .and_then(TreeValue::as_map)
            .and_then(|m| m.get("name"))
            .and_then(TreeValue::as_str)
            .unwrap_or("unnamed");
        format!("{}/{}", kind, name)
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub fn tree(&self) -> &TreeValue {
        &self.tree
    }

    pub fn errors(&self) -> &[ReplacementError] {
        &self.errors
    }

    /// Evaluates policy. Returns whether the resource needs substitution.
    pub fn scan(&mut self, policy: &ResourcePolicy) -> Result<bool> {
        if self.state != ResourceState::Unscanned {
            return Err(SecretweaveError::state(format!(
                "scan called on {} in state {:?}",
                self.display_name(),
                self.state
            )));
        }

        let decision = policy.evaluate(&self.tree)?;
        let replaceable = decision.replaceable;
        debug!(
            resource = %self.display_name(),
            replaceable,
            path = %decision.secret_path,
            "scanned resource"
        );

        self.decision = Some(decision);
        self.state = ResourceState::Scanned { replaceable };
        Ok(replaceable)
    }

    /// Fetches the secret map for a replaceable resource.
    ///
    /// Must not be called for skipped resources; the whole point of the
    /// IGNORE annotation is to avoid the backend round-trip. A backend
    /// failure leaves the resource in `Scanned` and is fatal to it.
    pub async fn fetch_secrets(&mut self, backend: &dyn SecretBackend) -> Result<()> {
        if self.state != (ResourceState::Scanned { replaceable: true }) {
            return Err(SecretweaveError::state(format!(
                "fetch_secrets called on {} in state {:?}",
                self.display_name(),
                self.state
            )));
        }
        let decision = self.decision.as_ref().expect("scanned resources have a decision");

        let annotations: BackendAnnotations = policy::annotations(&self.tree);
        self.secrets = backend
            .get_secrets(&decision.secret_path, decision.secret_version.as_deref(), &annotations)
            .await?;

        debug!(
            resource = %self.display_name(),
            path = %decision.secret_path,
            keys = self.secrets.len(),
            "fetched secret map"
        );
        self.state = ResourceState::SecretsFetched;
        Ok(())
    }

    /// Runs the substitution pass over the tree.
    ///
    /// Any accumulated replacement error fails the resource as a whole; the
    /// partially-substituted tree is left as the walk produced it.
    pub fn replace(&mut self) -> Result<()> {
        if self.state != ResourceState::SecretsFetched {
            return Err(SecretweaveError::state(format!(
                "replace called on {} in state {:?}",
                self.display_name(),
                self.state
            )));
        }
        let decision = self.decision.as_ref().expect("fetched resources have a decision");

        let substitution = Substitution::new(&self.secrets, decision.remove_missing);
        self.errors = substitution.run(&mut self.tree);

        if self.errors.is_empty() {
            self.state = ResourceState::Substituted;
            info!(resource = %self.display_name(), "substitution complete");
            Ok(())
        } else {
            self.state = ResourceState::Failed;
            Err(self.aggregate_error())
        }
    }

    /// Serializes the tree back to YAML.
    ///
    /// Reachable only from `Substituted` or from `Scanned{skipped}`, which
    /// serializes the tree unchanged.
    pub fn serialize(&mut self) -> Result<String> {
        match self.state {
            ResourceState::Substituted | ResourceState::Scanned { replaceable: false } => {
                let rendered = serde_yaml::to_string(&self.tree)?;
                self.state = ResourceState::Serialized;
                Ok(rendered)
            }
            _ => Err(SecretweaveError::state(format!(
                "serialize called on {} in state {:?}",
                self.display_name(),
                self.state
            ))),
        }
    }

    fn aggregate_error(&self) -> SecretweaveError {
        let details = self
            .errors
            .iter()
            .map(ReplacementError::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        SecretweaveError::Substitution { resource: self.display_name(), details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{BackendAnnotations, SecretBackendType};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct StubBackend {
        secrets: SecretMap,
        fail: bool,
    }

    impl StubBackend {
        fn with(yaml: &str) -> Self {
            Self { secrets: serde_yaml::from_str(yaml).unwrap(), fail: false }
        }

        fn failing() -> Self {
            Self { secrets: SecretMap::new(), fail: true }
        }
    }

    #[async_trait]
    impl SecretBackend for StubBackend {
        async fn login(&self) -> Result<()> {
            Ok(())
        }

        async fn get_secrets(
            &self,
            path: &str,
            _version: Option<&str>,
            _annotations: &BackendAnnotations,
        ) -> Result<SecretMap> {
            if self.fail {
                return Err(SecretweaveError::path_not_found(path, "stub failure"));
            }
            Ok(self.secrets.clone())
        }

        fn backend_type(&self) -> SecretBackendType {
            SecretBackendType::File
        }
    }

    fn resource(yaml: &str) -> Resource {
        Resource::from_yaml(yaml).unwrap()
    }

    fn test_policy() -> ResourcePolicy {
        ResourcePolicy::new("secret/data")
    }

    #[tokio::test]
    async fn test_happy_path_lifecycle() {
        let mut r = resource(
            r#"
kind: Secret
metadata:
  name: db-credentials
data:
  password: "<db-password | base64encode>"
"#,
        );
        assert_eq!(r.state(), &ResourceState::Unscanned);

        assert!(r.scan(&test_policy()).unwrap());
        assert_eq!(r.state(), &ResourceState::Scanned { replaceable: true });

        let backend = StubBackend::with("db-password: hunter2\n");
        r.fetch_secrets(&backend).await.unwrap();
        assert_eq!(r.state(), &ResourceState::SecretsFetched);

        r.replace().unwrap();
        assert_eq!(r.state(), &ResourceState::Substituted);

        let rendered = r.serialize().unwrap();
        assert_eq!(r.state(), &ResourceState::Serialized);
        assert!(rendered.contains("aHVudGVyMg=="));
        assert!(!rendered.contains("<db-password"));
    }

    #[tokio::test]
    async fn test_skipped_resource_serializes_unchanged() {
        let raw = r#"
kind: ConfigMap
metadata:
  name: plain
data:
  key: value
"#;
        let mut r = resource(raw);
        assert!(!r.scan(&test_policy()).unwrap());
        assert_eq!(r.state(), &ResourceState::Scanned { replaceable: false });

        let rendered = r.serialize().unwrap();
        assert_eq!(r.state(), &ResourceState::Serialized);
        let reparsed: TreeValue = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(&reparsed, r.tree());
    }

    #[tokio::test]
    async fn test_fetch_refused_for_skipped_resource() {
        let mut r = resource("kind: ConfigMap\ndata:\n  key: value\n");
        r.scan(&test_policy()).unwrap();

        let backend = StubBackend::with("k: v\n");
        let err = r.fetch_secrets(&backend).await.unwrap_err();
        assert!(matches!(err, SecretweaveError::State(_)));
    }

    #[tokio::test]
    async fn test_backend_failure_stops_at_scanned() {
        let mut r = resource("kind: Secret\ndata:\n  pw: \"<pw>\"\n");
        r.scan(&test_policy()).unwrap();

        let backend = StubBackend::failing();
        assert!(r.fetch_secrets(&backend).await.is_err());
        // The resource never progressed past Scanned.
        assert_eq!(r.state(), &ResourceState::Scanned { replaceable: true });
        assert!(r.serialize().is_err());
    }

    #[tokio::test]
    async fn test_partial_errors_are_terminal() {
        let mut r = resource("kind: Secret\ndata:\n  a: \"<present>\"\n  b: \"<gone>\"\n");
        r.scan(&test_policy()).unwrap();
        r.fetch_secrets(&StubBackend::with("present: ok\n")).await.unwrap();

        let err = r.replace().unwrap_err();
        assert_eq!(r.state(), &ResourceState::Failed);
        match err {
            SecretweaveError::Substitution { resource, details } => {
                assert!(resource.contains("Secret"));
                assert!(details.contains("gone"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // No serialization from the failed state, but the partially
        // substituted tree is still observable.
        assert!(r.serialize().is_err());
        let data = r.tree().as_map().unwrap()["data"].as_map().unwrap();
        assert_eq!(data["a"], TreeValue::from("ok"));
        assert_eq!(data["b"], TreeValue::from("<gone>"));
    }

    #[tokio::test]
    async fn test_remove_missing_annotation_applies() {
        let mut r = resource(
            r#"
kind: Secret
metadata:
  annotations:
    secretweave.io/remove-missing: "true"
data:
  a: "<present>"
  b: "<gone>"
"#,
        );
        r.scan(&test_policy()).unwrap();
        r.fetch_secrets(&StubBackend::with("present: ok\n")).await.unwrap();
        r.replace().unwrap();

        let data = r.tree().as_map().unwrap()["data"].as_map().unwrap();
        assert_eq!(data["a"], TreeValue::from("ok"));
        assert!(!data.contains_key("b"));
    }

    #[test]
    fn test_out_of_order_calls_rejected() {
        let mut r = resource("kind: Secret\ndata:\n  pw: \"<pw>\"\n");
        assert!(r.replace().is_err());
        assert!(r.serialize().is_err());

        r.scan(&test_policy()).unwrap();
        let err = r.scan(&test_policy()).unwrap_err();
        assert!(matches!(err, SecretweaveError::State(_)));
    }

    #[test]
    fn test_display_name() {
        let r = resource("kind: Deployment\nmetadata:\n  name: web\n");
        assert_eq!(r.display_name(), "Deployment/web");

        let r = resource("data: {}\n");
        assert_eq!(r.display_name(), "Unknown/unnamed");
    }
}
