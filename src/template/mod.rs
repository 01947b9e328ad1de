//! # Template Substitution Core
//!
//! The generic substitution engine: a recursive tree walker over parsed
//! manifest documents, a `<key | modifier(...)>` placeholder grammar, a
//! type-preserving substitution rule, a per-field modifier pipeline, and the
//! annotation-driven policy that decides which resources get processed and
//! from where.
//!
//! The flow for one resource: [`policy::ResourcePolicy`] decides whether the
//! resource needs processing → the caller fetches a [`value::SecretMap`]
//! through the backend contract → [`engine::Substitution`] walks the tree,
//! resolving placeholders and running modifier chains → [`resource::Resource`]
//! collects errors and exposes the mutated tree for serialization.

pub mod engine;
pub mod error;
pub mod modifiers;
pub mod parser;
pub mod policy;
pub mod resource;
pub mod value;

pub use engine::Substitution;
pub use error::{ModifierError, ParseError, ReplacementError, ReplacementErrorKind};
pub use parser::{ModifierInvocation, PlaceholderMatch};
pub use policy::{KvVersion, PolicyDecision, ResourcePolicy};
pub use resource::{Resource, ResourceState};
pub use value::{Mapping, SecretMap, TreeValue};
