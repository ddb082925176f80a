//! Deployment variable resolution for Channel Sync
//!
//! Resolves `${NAME}` and `${NAME:default}` placeholders against a layered
//! source chain, highest priority first:
//!
//! 1. process environment
//! 2. extra variables supplied by the caller
//! 3. `environments/<env>.yaml`
//! 4. `environments/base.yaml`
//! 5. the inline default embedded in the placeholder
//!
//! A resolved value may itself contain placeholders; those are expanded in the
//! same pass, and a name that re-enters its own expansion is reported as a
//! circular reference.

pub mod error;
mod loader;
mod placeholder;
mod resolver;
mod source;

pub use error::{Error, Result};
pub use resolver::{ObjectResolution, Resolution, ResolverOptions, VariableResolver};
pub use source::{ProcessEnv, VariableEntry, VariableSource};
