//! Synchronization configuration
//!
//! Tool settings come from layered TOML files merged by [`ConfigResolver`];
//! the repository itself is described by `repository.yaml`
//! ([`RepositoryMetadata`]).

mod repository;
mod resolver;
mod settings;

pub use repository::{GitFlow, RepositoryMetadata};
pub use resolver::{CONFIG_FILE, ConfigResolver, LOCAL_CONFIG_FILE, merge_tables};
pub use settings::{DiffSettings, SecretsSettings, SyncConfig, SyncSettings, VariablesSettings};
