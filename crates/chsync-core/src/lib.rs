//! Channel Sync core
//!
//! Converts native channel documents into a diffable repository layout and
//! back:
//!
//! - [`codec`]: the [`ChannelCodec`] seam and the JSON reference codec
//! - [`tree`]: the on-disk layout of channels and code-template libraries
//! - [`overlay`]: applying edited files onto a snapshot decomposition
//! - [`config`]: layered `config.toml` and `repository.yaml`
//! - [`sync`]: the push and pull workflows

pub mod codec;
pub mod config;
pub mod error;
pub mod overlay;
pub mod sync;
pub mod tree;

pub use codec::{AssembleOptions, ChannelCodec, DecomposeOptions, JsonChannelCodec};
pub use config::{ConfigResolver, RepositoryMetadata, SyncConfig};
pub use error::{Error, Result};
pub use overlay::{OverlayOutcome, OverlayReport, OverlayTarget};
pub use sync::{
    ChannelDocument, ChannelError, ChannelFilter, PullOptions, PullReport, PulledChannel,
    PushOptions, PushReport, PushRequest, PushedChannel, PushedLibrary, SyncEngine,
};
