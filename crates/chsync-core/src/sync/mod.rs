//! Push and pull orchestration
//!
//! [`SyncEngine`] composes a [`crate::ChannelCodec`], a
//! [`chsync_git::VersionControl`] client, the secret masker and the variable
//! resolver. Both workflows are per-channel fault tolerant: a channel that
//! fails is reported and its siblings still run.

mod engine;
mod filter;
mod report;

pub use engine::SyncEngine;
pub use filter::ChannelFilter;
pub use report::{
    ChannelDocument, ChannelError, PullOptions, PullReport, PulledChannel, PushOptions,
    PushReport, PushRequest, PushedChannel, PushedLibrary,
};
