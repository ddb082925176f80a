//! Channel codecs
//!
//! A codec converts a channel's native document into a [`DecomposedChannel`]
//! and back. The orchestrator only sees this trait, so engines with other
//! native formats plug in by implementing it.

mod json;

pub use json::JsonChannelCodec;

use chsync_model::{DecomposedChannel, FileTreeEntry};

use crate::Result;
use crate::tree::channel_file_tree;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecomposeOptions {
    /// Keep channel script slots whose body is empty
    pub keep_empty_scripts: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleOptions {
    /// The full-fidelity native document the decomposition came from.
    /// Fields the decomposition does not model are taken from here.
    pub snapshot: Option<String>,
}

impl AssembleOptions {
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            snapshot: Some(snapshot.into()),
        }
    }
}

pub trait ChannelCodec {
    /// Short name of the native format, used in logs
    fn name(&self) -> &'static str;

    fn decompose(&self, document: &str, options: &DecomposeOptions) -> Result<DecomposedChannel>;

    /// Externalized files relative to the channel directory.
    fn to_file_tree(&self, decomposed: &DecomposedChannel) -> Result<Vec<FileTreeEntry>> {
        channel_file_tree(decomposed)
    }

    /// Rebuild a native document.
    ///
    /// With a snapshot and an unchanged decomposition the snapshot is returned
    /// byte-for-byte.
    fn assemble(&self, decomposed: &DecomposedChannel, options: &AssembleOptions) -> Result<String>;
}
