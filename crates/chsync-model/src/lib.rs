//! Channel data model for Channel Sync
//!
//! - [`Value`]: closed scalar / sequence / mapping type for connector properties
//! - [`DecomposedChannel`]: the structured projection of one channel
//! - [`FlatChannel`]: the shallow view used for diffing
//! - [`FileTreeEntry`]: one externalized file
//! - [`CodeTemplateLibrary`]: shared script libraries referenced by channels

pub mod channel;
pub mod flat;
pub mod library;
pub mod tree;
pub mod value;

pub use channel::{
    ChannelMetadata, ChannelScripts, Connector, ConnectorRef, DecomposedChannel, Destination,
    ScriptSlot, Step, StepKind, StepList, step_file_stem,
};
pub use flat::{FlatChannel, FlatDestination};
pub use library::{CodeTemplate, CodeTemplateLibrary};
pub use tree::{EntryKind, FileTreeEntry};
pub use value::{Mapping, Scalar, Value};
