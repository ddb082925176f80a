//! Change-to-artifact mapping for synchronization repositories
//!
//! A list of changed paths (typically from a commit range) is mapped onto
//! channels, code-template libraries, groups, config and environment files.
//! Direct changes are then expanded into cascaded dependents: channels that
//! use a modified code-template library, or every channel when an
//! environment file changed.

mod artifact;
mod detector;
mod report;

pub use artifact::{ArtifactRef, ArtifactType, map_file_to_artifact};
pub use detector::{
    CascadedChannel, ChangedChannel, ChangedCodeTemplate, ChangedConfig, DeltaResult,
    DetectOptions, LibraryRef, detect, find_cascades,
};
pub use report::format_for_cli;
