//! Command implementations for chsync-cli

pub mod delta;
pub mod diff;
pub mod init;
pub mod pull;
pub mod push;
pub mod scan;
pub mod vars;

pub use delta::run_delta;
pub use diff::run_diff;
pub use init::run_init;
pub use pull::{PullArgs, run_pull};
pub use push::{PushArgs, run_push};
pub use scan::run_scan;
pub use vars::run_vars;

use std::path::Path;

use chsync_core::{ChannelCodec, DecomposeOptions, JsonChannelCodec};
use chsync_model::DecomposedChannel;

use crate::error::{CliError, Result};

/// Read and decompose a native channel document from disk.
pub(crate) fn decompose_file(path: &Path) -> Result<DecomposedChannel> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::user(format!("cannot read {}: {e}", path.display())))?;
    let channel = JsonChannelCodec::new()
        .decompose(&content, &DecomposeOptions::default())
        .map_err(|e| CliError::user(format!("{}: {e}", path.display())))?;
    Ok(channel)
}
