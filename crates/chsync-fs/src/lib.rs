//! Filesystem layer for Channel Sync
//!
//! Provides forward-slash path handling, the synchronization repository
//! layout, slug derivation and atomic I/O.

pub mod checksum;
pub mod error;
pub mod io;
pub mod layout;
pub mod path;
pub mod slug;

pub use error::{Error, Result};
pub use layout::RepoPath;
pub use path::NormalizedPath;
pub use slug::slugify;
