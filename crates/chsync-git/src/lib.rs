//! Version-control client for Channel Sync
//!
//! [`VersionControl`] is the interface the sync orchestrator stages and
//! commits through; [`GitClient`] implements it on top of libgit2.

pub mod error;
pub mod history;
pub mod vcs;

mod client;
mod remote;

pub use client::GitClient;
pub use error::{Error, Result};
pub use history::CommitInfo;
pub use vcs::{FileState, StatusEntry, VersionControl};
