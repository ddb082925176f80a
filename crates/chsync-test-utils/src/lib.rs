//! Shared test fixtures for the Channel Sync workspace.
//!
//! A dev-dependency only, never published.
//!
//! - [`git`]: repositories with a configured identity, bare remotes
//! - [`fixtures`]: sample channel documents and code-template libraries
//! - [`repo`]: [`repo::TestRepo`], a scratch synchronization root

pub mod fixtures;
pub mod git;
pub mod repo;
