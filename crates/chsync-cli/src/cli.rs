//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Channel Sync - keep integration-engine channels in git
#[derive(Parser, Debug)]
#[command(name = "chsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Synchronization root (searched upwards for repository.yaml)
    #[arg(long, global = true, default_value = ".", env = "CHSYNC_ROOT")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Prepare a directory for channel synchronization
    ///
    /// Initializes git, writes repository.yaml and .chsync/config.toml.
    Init {
        /// Integration engine the channels come from (default: generic)
        #[arg(long)]
        engine: Option<String>,

        #[arg(long)]
        engine_version: Option<String>,

        #[arg(long)]
        server_url: Option<String>,
    },

    /// Externalize channel documents into the repository and commit
    ///
    /// Examples:
    ///   chsync push exports/*.json
    ///   chsync push exports/ --library libs/util.json -m "Nightly export"
    Push {
        /// Channel documents, or directories of *.json documents
        #[arg(required_unless_present = "libraries")]
        documents: Vec<PathBuf>,

        /// Code-template library documents
        #[arg(long = "library", value_name = "FILE")]
        libraries: Vec<PathBuf>,

        /// Store credentials as-is instead of masking them
        #[arg(long)]
        no_mask: bool,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,

        /// Push to the configured remote after committing
        #[arg(long)]
        push: bool,

        /// Restrict to these channels (name or directory slug)
        #[arg(long = "channel", value_name = "NAME")]
        channels: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Rebuild channel documents from the repository
    Pull {
        /// Environment variable file to apply (environments/<ENV>.yaml)
        #[arg(long = "env", value_name = "ENV")]
        environment: Option<String>,

        /// Fail channels with unresolved variables
        #[arg(long)]
        strict: bool,

        /// Extra variables, ranked just below the process environment
        #[arg(long = "var", value_name = "NAME=VALUE")]
        variables: Vec<String>,

        /// Restrict to these channels (name or directory slug)
        #[arg(long = "channel", value_name = "NAME")]
        channels: Vec<String>,

        /// Write documents as <OUT>/<slug>.json
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Pull from the configured remote first
        #[arg(long)]
        update: bool,

        #[arg(long)]
        json: bool,
    },

    /// Compare two channel documents
    Diff {
        old: PathBuf,
        new: PathBuf,

        /// Collapse whitespace runs before comparing
        #[arg(long)]
        ignore_whitespace: bool,

        /// Context lines around script changes
        #[arg(long, value_name = "N")]
        context: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Map changed repository files to affected channels
    ///
    /// Reads paths from the arguments, or from git between --from and --to.
    Delta {
        paths: Vec<String>,

        /// Base revision
        #[arg(long, default_value = "HEAD", conflicts_with = "paths")]
        from: String,

        /// Target revision (default: working tree)
        #[arg(long, conflicts_with = "paths")]
        to: Option<String>,

        /// Report direct changes only
        #[arg(long)]
        no_cascade: bool,

        #[arg(long)]
        json: bool,
    },

    /// Report credential-shaped fields of a channel document
    Scan {
        document: PathBuf,

        /// Additional field names to treat as sensitive
        #[arg(long = "field", value_name = "NAME")]
        fields: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show the variable table and where each value comes from
    Vars {
        #[arg(long = "env", value_name = "ENV")]
        environment: Option<String>,

        /// Only the variables referenced by this text, including inline defaults
        #[arg(long, value_name = "TEXT")]
        explain: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_push_with_repeated_flags() {
        let cli = Cli::parse_from([
            "chsync", "push", "a.json", "b.json", "--library", "lib.json", "--channel", "ADT",
            "--no-mask", "-m", "msg",
        ]);
        match cli.command {
            Some(Commands::Push {
                documents,
                libraries,
                no_mask,
                message,
                channels,
                ..
            }) => {
                assert_eq!(documents.len(), 2);
                assert_eq!(libraries, vec![PathBuf::from("lib.json")]);
                assert!(no_mask);
                assert_eq!(message.as_deref(), Some("msg"));
                assert_eq!(channels, vec!["ADT"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_pull_defaults() {
        let cli = Cli::parse_from(["chsync", "pull"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Pull {
                environment: None,
                strict: false,
                update: false,
                ..
            })
        ));
        assert_eq!(cli.root, PathBuf::from("."));
    }

    #[test]
    fn delta_paths_conflict_with_revisions() {
        let result = Cli::try_parse_from(["chsync", "delta", "a.js", "--to", "HEAD"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_global_root_after_subcommand() {
        let cli = Cli::parse_from(["chsync", "scan", "doc.json", "--root", "/tmp/sync"]);
        assert_eq!(cli.root, PathBuf::from("/tmp/sync"));
    }
}
