//! Channel Sync CLI
//!
//! Moves integration-engine channels between their native export format and a
//! diffable git repository.

mod cli;
mod commands;
mod context;
mod error;

use std::io::IsTerminal;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(verbose)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let root = cli.root;
    match cli.command {
        Some(cmd) => execute_command(&root, cmd).await,
        None => {
            println!("{} Channel Sync", "chsync".green().bold());
            println!();
            println!("Run {} for available commands.", "chsync --help".cyan());
            Ok(())
        }
    }
}

async fn execute_command(root: &std::path::Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init {
            engine,
            engine_version,
            server_url,
        } => commands::run_init(root, engine, engine_version, server_url),
        Commands::Push {
            documents,
            libraries,
            no_mask,
            message,
            push,
            channels,
            json,
        } => commands::run_push(
            root,
            &commands::PushArgs {
                documents,
                libraries,
                no_mask,
                message,
                push,
                channels,
            },
            json,
        ),
        Commands::Pull {
            environment,
            strict,
            variables,
            channels,
            out,
            update,
            json,
        } => {
            commands::run_pull(
                root,
                &commands::PullArgs {
                    environment,
                    strict,
                    variables,
                    channels,
                    out,
                    update,
                },
                json,
            )
            .await
        }
        Commands::Diff {
            old,
            new,
            ignore_whitespace,
            context,
            json,
        } => commands::run_diff(root, &old, &new, ignore_whitespace, context, json),
        Commands::Delta {
            paths,
            from,
            to,
            no_cascade,
            json,
        } => commands::run_delta(root, &paths, &from, to.as_deref(), !no_cascade, json),
        Commands::Scan {
            document,
            fields,
            json,
        } => commands::run_scan(&document, &fields, json),
        Commands::Vars {
            environment,
            explain,
            json,
        } => commands::run_vars(root, environment.as_deref(), explain.as_deref(), json).await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "chsync", &mut std::io::stdout());
            Ok(())
        }
    }
}
