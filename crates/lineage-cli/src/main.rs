//! lineage CLI
//!
//! Command-line interface for creating, syncing and inspecting stacked
//! branches.

mod cli;
mod commands;
mod error;

use std::io;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{BranchAction, Cli, Commands, ConfigAction, ParentAction, PerennialAction};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!(
                "{} - keep track of which branch was cut from which",
                "lineage".green().bold()
            );
            println!();
            println!("Run {} for available commands.", "lineage --help".cyan());
            Ok(())
        }
    }
}

/// DEBUG with `--verbose`, otherwise whatever `LINEAGE_LOG` asks for
/// (warnings by default).
fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let filter =
            EnvFilter::try_from_env("LINEAGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    if let Err(e) = result {
        eprintln!("{}: {e}", "warning".yellow().bold());
    }
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<()> {
    if let Commands::Completions { shell } = cmd {
        clap_complete::generate(shell, &mut Cli::command(), "lineage", &mut io::stdout());
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    match cmd {
        Commands::Status { parent, json } => commands::run_status(&cwd, parent, json),
        Commands::Branch { action } => cmd_branch(&cwd, action),
        Commands::Parent { action } => match action {
            ParentAction::Set { branch, parent } => commands::run_parent_set(&cwd, &branch, &parent),
            ParentAction::Show { branch } => commands::run_parent_show(&cwd, branch.as_deref()),
        },
        Commands::Perennial { action } => match action {
            PerennialAction::Add { name } => commands::run_perennial_add(&cwd, &name),
            PerennialAction::Remove { name } => commands::run_perennial_remove(&cwd, &name),
            PerennialAction::List => commands::run_perennial_list(&cwd),
        },
        Commands::Sync { branch, all } => commands::run_sync(&cwd, branch.as_deref(), all),
        Commands::Undo => commands::run_undo(&cwd),
        Commands::Tree => commands::run_tree(&cwd),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::run_config_show(&cwd),
            ConfigAction::Main { name } => commands::run_config_main(&cwd, &name),
        },
        Commands::Completions { .. } => Ok(()),
    }
}

fn cmd_branch(cwd: &std::path::Path, action: BranchAction) -> Result<()> {
    match action {
        BranchAction::Create {
            name,
            parent,
            start_point,
            push,
            checkout,
        } => commands::run_branch_create(
            cwd,
            &name,
            parent.as_deref(),
            start_point.as_deref(),
            push,
            checkout,
        ),
        BranchAction::Delete { name, scope } => {
            commands::run_branch_delete(cwd, &name, scope.into())
        }
        BranchAction::Checkout { name } => commands::run_branch_checkout(cwd, &name),
        BranchAction::List => commands::run_branch_list(cwd),
    }
}
