//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use lineage_core::DeleteScope;

/// lineage - Keep track of which branch was cut from which
#[derive(Parser, Debug)]
#[command(name = "lineage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show how every local branch relates to its remote or its parent
    Status {
        /// Compare against the parent branch instead of the remote
        #[arg(long)]
        parent: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Create, delete, switch and list branches
    Branch {
        /// Branch action to perform
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Show or change the parent of a branch
    Parent {
        #[command(subcommand)]
        action: ParentAction,
    },

    /// Manage perennial branches
    Perennial {
        #[command(subcommand)]
        action: PerennialAction,
    },

    /// Merge remote and parent changes into branches and push them
    ///
    /// Examples:
    ///   lineage sync              # Sync the current branch and its ancestors
    ///   lineage sync feature-a    # Sync feature-a and its ancestors
    ///   lineage sync --all        # Sync every local branch
    Sync {
        /// Branch to sync (defaults to the current branch)
        branch: Option<String>,

        /// Sync all local branches
        #[arg(long, conflicts_with = "branch")]
        all: bool,
    },

    /// Reset the branches touched by the last sync to where they were
    Undo,

    /// Print the branch hierarchy as a tree
    Tree,

    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    ///
    /// Outputs completion script for your shell.
    ///
    /// Examples:
    ///   lineage completions bash > ~/.local/share/bash-completion/completions/lineage
    ///   lineage completions zsh > ~/.zfunc/_lineage
    ///   lineage completions fish > ~/.config/fish/completions/lineage.fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Branch management actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BranchAction {
    /// Create a branch and record its parent
    Create {
        /// Name of the branch
        name: String,

        /// Parent branch (defaults to the main branch)
        #[arg(short, long)]
        parent: Option<String>,

        /// Commit to start from (defaults to the parent's tip)
        #[arg(short, long)]
        start_point: Option<String>,

        /// Publish the branch with upstream tracking
        #[arg(long)]
        push: bool,

        /// Switch to the new branch
        #[arg(short, long)]
        checkout: bool,
    },

    /// Delete a branch locally, on the remote, or both
    Delete {
        /// Name of the branch to delete
        name: String,

        /// Which refs to delete
        #[arg(long, value_enum, default_value_t = ScopeArg::Both)]
        scope: ScopeArg,
    },

    /// Switch to a branch
    Checkout {
        /// Branch name to checkout
        name: String,
    },

    /// List local branches with their parents
    List,
}

/// Parent actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ParentAction {
    /// Make `parent` the parent of `branch`
    Set { branch: String, parent: String },

    /// Show the ancestor chain of a branch (defaults to the current branch)
    Show { branch: Option<String> },
}

/// Perennial actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PerennialAction {
    /// Mark a branch perennial
    Add { name: String },

    /// Remove a perennial mark
    Remove { name: String },

    /// List perennial branches
    List,
}

/// Config actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the resolved configuration
    Show,

    /// Set the main branch in the repository config
    Main { name: String },
}

/// `--scope` values
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    Local,
    Remote,
    Both,
}

impl From<ScopeArg> for DeleteScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Local => DeleteScope::Local,
            ScopeArg::Remote => DeleteScope::Remote,
            ScopeArg::Both => DeleteScope::Both,
        }
    }
}
