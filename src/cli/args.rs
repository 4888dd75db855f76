//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::Color;

/// Arrange labeled clusters in a parent/child forest, with undo/redo
#[derive(Parser, Debug)]
#[command(name = "clustree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, env = "CLUSTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Edit clusters interactively (default)
    Shell,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the global config file location
    Path,
    /// Print a commented config template
    Template,
}

/// One line typed into the shell.
#[derive(Parser, Debug)]
#[command(
    name = "shell",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true,
    help_template = "{subcommands}"
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ShellCommand {
    /// Create a root cluster
    New {
        label: String,
        /// Fill color (rrggbb, rgb or quoted '#rrggbb')
        #[arg(short, long)]
        color: Option<Color>,
        /// Diameter
        #[arg(short, long)]
        size: Option<f64>,
        /// Attach under this cluster instead
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Create a child cluster
    Child { parent: String, label: String },

    /// Delete a cluster and everything below it
    #[command(alias = "delete")]
    Rm { node: String },

    /// Change fill color (rrggbb or quoted '#rrggbb')
    Color { node: String, color: Color },

    /// Change label
    Rename {
        node: String,
        #[arg(required = true, num_args = 1..)]
        label: Vec<String>,
    },

    /// Move to an absolute position
    Move {
        node: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Drag by a relative offset
    Drag {
        node: String,
        #[arg(allow_negative_numbers = true)]
        dx: f64,
        #[arg(allow_negative_numbers = true)]
        dy: f64,
    },

    /// Show or hide the children of a cluster
    Toggle { node: String },

    Undo,

    Redo,

    /// List clusters
    Ls {
        /// Include hidden clusters
        #[arg(short, long)]
        all: bool,
    },

    /// Show visible clusters as a tree
    Tree,

    /// Show commands
    Help,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}
