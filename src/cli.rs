//! CLI argument parser for sysundo
//!
//! Provides type-safe argument parsing using clap derive.

use clap::{Parser, Subcommand};

/// CLI arguments for sysundo
#[derive(Parser, Debug)]
#[command(
    name = "sysundo",
    version,
    about = "Automatic backup tool for rm, mv and cp",
    long_about = "Backs up the files rm, mv or cp is about to touch, runs the command,\n\
                  and restores the most recent backup with `sysundo undo`.",
    arg_required_else_help = true
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command, backing up the files it would affect (rm, mv, cp)
    Watch {
        /// Command followed by its arguments
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "COMMAND"
        )]
        argv: Vec<String>,
    },
    /// Restore the files of the last backup
    Undo,
    /// Show the last backup record
    List,
    /// Show or set the interface language
    Lang {
        /// Language code to switch to (e.g. en, tr)
        code: Option<String>,
    },
    /// Initialize configuration file (~/.config/sysundo/config.toml)
    Init,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
