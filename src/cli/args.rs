use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(version, about = "A small to-do list kept on local disk")]
pub struct Cli {
    /// Path to a JSON configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory the list is stored in
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Storage slot the list is saved under
    #[clap(long)]
    pub key: Option<String>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the todolist application
    #[clap(subcommand)]
    pub command: Commands,
}

/// One line typed into the interactive shell, parsed with the same
/// subcommands as the command line.
#[derive(Parser, Debug)]
#[clap(no_binary_name = true, disable_version_flag = true)]
pub(crate) struct ShellLine {
    #[clap(subcommand)]
    pub command: Commands,
}
