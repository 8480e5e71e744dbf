use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shipyard")]
#[command(about = "Tool dispatch for the Shipyard coding agent", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run one tool invocation and print its results as JSON")]
    Dispatch {
        #[arg(short, long, help = "Project folder the tool works in")]
        project: String,

        #[arg(short, long, help = "File holding the invocation JSON (stdin when omitted)")]
        input: Option<PathBuf>,

        #[arg(short, long, help = "Config file (defaults to ~/.shipyard/config.toml)")]
        config: Option<PathBuf>,
    },

    #[command(about = "List the registered tools")]
    Tools,
}
