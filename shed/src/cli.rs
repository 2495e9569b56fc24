//! CLI argument parsing for toolshed

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shed")]
#[command(author, version, about = "Registry and runner for external command-line tools", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered tools
    Tools,

    /// Register a tool from a YAML definition file
    Add {
        /// Path to the tool definition (YAML)
        #[arg(required = true)]
        file: PathBuf,

        /// Run the tool from inside its cloned repository
        #[arg(long)]
        run_in_clone: bool,
    },

    /// Remove a tool and its cloned repository
    Rm {
        /// Tool ID to remove
        #[arg(required = true)]
        tool_id: String,
    },

    /// Run a tool with the given inputs
    Run {
        /// Tool ID to run
        #[arg(required = true)]
        tool_id: String,

        /// Input values as key=value pairs (repeatable)
        #[arg(short, long = "input", value_parser = parse_key_value)]
        inputs: Vec<(String, String)>,
    },

    /// Show past runs, newest first
    History {
        /// Limit to one tool
        tool_id: Option<String>,
    },

    /// Print a stored output artifact
    Show {
        /// Artifact file name as listed in history
        #[arg(required = true)]
        artifact: String,
    },
}

/// Parse a `key=value` argument
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}
