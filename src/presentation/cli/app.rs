use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::application::config::DEFAULT_ENVIRONMENT;
use crate::domain::value_objects::alert_level::AlertLevel;

/// cronguard: batch job harness
///
/// Runs a job and reports its START, FINAL and FAILURE events to the
/// database and chat channels configured for the selected environment.
#[derive(Parser, Debug)]
#[command(name = "cronguard")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to custom config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment section of the config file
    #[arg(short, long, global = true, default_value = DEFAULT_ENVIRONMENT)]
    pub env: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a program as a monitored job
    #[command(alias = "r")]
    Run {
        /// Job name reported as the alert source (default: program name)
        #[arg(short, long)]
        name: Option<String>,

        /// Extra attempts when the program exits non-zero
        #[arg(long, default_value = "0")]
        retries: u32,

        /// Program and arguments, after `--`
        #[arg(required = true, last = true)]
        command: Vec<String>,
    },

    /// Send a single alert through the configured channels
    #[command(alias = "a")]
    Alert {
        /// SUCCESS, WARNING or FAILURE
        #[arg(short, long)]
        level: AlertLevel,

        /// Alert title
        #[arg(short, long)]
        title: String,

        /// Plain text or a JSON object
        #[arg(short, long)]
        detail: Option<String>,

        /// Source reported with the alert
        #[arg(short, long, default_value = "cronguard")]
        source: String,
    },

    /// Create the alert table in the configured database
    InitDb,

    /// List registered channels and the levels they deliver
    #[command(alias = "ch")]
    Channels,
}
