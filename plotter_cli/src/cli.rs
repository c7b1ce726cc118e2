//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "plotter", version, about = "Plotter CLI")]
pub struct Cli {
    /// Path to config TOML (missing file means built-in defaults)
    #[arg(long, value_name = "FILE", default_value = "etc/plotter.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every motor into its mechanical stops and print the recorded limits
    Home,
    /// Home, then move to the given coordinates
    Go {
        /// X coordinate (millimeters unless --inches)
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,
        /// Y coordinate
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,
        /// Tool height
        #[arg(long, allow_negative_numbers = true)]
        z: Option<f64>,
        /// Treat coordinates as offsets from the current position
        #[arg(long, action = ArgAction::SetTrue)]
        relative: bool,
        /// Coordinates are in inches
        #[arg(long, action = ArgAction::SetTrue)]
        inches: bool,
    },
    /// Report which motors are connected
    SelfCheck,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Home => "home",
            Commands::Go { .. } => "go",
            Commands::SelfCheck => "self-check",
        }
    }
}
