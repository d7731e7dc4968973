//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// jobprobe: end-to-end checks for the job create/show/edit screens
#[derive(Parser, Debug)]
#[command(name = "jobprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against a live application
    Run(RunArgs),

    /// List the available scenarios
    List(ListArgs),

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Where the harness configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// YAML configuration file
    #[arg(short, long, env = "JOBPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Application base URL (overrides file and environment)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Fixture project (overrides file and environment)
    #[arg(long)]
    pub project: Option<String>,

    /// Nodes the fixture project is expected to match
    #[arg(long)]
    pub expected_nodes: Option<u32>,

    /// Append a random suffix to job names
    #[arg(long)]
    pub unique_names: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// Scenario ids to run (default: all, in catalog order)
    #[arg(short, long = "scenario")]
    pub scenarios: Vec<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Write the JSON suite report to this path
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Directory for failure screenshots
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: ListFormat,
}

/// List output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListFormat {
    /// One scenario per line
    #[default]
    Text,
    /// JSON array
    Json,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: ConfigSource,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
