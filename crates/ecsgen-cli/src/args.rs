use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::tracing_config::LogFormat;

/// CLI arguments for the ecsgen binary.
#[derive(Parser, Debug)]
#[command(
    name = "ecsgen",
    version,
    about = "Companion-type generator for ECS authoring assemblies"
)]
pub struct CliArgs {
    /// Show the activity log on stderr; repeat for more detail.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Shape of stderr log output. Overrides ECSGEN_LOG_FORMAT.
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a post-process pass over a compiled assembly.
    Process(ProcessArgs),
    /// Print every indexed type identity with its base chain.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Assembly image to process.
    pub assembly: PathBuf,

    /// Reference assembly; repeat for each reference.
    #[arg(short = 'r', long = "reference")]
    pub references: Vec<PathBuf>,

    /// Path to ecsgen.json. Defaults to the one next to the assembly, if any.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Write the result here instead of rewriting the assembly in place.
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Assembly image to inspect.
    pub assembly: PathBuf,

    /// Reference assembly; repeat for each reference.
    #[arg(short = 'r', long = "reference")]
    pub references: Vec<PathBuf>,
}

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod tests;
