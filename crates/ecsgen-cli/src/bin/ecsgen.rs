use anyhow::Result;
use clap::Parser;

use ecsgen_cli::args::{CliArgs, Command};
use ecsgen_cli::driver::{self, ProcessStatus};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    ecsgen_cli::tracing_config::init_tracing(args.verbose, args.log_format);

    match args.command {
        Command::Process(args) => match driver::process(&args)? {
            ProcessStatus::Ignored => println!("{}: ignored", args.assembly.display()),
            ProcessStatus::Unchanged => println!("{}: unchanged", args.assembly.display()),
            ProcessStatus::Written(path) => println!("wrote {}", path.display()),
        },
        Command::Inspect(args) => {
            for line in driver::inspect(&args)? {
                println!("{line}");
            }
        }
    }
    Ok(())
}
