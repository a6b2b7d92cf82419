use clap::{Parser, Subcommand};

use self::{analyze::AnalyzeArg, export::ExportArg};
use crate::util;

mod analyze;
mod export;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Write a text report of relation counts and streak statistics
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Write per-file and total aggregates as JSON
    Export(#[clap(flatten)] ExportArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    util::init_logging(args.verbose, args.quiet)?;
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Export(arg) => export::run(&arg)?,
    }
    Ok(())
}
