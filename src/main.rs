use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use enstat::manager::Manager;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    study_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a synthetic ensemble record.
    Synthesize,

    /// Compute a statistics report for every ensemble record.
    Analyze,

    /// Print a summary of every report.
    Summarize,

    /// Remove every report.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.study_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Synthesize => mgr.synthesize()?,
        Command::Analyze => mgr.analyze()?,
        Command::Summarize => mgr.summarize()?,
        Command::Clean => mgr.clean()?,
    }

    Ok(())
}
