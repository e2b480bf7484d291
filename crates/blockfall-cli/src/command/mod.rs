use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{random_play::RandomPlayArg, replay::ReplayArg};

mod random_play;
mod replay;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log filter used when `RUST_LOG` is not set (e.g. `info`, `blockfall_engine=debug`)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Replay a scripted key timeline and print the resulting snapshot
    Replay(#[clap(flatten)] ReplayArg),
    /// Press random keys until the game ends and print a summary
    RandomPlay(#[clap(flatten)] RandomPlayArg),
}

fn init_logging(default_filter: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(&args.log_level)?;
    match args.mode {
        Mode::Replay(arg) => replay::run(&arg)?,
        Mode::RandomPlay(arg) => random_play::run(&arg)?,
    }
    Ok(())
}
