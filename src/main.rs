use anyhow::Result;
use clap::Parser;
use log::info;

mod cli;
mod tui;

use cli::Cli;
use examsim::config;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to file (truncate on each run) -- the TUI owns the terminal
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("examsim.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let config = config::Config::load()?;

    let cli = Cli::parse();
    info!("Starting examsim");

    cli::run(cli, config).await
}
