pub mod app;
pub mod commands;

use anyhow::Result;

pub use app::{Cli, Commands, ResultsSubcommands};
use examsim::bank::Bank;
use examsim::config::Config;

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let bank = Bank::builtin()?;

    match cli.command {
        Commands::List => commands::exams::list_command(&bank),
        Commands::Info { exam_id } => commands::exams::info_command(&bank, &exam_id),
        Commands::Take { exam_id, file } => {
            commands::take::take_command(&config, bank, &exam_id, file.as_deref()).await
        }
        Commands::Results(results) => {
            commands::results::handle_results_command(&config, results.command).await
        }
    }
}
