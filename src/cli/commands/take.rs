//! The `take` command: run a timed attempt in the TUI, then score and persist.

use std::path::Path;

use anyhow::Result;
use colored::*;
use dialoguer::Confirm;

use crate::cli::commands::results::print_result;
use crate::tui;
use examsim::bank::Bank;
use examsim::config::Config;
use examsim::store;

pub async fn take_command(
    config: &Config,
    mut bank: Bank,
    exam_id: &str,
    file: Option<&Path>,
) -> Result<()> {
    if let Some(path) = file {
        bank.load_file(path)?;
    }

    let Some(exam) = bank.get(exam_id) else {
        anyhow::bail!(
            "Exam '{}' not found. Known exams: {}",
            exam_id,
            bank.exams()
                .iter()
                .map(|e| e.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    };

    println!(
        "{} ({} questions, {} minutes)",
        exam.full_name.bold(),
        exam.total_questions(),
        exam.duration_minutes
    );
    let start = Confirm::new()
        .with_prompt("Start a timed attempt now?")
        .default(true)
        .interact()?;
    if !start {
        return Ok(());
    }

    let outcome = tui::exam::run_session(exam.clone(), config).await?;

    let result = match outcome {
        tui::exam::SessionOutcome::Submitted(result) => result,
        tui::exam::SessionOutcome::Abandoned => {
            // No partial result is ever persisted for an abandoned attempt
            println!("  {}", "Attempt abandoned; nothing was saved.".bright_yellow());
            return Ok(());
        }
    };

    print_result(&result);
    println!();

    // The breakdown above stays visible even if persistence fails; the
    // durability loss is reported, not hidden.
    let db_path = config.results_db_path()?;
    match store::db::connect(&db_path).await {
        Ok(pool) => match store::results::save(&pool, &result).await {
            Ok(()) => {
                println!(
                    "{} Saved as {}",
                    "✓".bright_green().bold(),
                    result.id.bright_cyan()
                );
            }
            Err(e) => {
                log::error!("Failed to save result: {:?}", e);
                println!(
                    "{} Could not save this result: {}",
                    "✗".bright_red().bold(),
                    e
                );
            }
        },
        Err(e) => {
            log::error!("Failed to open results database: {:?}", e);
            println!(
                "{} Could not open the results database: {}",
                "✗".bright_red().bold(),
                e
            );
        }
    }

    Ok(())
}
