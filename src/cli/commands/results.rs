//! Result history commands

use std::collections::BTreeMap;

use anyhow::Result;
use colored::*;
use sqlx::SqlitePool;

use crate::cli::app::ResultsSubcommands;
use examsim::config::Config;
use examsim::store::{self, ExamResult};

/// Read paths degrade gracefully: when the store cannot be opened, the user
/// sees the empty state instead of a crash.
async fn open_store_readonly(config: &Config) -> Option<SqlitePool> {
    let db_path = match config.results_db_path() {
        Ok(path) => path,
        Err(e) => {
            log::warn!("Could not resolve results database path: {:?}", e);
            return None;
        }
    };

    match store::db::connect(&db_path).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("Could not open results database: {:?}", e);
            None
        }
    }
}

fn print_empty_state() {
    println!("  {}", "No stored results yet".bright_yellow().bold());
    println!("  {}", "Take an exam with 'examsim take <id>' first.".dimmed());
}

pub async fn handle_results_command(config: &Config, cmd: ResultsSubcommands) -> Result<()> {
    let Some(pool) = open_store_readonly(config).await else {
        print_empty_state();
        return Ok(());
    };

    match cmd {
        ResultsSubcommands::List { exam } => list_results(&pool, exam.as_deref()).await,
        ResultsSubcommands::Show { id } => show_result(&pool, &id).await,
        ResultsSubcommands::Latest => show_latest(&pool).await,
        ResultsSubcommands::Stats { exam } => show_stats(&pool, exam.as_deref()).await,
    }
}

async fn list_results(pool: &SqlitePool, exam_id: Option<&str>) -> Result<()> {
    let results = match exam_id {
        Some(exam_id) => store::results::list_by_exam(pool, exam_id).await?,
        None => store::results::list(pool).await?,
    };

    if results.is_empty() {
        print_empty_state();
        return Ok(());
    }

    println!(
        "  {:<38} {:<12} {:<18} {:>9} {:>9}",
        "ID".dimmed(),
        "EXAM".dimmed(),
        "TAKEN".dimmed(),
        "SCORE".dimmed(),
        "ACCURACY".dimmed()
    );
    for result in &results {
        println!(
            "  {:<38} {:<12} {:<18} {:>4}/{:<4} {:>8.1}%",
            result.id.bright_cyan(),
            result.exam_id,
            result.taken_at.format("%Y-%m-%d %H:%M"),
            result.breakdown.score,
            result.breakdown.max_score,
            result.breakdown.accuracy
        );
    }

    Ok(())
}

async fn show_result(pool: &SqlitePool, id: &str) -> Result<()> {
    match store::results::get_by_id(pool, id).await? {
        Some(result) => print_result(&result),
        None => println!("  {}", format!("No result with id '{}'", id).bright_yellow()),
    }
    Ok(())
}

async fn show_latest(pool: &SqlitePool) -> Result<()> {
    match store::results::get_latest(pool).await? {
        Some(result) => print_result(&result),
        None => print_empty_state(),
    }
    Ok(())
}

/// Full per-section breakdown for one attempt. Shared with the `take`
/// command's post-attempt summary.
pub fn print_result(result: &ExamResult) {
    let b = &result.breakdown;

    println!("{}", format!("Result {}", result.id).bold());
    println!(
        "  Exam: {}   Taken: {}   Time spent: {}",
        result.exam_id.bright_cyan(),
        result.taken_at.format("%Y-%m-%d %H:%M:%S"),
        format_duration(result.time_spent_secs)
    );
    println!();
    println!(
        "  {:<14} {:>8} {:>10} {:>12} {:>11} {:>10}",
        "SECTION".dimmed(),
        "CORRECT".dimmed(),
        "INCORRECT".dimmed(),
        "UNATTEMPTED".dimmed(),
        "SCORE".dimmed(),
        "ACCURACY".dimmed()
    );
    for section in &b.sections {
        println!(
            "  {:<14} {:>8} {:>10} {:>12} {:>6}/{:<4} {:>9.1}%",
            section.name,
            section.correct.to_string().bright_green(),
            section.incorrect.to_string().bright_red(),
            section.unattempted,
            section.score,
            section.max_score,
            section.accuracy
        );
    }
    println!(
        "  {:<14} {:>8} {:>10} {:>12} {:>6}/{:<4} {:>9.1}%",
        "TOTAL".bold(),
        b.correct.to_string().bright_green().bold(),
        b.incorrect.to_string().bright_red().bold(),
        b.unattempted,
        b.score.to_string().bold(),
        b.max_score,
        b.accuracy
    );
}

#[derive(Default)]
struct SectionAggregate {
    name: String,
    attempts: u32,
    accuracy_sum: f64,
    score_sum: i64,
    max_score: i32,
}

async fn show_stats(pool: &SqlitePool, exam_id: Option<&str>) -> Result<()> {
    let results = match exam_id {
        Some(exam_id) => store::results::list_by_exam(pool, exam_id).await?,
        None => store::results::list(pool).await?,
    };

    if results.is_empty() {
        print_empty_state();
        return Ok(());
    }

    // Aggregate per section id across attempts
    let mut sections: BTreeMap<String, SectionAggregate> = BTreeMap::new();
    for result in &results {
        for section in &result.breakdown.sections {
            let agg = sections.entry(section.section_id.clone()).or_default();
            agg.name = section.name.clone();
            agg.attempts += 1;
            agg.accuracy_sum += section.accuracy;
            agg.score_sum += i64::from(section.score);
            agg.max_score = section.max_score;
        }
    }

    println!(
        "{}",
        format!("Subject performance across {} attempt(s)", results.len()).bold()
    );
    println!();
    println!(
        "  {:<14} {:>9} {:>13} {:>13}",
        "SECTION".dimmed(),
        "ATTEMPTS".dimmed(),
        "AVG SCORE".dimmed(),
        "AVG ACCURACY".dimmed()
    );
    for agg in sections.values() {
        let avg_score = agg.score_sum as f64 / f64::from(agg.attempts);
        let avg_accuracy = agg.accuracy_sum / f64::from(agg.attempts);
        println!(
            "  {:<14} {:>9} {:>8.1}/{:<4} {:>12.1}%",
            agg.name, agg.attempts, avg_score, agg.max_score, avg_accuracy
        );
    }

    Ok(())
}

fn format_duration(secs: u32) -> String {
    let hrs = secs / 3600;
    let mins = (secs % 3600) / 60;
    let rem = secs % 60;
    if hrs > 0 {
        format!("{}h {:02}m {:02}s", hrs, mins, rem)
    } else {
        format!("{}m {:02}s", mins, rem)
    }
}
