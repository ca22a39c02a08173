//! Exam catalogue commands

use anyhow::Result;
use colored::*;

use examsim::bank::Bank;

pub fn list_command(bank: &Bank) -> Result<()> {
    println!("{}", "Available exams:".bold());
    println!();
    println!(
        "  {:<12} {:<12} {:>10} {:>10}  {}",
        "ID".dimmed(),
        "NAME".dimmed(),
        "QUESTIONS".dimmed(),
        "DURATION".dimmed(),
        "MARKING".dimmed()
    );

    for exam in bank.exams() {
        let scheme = format!(
            "+{} / -{}",
            exam.marking_scheme.correct, exam.marking_scheme.incorrect
        );
        println!(
            "  {:<12} {:<12} {:>10} {:>9}m  {}",
            exam.id.bright_cyan(),
            exam.name,
            exam.total_questions(),
            exam.duration_minutes,
            scheme
        );
    }

    println!();
    println!("  {}", "Run 'examsim take <id>' to start an attempt.".dimmed());
    Ok(())
}

pub fn info_command(bank: &Bank, exam_id: &str) -> Result<()> {
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

    println!("{}", exam.full_name.bold());
    println!("{}", exam.description.dimmed());
    println!();
    println!("  Duration:       {} minutes", exam.duration_minutes);
    println!(
        "  Marking scheme: {} for a correct answer, {} for an incorrect one",
        format!("+{}", exam.marking_scheme.correct).bright_green(),
        format!("-{}", exam.marking_scheme.incorrect).bright_red()
    );
    println!("  Maximum score:  {}", exam.max_score());
    println!();
    println!("  Sections:");
    for section in &exam.sections {
        println!(
            "    {:<14} {} questions",
            section.name.bright_cyan(),
            section.questions.len()
        );
    }

    Ok(())
}
