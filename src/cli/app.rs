use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "examsim")]
#[command(about = "A terminal simulator for competitive multiple-choice exams")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available exams
    List,
    /// Show exam details and section layout
    Info {
        /// Exam id (see `examsim list`)
        exam_id: String,
    },
    /// Take a timed attempt in the full-screen interface
    Take {
        /// Exam id (see `examsim list`)
        exam_id: String,
        /// Load an additional exam definition from a TOML file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Browse stored attempt results
    Results(ResultsCommands),
}

#[derive(Args)]
pub struct ResultsCommands {
    #[command(subcommand)]
    pub command: ResultsSubcommands,
}

#[derive(Subcommand)]
pub enum ResultsSubcommands {
    /// List stored attempts, newest first
    List {
        /// Only show attempts for this exam
        #[arg(short, long)]
        exam: Option<String>,
    },
    /// Show the full breakdown of one attempt
    Show {
        /// Result id
        id: String,
    },
    /// Show the most recent attempt
    Latest,
    /// Per-subject aggregates across stored attempts
    Stats {
        /// Only include attempts for this exam
        #[arg(short, long)]
        exam: Option<String>,
    },
}
