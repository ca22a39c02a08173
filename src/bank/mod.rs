//! Exam definitions: sections, questions, marking schemes.
//!
//! Built-in exams are embedded as TOML and parsed once at startup; additional
//! exams can be loaded from user-supplied files. Definitions are immutable
//! once loaded.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExamOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<ExamOption>,
    pub correct_option: String,
    pub subject: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub id: String,
    pub name: String,
    pub questions: Vec<Question>,
}

/// Points awarded for a correct answer and deducted for an incorrect one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MarkingScheme {
    pub correct: i32,
    pub incorrect: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exam {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub duration_minutes: u32,
    pub marking_scheme: MarkingScheme,
    pub sections: Vec<Section>,
}

impl Exam {
    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    pub fn question(&self, question_id: u32) -> Option<&Question> {
        self.sections
            .iter()
            .flat_map(|s| s.questions.iter())
            .find(|q| q.id == question_id)
    }

    pub fn total_questions(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    pub fn max_score(&self) -> i32 {
        self.total_questions() as i32 * self.marking_scheme.correct
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_minutes * 60
    }

    /// Structural checks applied to every loaded exam definition.
    fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            bail!("Exam '{}' has no sections", self.id);
        }

        let mut section_ids = HashSet::new();
        let mut question_ids = HashSet::new();

        for section in &self.sections {
            if !section_ids.insert(section.id.as_str()) {
                bail!("Exam '{}' has duplicate section id '{}'", self.id, section.id);
            }
            if section.questions.is_empty() {
                bail!("Section '{}' of exam '{}' has no questions", section.id, self.id);
            }

            for question in &section.questions {
                if !question_ids.insert(question.id) {
                    bail!("Exam '{}' has duplicate question id {}", self.id, question.id);
                }
                if question.options.len() < 2 {
                    bail!(
                        "Question {} of exam '{}' has fewer than two options",
                        question.id,
                        self.id
                    );
                }
                if !question.options.iter().any(|o| o.id == question.correct_option) {
                    bail!(
                        "Question {} of exam '{}' marks '{}' correct but has no such option",
                        question.id,
                        self.id,
                        question.correct_option
                    );
                }
            }
        }

        Ok(())
    }
}

/// The collection of available exams.
#[derive(Debug, Clone)]
pub struct Bank {
    exams: Vec<Exam>,
}

impl Bank {
    /// The sample exams shipped with the binary.
    pub fn builtin() -> Result<Self> {
        let sources = [
            ("jee-main", include_str!("data/jee_main.toml")),
            ("neet", include_str!("data/neet.toml")),
            ("eamcet-ap", include_str!("data/eamcet_ap.toml")),
        ];

        let mut exams = Vec::with_capacity(sources.len());
        for (name, source) in sources {
            let exam = parse_exam(source)
                .with_context(|| format!("Failed to load built-in exam '{}'", name))?;
            exams.push(exam);
        }

        Ok(Self { exams })
    }

    /// Add an exam definition from a user-supplied TOML file.
    pub fn load_file(&mut self, path: &Path) -> Result<&Exam> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read exam file: {}", path.display()))?;
        let exam = parse_exam(&content)
            .with_context(|| format!("Failed to parse exam file: {}", path.display()))?;

        if self.exams.iter().any(|e| e.id == exam.id) {
            bail!("An exam with id '{}' is already loaded", exam.id);
        }

        log::info!("Loaded exam '{}' from {}", exam.id, path.display());
        self.exams.push(exam);
        Ok(self.exams.last().unwrap())
    }

    pub fn get(&self, exam_id: &str) -> Option<&Exam> {
        self.exams.iter().find(|e| e.id == exam_id)
    }

    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }
}

fn parse_exam(source: &str) -> Result<Exam> {
    let exam: Exam = toml::from_str(source).context("Invalid exam definition")?;
    exam.validate()?;
    Ok(exam)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_exams_load() {
        let bank = Bank::builtin().unwrap();
        assert!(bank.get("jee-main").is_some());
        assert!(bank.get("neet").is_some());
        assert!(bank.get("eamcet-ap").is_some());
        assert!(bank.get("upsc").is_none());
    }

    #[test]
    fn jee_main_shape() {
        let bank = Bank::builtin().unwrap();
        let exam = bank.get("jee-main").unwrap();
        assert_eq!(exam.sections.len(), 3);
        assert_eq!(exam.marking_scheme.correct, 4);
        assert_eq!(exam.marking_scheme.incorrect, 1);
        assert_eq!(exam.max_score(), exam.total_questions() as i32 * 4);
        // Every correct option must resolve to a real option
        for section in &exam.sections {
            for question in &section.questions {
                assert!(question.options.iter().any(|o| o.id == question.correct_option));
            }
        }
    }

    #[test]
    fn question_lookup_spans_sections() {
        let bank = Bank::builtin().unwrap();
        let exam = bank.get("jee-main").unwrap();
        let first = exam.sections[0].questions[0].id;
        let last = exam.sections.last().unwrap().questions.last().unwrap().id;
        assert!(exam.question(first).is_some());
        assert!(exam.question(last).is_some());
        assert!(exam.question(9999).is_none());
    }

    #[test]
    fn rejects_bad_correct_option() {
        let source = r#"
            id = "bad"
            name = "Bad"
            full_name = "Bad Exam"
            description = "broken"
            duration_minutes = 10

            [marking_scheme]
            correct = 1
            incorrect = 0

            [[sections]]
            id = "s1"
            name = "Section 1"

            [[sections.questions]]
            id = 1
            prompt = "?"
            subject = "S"
            correct_option = "z"
            options = [
                { id = "a", text = "A" },
                { id = "b", text = "B" },
            ]
        "#;
        assert!(parse_exam(source).is_err());
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let source = r#"
            id = "dup"
            name = "Dup"
            full_name = "Dup Exam"
            description = "broken"
            duration_minutes = 10

            [marking_scheme]
            correct = 1
            incorrect = 0

            [[sections]]
            id = "s1"
            name = "Section 1"

            [[sections.questions]]
            id = 1
            prompt = "?"
            subject = "S"
            correct_option = "a"
            options = [
                { id = "a", text = "A" },
                { id = "b", text = "B" },
            ]

            [[sections.questions]]
            id = 1
            prompt = "again"
            subject = "S"
            correct_option = "b"
            options = [
                { id = "a", text = "A" },
                { id = "b", text = "B" },
            ]
        "#;
        assert!(parse_exam(source).is_err());
    }
}
