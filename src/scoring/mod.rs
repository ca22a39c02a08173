//! Converts a finished answers map into a per-section and aggregate score
//! breakdown. Pure and deterministic: the same (exam, answers) input always
//! produces the same breakdown, and recomputing is idempotent.
//!
//! Review flags never reach this module; a flagged question scores exactly
//! like an unflagged one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bank::Exam;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionScore {
    pub section_id: String,
    pub name: String,
    pub correct: u32,
    pub incorrect: u32,
    pub unattempted: u32,
    pub score: i32,
    pub max_score: i32,
    /// Percentage of attempted questions answered correctly; 0.0 when the
    /// section has no attempted questions at all.
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub sections: Vec<SectionScore>,
    pub correct: u32,
    pub incorrect: u32,
    pub unattempted: u32,
    pub score: i32,
    pub max_score: i32,
    pub accuracy: f64,
}

impl ScoreBreakdown {
    pub fn total_questions(&self) -> u32 {
        self.correct + self.incorrect + self.unattempted
    }
}

/// Score an answers map against an exam's marking scheme.
///
/// Per question: no entry (or an empty entry) counts as unattempted, a match
/// against the correct option earns `scheme.correct`, anything else loses
/// `scheme.incorrect`. Section scores may go negative under negative marking.
/// Answer keys that match no question in the exam are ignored.
pub fn score(exam: &Exam, answers: &HashMap<u32, String>) -> ScoreBreakdown {
    let scheme = exam.marking_scheme;
    let mut sections = Vec::with_capacity(exam.sections.len());

    let mut total_correct = 0u32;
    let mut total_incorrect = 0u32;
    let mut total_unattempted = 0u32;
    let mut total_score = 0i32;
    let mut total_max = 0i32;

    for section in &exam.sections {
        let mut correct = 0u32;
        let mut incorrect = 0u32;
        let mut unattempted = 0u32;
        let mut section_score = 0i32;
        let max_score = section.questions.len() as i32 * scheme.correct;

        for question in &section.questions {
            match answers.get(&question.id).map(String::as_str) {
                None | Some("") => unattempted += 1,
                Some(selected) if selected == question.correct_option => {
                    correct += 1;
                    section_score += scheme.correct;
                }
                Some(_) => {
                    incorrect += 1;
                    section_score -= scheme.incorrect;
                }
            }
        }

        total_correct += correct;
        total_incorrect += incorrect;
        total_unattempted += unattempted;
        total_score += section_score;
        total_max += max_score;

        sections.push(SectionScore {
            section_id: section.id.clone(),
            name: section.name.clone(),
            correct,
            incorrect,
            unattempted,
            score: section_score,
            max_score,
            accuracy: accuracy(correct, incorrect),
        });
    }

    ScoreBreakdown {
        sections,
        correct: total_correct,
        incorrect: total_incorrect,
        unattempted: total_unattempted,
        score: total_score,
        max_score: total_max,
        accuracy: accuracy(total_correct, total_incorrect),
    }
}

/// Guard against the 0/0 case: accuracy is defined as 0 when nothing was
/// attempted, never NaN.
fn accuracy(correct: u32, incorrect: u32) -> f64 {
    let attempted = correct + incorrect;
    if attempted == 0 {
        0.0
    } else {
        f64::from(correct) / f64::from(attempted) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{ExamOption, MarkingScheme, Question, Section};

    fn question(id: u32, subject: &str, correct: &str) -> Question {
        Question {
            id,
            prompt: format!("question {}", id),
            options: ["a", "b", "c", "d"]
                .iter()
                .map(|o| ExamOption {
                    id: o.to_string(),
                    text: format!("option {}", o),
                })
                .collect(),
            correct_option: correct.to_string(),
            subject: subject.to_string(),
            image: None,
            explanation: None,
        }
    }

    /// Two sections of two questions each, marking scheme {4, 1}.
    fn two_by_two_exam() -> Exam {
        Exam {
            id: "sample".to_string(),
            name: "Sample".to_string(),
            full_name: "Sample Exam".to_string(),
            description: String::new(),
            duration_minutes: 60,
            marking_scheme: MarkingScheme {
                correct: 4,
                incorrect: 1,
            },
            sections: vec![
                Section {
                    id: "physics".to_string(),
                    name: "Physics".to_string(),
                    questions: vec![question(1, "Physics", "a"), question(2, "Physics", "b")],
                },
                Section {
                    id: "chemistry".to_string(),
                    name: "Chemistry".to_string(),
                    questions: vec![question(3, "Chemistry", "c"), question(4, "Chemistry", "d")],
                },
            ],
        }
    }

    fn answers(entries: &[(u32, &str)]) -> HashMap<u32, String> {
        entries
            .iter()
            .map(|(id, opt)| (*id, opt.to_string()))
            .collect()
    }

    #[test]
    fn mixed_answers_scenario() {
        // Q1 correct, Q2 wrong, Q3 unanswered, Q4 correct
        let exam = two_by_two_exam();
        let breakdown = score(&exam, &answers(&[(1, "a"), (2, "d"), (4, "d")]));

        assert_eq!(breakdown.correct, 2);
        assert_eq!(breakdown.incorrect, 1);
        assert_eq!(breakdown.unattempted, 1);
        assert_eq!(breakdown.score, 4 - 1 + 0 + 4);
        assert_eq!(breakdown.max_score, 16);
    }

    #[test]
    fn all_correct_reaches_max_score() {
        let exam = two_by_two_exam();
        let breakdown = score(&exam, &answers(&[(1, "a"), (2, "b"), (3, "c"), (4, "d")]));

        assert_eq!(breakdown.correct, 4);
        assert_eq!(breakdown.score, breakdown.max_score);
        assert_eq!(breakdown.accuracy, 100.0);
    }

    #[test]
    fn counts_sum_to_question_totals() {
        let exam = two_by_two_exam();
        for case in [
            answers(&[]),
            answers(&[(1, "a")]),
            answers(&[(1, "b"), (2, "b"), (3, "c"), (4, "a")]),
        ] {
            let breakdown = score(&exam, &case);
            for section in &breakdown.sections {
                assert_eq!(section.correct + section.incorrect + section.unattempted, 2);
            }
            assert_eq!(breakdown.total_questions(), 4);
        }
    }

    #[test]
    fn empty_answers_are_all_unattempted_with_zero_accuracy() {
        let exam = two_by_two_exam();
        let breakdown = score(&exam, &HashMap::new());

        assert_eq!(breakdown.unattempted, 4);
        assert_eq!(breakdown.score, 0);
        assert_eq!(breakdown.accuracy, 0.0);
        for section in &breakdown.sections {
            assert_eq!(section.accuracy, 0.0);
            assert!(section.accuracy.is_finite());
        }
    }

    #[test]
    fn empty_string_answer_counts_as_unattempted() {
        let exam = two_by_two_exam();
        let breakdown = score(&exam, &answers(&[(1, "")]));
        assert_eq!(breakdown.unattempted, 4);
        assert_eq!(breakdown.incorrect, 0);
    }

    #[test]
    fn section_score_can_go_negative() {
        let exam = two_by_two_exam();
        let breakdown = score(&exam, &answers(&[(1, "b"), (2, "a")]));
        assert_eq!(breakdown.sections[0].score, -2);
        assert_eq!(breakdown.score, -2);
    }

    #[test]
    fn unknown_answer_keys_are_ignored() {
        let exam = two_by_two_exam();
        let breakdown = score(&exam, &answers(&[(99, "a")]));
        assert_eq!(breakdown.total_questions(), 4);
        assert_eq!(breakdown.unattempted, 4);
        assert_eq!(breakdown.correct, 0);
    }

    #[test]
    fn scoring_is_deterministic_and_idempotent() {
        let exam = two_by_two_exam();
        let case = answers(&[(1, "a"), (2, "d"), (3, "c")]);
        let first = score(&exam, &case);
        let second = score(&exam, &case);
        assert_eq!(first, second);
    }

    #[test]
    fn accuracy_per_section() {
        let exam = two_by_two_exam();
        // physics: 1 correct of 2 attempted; chemistry untouched
        let breakdown = score(&exam, &answers(&[(1, "a"), (2, "c")]));
        assert_eq!(breakdown.sections[0].accuracy, 50.0);
        assert_eq!(breakdown.sections[1].accuracy, 0.0);
    }
}
