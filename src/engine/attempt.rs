//! Mutable state of one open exam attempt: recorded answers, flags, visited
//! questions, and the (section, index) cursor, plus the submit latch that
//! guarantees at most one result per attempt.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use uuid::Uuid;

use crate::bank::{Exam, Question, Section};
use crate::scoring;
use crate::store::ExamResult;

/// Palette status of a single question, for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Answered,
    Flagged,
    Visited,
    NotVisited,
}

pub struct AttemptState {
    exam: Exam,
    answers: HashMap<u32, String>,
    flagged: HashSet<u32>,
    visited: HashSet<u32>,
    section_idx: usize,
    question_idx: usize,
    remaining_secs: u32,
    submitted: bool,
}

impl AttemptState {
    /// Opens an attempt positioned on the first question of the first section.
    /// That question counts as visited immediately.
    pub fn new(exam: Exam) -> Self {
        let remaining_secs = exam.duration_secs();
        let mut state = Self {
            exam,
            answers: HashMap::new(),
            flagged: HashSet::new(),
            visited: HashSet::new(),
            section_idx: 0,
            question_idx: 0,
            remaining_secs,
            submitted: false,
        };
        state.mark_current_visited();
        state
    }

    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    pub fn current_section(&self) -> &Section {
        &self.exam.sections[self.section_idx]
    }

    pub fn current_question(&self) -> &Question {
        &self.current_section().questions[self.question_idx]
    }

    pub fn position(&self) -> (usize, usize) {
        (self.section_idx, self.question_idx)
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Updated once per second from the countdown while the attempt is open.
    pub fn set_remaining_secs(&mut self, secs: u32) {
        self.remaining_secs = secs;
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn answer_for(&self, question_id: u32) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    pub fn is_flagged(&self, question_id: u32) -> bool {
        self.flagged.contains(&question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Records or overwrites the answer for a question and marks it visited.
    /// Correctness is not checked here; that happens only at scoring time.
    pub fn select_answer(&mut self, question_id: u32, option_id: &str) {
        if self.submitted {
            return;
        }
        self.answers.insert(question_id, option_id.to_string());
        self.visited.insert(question_id);
    }

    /// No-op when the question has no recorded answer.
    pub fn clear_answer(&mut self, question_id: u32) {
        if self.submitted {
            return;
        }
        self.answers.remove(&question_id);
    }

    /// Flags are independent of answering and never affect scoring.
    pub fn toggle_flag(&mut self, question_id: u32) {
        if self.submitted {
            return;
        }
        if !self.flagged.remove(&question_id) {
            self.flagged.insert(question_id);
        }
    }

    /// Jump to a question by section id and index. Unknown sections and
    /// out-of-range indices are ignored without any state change.
    pub fn goto(&mut self, section_id: &str, index: usize) {
        if self.submitted {
            return;
        }
        let Some(section_idx) = self.exam.sections.iter().position(|s| s.id == section_id) else {
            return;
        };
        if index >= self.exam.sections[section_idx].questions.len() {
            return;
        }
        self.section_idx = section_idx;
        self.question_idx = index;
        self.mark_current_visited();
    }

    /// Advance to the next question, rolling into the next section past a
    /// section's last question. No-op on the very last question of the exam.
    pub fn next(&mut self) {
        if self.submitted {
            return;
        }
        if self.question_idx + 1 < self.current_section().questions.len() {
            self.question_idx += 1;
        } else if self.section_idx + 1 < self.exam.sections.len() {
            self.section_idx += 1;
            self.question_idx = 0;
        } else {
            return;
        }
        self.mark_current_visited();
    }

    /// Step back to the previous question, rolling into the previous section
    /// at its last index. No-op on the very first question of the exam.
    pub fn prev(&mut self) {
        if self.submitted {
            return;
        }
        if self.question_idx > 0 {
            self.question_idx -= 1;
        } else if self.section_idx > 0 {
            self.section_idx -= 1;
            self.question_idx = self.exam.sections[self.section_idx].questions.len() - 1;
        } else {
            return;
        }
        self.mark_current_visited();
    }

    /// Switch to a section by position in the exam, landing on its first
    /// question. Used by the section tabs.
    pub fn goto_section(&mut self, section_idx: usize) {
        if self.submitted || section_idx >= self.exam.sections.len() {
            return;
        }
        self.section_idx = section_idx;
        self.question_idx = 0;
        self.mark_current_visited();
    }

    pub fn status(&self, question_id: u32) -> QuestionStatus {
        if self.flagged.contains(&question_id) {
            QuestionStatus::Flagged
        } else if self.answers.contains_key(&question_id) {
            QuestionStatus::Answered
        } else if self.visited.contains(&question_id) {
            QuestionStatus::Visited
        } else {
            QuestionStatus::NotVisited
        }
    }

    /// Consumes the submit latch. The first call (manual or timer-driven)
    /// produces the result; every later call returns `None`, which is the
    /// structural guard against a double submission.
    pub fn submit(&mut self) -> Option<ExamResult> {
        if self.submitted {
            log::warn!("Ignoring repeated submission for exam '{}'", self.exam.id);
            return None;
        }
        self.submitted = true;

        let breakdown = scoring::score(&self.exam, &self.answers);
        let time_spent_secs = self.exam.duration_secs().saturating_sub(self.remaining_secs);

        log::info!(
            "Attempt for exam '{}' submitted: {}/{} after {}s",
            self.exam.id,
            breakdown.score,
            breakdown.max_score,
            time_spent_secs
        );

        Some(ExamResult {
            id: Uuid::new_v4().to_string(),
            exam_id: self.exam.id.clone(),
            taken_at: Utc::now(),
            time_spent_secs,
            answers: self.answers.clone(),
            breakdown,
        })
    }

    fn mark_current_visited(&mut self) {
        let id = self.current_question().id;
        self.visited.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Bank;

    fn jee_attempt() -> AttemptState {
        let bank = Bank::builtin().unwrap();
        AttemptState::new(bank.get("jee-main").unwrap().clone())
    }

    #[test]
    fn starts_at_first_question_of_first_section() {
        let state = jee_attempt();
        assert_eq!(state.position(), (0, 0));
        let first_id = state.current_question().id;
        assert_eq!(state.status(first_id), QuestionStatus::Visited);
    }

    #[test]
    fn goto_within_bounds_moves_and_marks_visited() {
        let mut state = jee_attempt();
        state.goto("chemistry", 2);
        assert_eq!(state.position(), (1, 2));
        let id = state.current_question().id;
        assert_eq!(state.status(id), QuestionStatus::Visited);
    }

    #[test]
    fn goto_out_of_range_is_a_silent_noop() {
        let mut state = jee_attempt();
        state.goto("physics", 999);
        assert_eq!(state.position(), (0, 0));
        state.goto("botany", 0);
        assert_eq!(state.position(), (0, 0));
    }

    #[test]
    fn next_rolls_over_section_boundary() {
        let mut state = jee_attempt();
        let physics_len = state.exam().sections[0].questions.len();
        for _ in 0..physics_len {
            state.next();
        }
        // One step past the last physics question lands in chemistry
        assert_eq!(state.position(), (1, 0));
    }

    #[test]
    fn prev_rolls_back_to_previous_section_last_index() {
        let mut state = jee_attempt();
        state.goto("chemistry", 0);
        state.prev();
        let physics_len = state.exam().sections[0].questions.len();
        assert_eq!(state.position(), (0, physics_len - 1));
    }

    #[test]
    fn no_wraparound_at_exam_extremes() {
        let mut state = jee_attempt();
        state.prev();
        assert_eq!(state.position(), (0, 0));

        let last_section = state.exam().sections.len() - 1;
        let last_idx = state.exam().sections[last_section].questions.len() - 1;
        let section_id = state.exam().sections[last_section].id.clone();
        state.goto(&section_id, last_idx);
        state.next();
        assert_eq!(state.position(), (last_section, last_idx));
    }

    #[test]
    fn select_overwrite_and_clear_answer() {
        let mut state = jee_attempt();
        state.select_answer(1, "a");
        assert_eq!(state.answer_for(1), Some("a"));
        state.select_answer(1, "c");
        assert_eq!(state.answer_for(1), Some("c"));

        state.clear_answer(1);
        assert_eq!(state.answer_for(1), None);
        // Clearing an unanswered question does nothing
        state.clear_answer(1);
        assert_eq!(state.answer_for(1), None);
    }

    #[test]
    fn flag_toggles_independently_of_answers() {
        let mut state = jee_attempt();
        state.toggle_flag(2);
        assert!(state.is_flagged(2));
        assert_eq!(state.status(2), QuestionStatus::Flagged);
        state.toggle_flag(2);
        assert!(!state.is_flagged(2));
    }

    #[test]
    fn submit_latch_refuses_second_submission() {
        let mut state = jee_attempt();
        state.select_answer(1, "c");
        let first = state.submit();
        assert!(first.is_some());
        assert!(state.is_submitted());
        assert!(state.submit().is_none());

        // State is frozen after submission
        state.select_answer(2, "a");
        assert_eq!(state.answer_for(2), None);
        state.next();
        assert_eq!(state.position(), (0, 0));
    }

    #[test]
    fn submitted_result_reflects_time_spent() {
        let mut state = jee_attempt();
        let total = state.exam().duration_secs();
        state.set_remaining_secs(total - 125);
        let result = state.submit().unwrap();
        assert_eq!(result.time_spent_secs, 125);
        assert_eq!(result.exam_id, "jee-main");
    }
}
