//! The attempt engine: per-session exam state and the countdown that drives
//! auto-submission. One engine instance per attempt, parameterized by the exam
//! definition; the presentation layer only issues navigation/answer calls and
//! 1 Hz timer ticks.

pub mod attempt;
pub mod timer;

pub use attempt::{AttemptState, QuestionStatus};
pub use timer::{Countdown, TimerEvent};
