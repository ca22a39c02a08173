//! Append-only persistence for completed attempts, backed by SQLite.

pub mod db;
pub mod migrations;
pub mod results;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoreBreakdown;

/// A completed attempt. Created exactly once at submission and never mutated
/// afterwards; the store keeps every row it is given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExamResult {
    pub id: String,
    pub exam_id: String,
    pub taken_at: DateTime<Utc>,
    pub time_spent_secs: u32,
    pub answers: HashMap<u32, String>,
    pub breakdown: ScoreBreakdown,
}
