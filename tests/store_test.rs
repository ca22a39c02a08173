use std::collections::HashMap;

use chrono::{TimeZone, Utc};

use examsim::bank::Bank;
use examsim::scoring;
use examsim::store::{self, ExamResult};

/// Build a realistic result from the built-in JEE paper with a fixed
/// timestamp so stored rows compare exactly.
fn sample_result(id: &str, exam_id: &str, day: u32) -> ExamResult {
    let bank = Bank::builtin().unwrap();
    let exam = bank.get(exam_id).unwrap();

    let mut answers = HashMap::new();
    let first = &exam.sections[0].questions[0];
    answers.insert(first.id, first.correct_option.clone());

    ExamResult {
        id: id.to_string(),
        exam_id: exam_id.to_string(),
        taken_at: Utc.with_ymd_and_hms(2026, 3, day, 10, 30, 0).unwrap(),
        time_spent_secs: 4200,
        answers: answers.clone(),
        breakdown: scoring::score(exam, &answers),
    }
}

#[tokio::test]
async fn save_and_get_by_id_round_trips() {
    let pool = store::db::connect_memory().await.unwrap();
    let result = sample_result("r-1", "jee-main", 1);

    store::results::save(&pool, &result).await.unwrap();
    let loaded = store::results::get_by_id(&pool, "r-1").await.unwrap().unwrap();

    assert_eq!(loaded, result);
}

#[tokio::test]
async fn empty_store_returns_none_everywhere() {
    let pool = store::db::connect_memory().await.unwrap();

    assert!(store::results::get_by_id(&pool, "missing").await.unwrap().is_none());
    assert!(store::results::get_latest(&pool).await.unwrap().is_none());
    assert!(store::results::list(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn get_latest_picks_newest_timestamp() {
    let pool = store::db::connect_memory().await.unwrap();

    let older = sample_result("r-old", "jee-main", 1);
    let newer = sample_result("r-new", "neet", 15);
    // Insertion order deliberately reversed relative to timestamps
    store::results::save(&pool, &newer).await.unwrap();
    store::results::save(&pool, &older).await.unwrap();

    let latest = store::results::get_latest(&pool).await.unwrap().unwrap();
    assert_eq!(latest.id, "r-new");

    let all = store::results::list(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, "r-new");
    assert_eq!(all[1].id, "r-old");
}

#[tokio::test]
async fn duplicate_ids_are_appended_and_first_insert_wins_lookup() {
    let pool = store::db::connect_memory().await.unwrap();

    let first = sample_result("dup", "jee-main", 1);
    let mut second = sample_result("dup", "jee-main", 2);
    second.time_spent_secs = 9999;

    store::results::save(&pool, &first).await.unwrap();
    store::results::save(&pool, &second).await.unwrap();

    // Append-only: both rows exist, nothing was overwritten
    let all = store::results::list(&pool).await.unwrap();
    assert_eq!(all.len(), 2);

    // Lookup by id deterministically returns the earliest inserted row
    let loaded = store::results::get_by_id(&pool, "dup").await.unwrap().unwrap();
    assert_eq!(loaded.time_spent_secs, first.time_spent_secs);
}

#[tokio::test]
async fn list_by_exam_filters() {
    let pool = store::db::connect_memory().await.unwrap();

    store::results::save(&pool, &sample_result("a", "jee-main", 1)).await.unwrap();
    store::results::save(&pool, &sample_result("b", "neet", 2)).await.unwrap();
    store::results::save(&pool, &sample_result("c", "jee-main", 3)).await.unwrap();

    let jee = store::results::list_by_exam(&pool, "jee-main").await.unwrap();
    assert_eq!(jee.len(), 2);
    assert!(jee.iter().all(|r| r.exam_id == "jee-main"));
    assert_eq!(jee[0].id, "c");

    let none = store::results::list_by_exam(&pool, "upsc").await.unwrap();
    assert!(none.is_empty());
}
