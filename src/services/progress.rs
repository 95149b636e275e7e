// src/services/progress.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::attempt::Attempt;
use crate::models::test::compare_test_ids;

/// How many distinct tests a user has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

pub fn summarize(attempts: &[Attempt], total_tests: usize) -> ProgressSummary {
    let completed = attempts
        .iter()
        .map(|a| a.test_id.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let percentage = if total_tests == 0 {
        0
    } else {
        (completed as f64 / total_tests as f64 * 100.0).round() as u32
    };

    ProgressSummary {
        completed,
        total: total_tests,
        percentage,
    }
}

/// Attempt count and latest result of one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSummary {
    pub test_id: String,
    pub attempts: u32,
    pub last_correct: u32,
    pub last_total: u32,
    pub last_submitted_at: DateTime<Utc>,
}

/// One summary per test id, ordered by numeric test id. The latest result is
/// the attempt with the newest submission time; on equal times the one later
/// in `attempts` wins.
pub fn summarize_tests(attempts: &[Attempt]) -> Vec<TestSummary> {
    let mut by_test: BTreeMap<&str, TestSummary> = BTreeMap::new();

    for attempt in attempts {
        let summary = by_test
            .entry(attempt.test_id.as_str())
            .or_insert_with(|| TestSummary {
                test_id: attempt.test_id.clone(),
                attempts: 0,
                last_correct: attempt.correct,
                last_total: attempt.total,
                last_submitted_at: attempt.submitted_at,
            });

        summary.attempts += 1;
        if attempt.submitted_at >= summary.last_submitted_at {
            summary.last_correct = attempt.correct;
            summary.last_total = attempt.total;
            summary.last_submitted_at = attempt.submitted_at;
        }
    }

    let mut summaries: Vec<TestSummary> = by_test.into_values().collect();
    summaries.sort_by(|a, b| compare_test_ids(&a.test_id, &b.test_id));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn attempt(test_id: &str, correct: u32, at: DateTime<Utc>) -> Attempt {
        Attempt {
            id: 0,
            user_id: "u1".to_string(),
            test_id: test_id.to_string(),
            answers: Default::default(),
            correct,
            incorrect: 10 - correct,
            total: 10,
            elapsed_seconds: 60,
            submitted_at: at,
            failed: Vec::new(),
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn completion_counts_distinct_tests() {
        let t = base();
        let attempts = vec![attempt("A", 5, t), attempt("A", 6, t), attempt("B", 7, t)];
        let summary = summarize(&attempts, 4);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.percentage, 50);
    }

    #[test]
    fn no_tests_means_zero_percent() {
        let summary = summarize(&[attempt("A", 5, base())], 0);
        assert_eq!(summary.percentage, 0);
        assert_eq!(summary.completed, 1);
    }

    #[test]
    fn percentage_is_rounded() {
        let t = base();
        let attempts = vec![attempt("A", 5, t), attempt("B", 5, t)];
        assert_eq!(summarize(&attempts, 3).percentage, 67);
    }

    #[test]
    fn latest_attempt_wins_regardless_of_order() {
        let t = base();
        let attempts = vec![
            attempt("735", 9, t + Duration::minutes(5)),
            attempt("735", 3, t),
            attempt("41", 4, t),
        ];
        let summaries = summarize_tests(&attempts);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].test_id, "41");
        assert_eq!(summaries[1].test_id, "735");
        assert_eq!(summaries[1].attempts, 2);
        assert_eq!(summaries[1].last_correct, 9);
    }

    #[test]
    fn equal_timestamps_keep_later_entry() {
        let t = base();
        let attempts = vec![attempt("A", 2, t), attempt("A", 8, t)];
        assert_eq!(summarize_tests(&attempts)[0].last_correct, 8);
    }
}
