// src/services/study_time.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Lower bound, in seconds, of each study level.
const LEVEL_THRESHOLDS: [u64; 7] = [0, HOUR, 2 * HOUR, 4 * HOUR, 8 * HOUR, 16 * HOUR, 32 * HOUR];

const LEVEL_NAMES: [&str; 7] = [
    "Beginner",
    "Student",
    "Dedicated",
    "Committed",
    "Advanced",
    "Expert",
    "Master",
];

/// Compact human-readable duration: `45s`, `12m`, `2h 5m`, `3h`, `1d 4h`, `2d`.
pub fn format_duration(seconds: u64) -> String {
    if seconds < MINUTE {
        return format!("{seconds}s");
    }
    if seconds < HOUR {
        return format!("{}m", seconds / MINUTE);
    }
    if seconds < DAY {
        let hours = seconds / HOUR;
        let minutes = (seconds % HOUR) / MINUTE;
        return if minutes > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{hours}h")
        };
    }
    let days = seconds / DAY;
    let hours = (seconds % DAY) / HOUR;
    if hours > 0 {
        format!("{days}d {hours}h")
    } else {
        format!("{days}d")
    }
}

/// Position on the study-time ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyLevel {
    /// 1-based level number.
    pub level: u8,
    pub name: &'static str,
    /// Total needed for the next level, `None` at the top.
    pub next_level_seconds: Option<u64>,
    /// Percent of the way from this level to the next, 100 at the top.
    pub progress: u32,
}

impl StudyLevel {
    pub fn for_seconds(total_seconds: u64) -> Self {
        let level = LEVEL_THRESHOLDS
            .iter()
            .position(|&threshold| total_seconds < threshold)
            .unwrap_or(LEVEL_THRESHOLDS.len());

        let name = LEVEL_NAMES[level - 1];
        if level == LEVEL_THRESHOLDS.len() {
            return Self {
                level: level as u8,
                name,
                next_level_seconds: None,
                progress: 100,
            };
        }

        let floor = LEVEL_THRESHOLDS[level - 1];
        let next = LEVEL_THRESHOLDS[level];
        let progress = ((total_seconds - floor) as f64 / (next - floor) as f64 * 100.0).round();

        Self {
            level: level as u8,
            name,
            next_level_seconds: Some(next),
            progress: progress as u32,
        }
    }
}

pub fn average_session_seconds(total_seconds: u64, sessions_count: u64) -> u64 {
    if sessions_count == 0 {
        0
    } else {
        total_seconds / sessions_count
    }
}

/// Whole days since `started_at`, rounded up.
pub fn days_since_start(started_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed = (now - started_at).num_seconds().max(0);
    let day = DAY as i64;
    (elapsed + day - 1) / day
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn durations_use_the_largest_units() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(12 * 60 + 30), "12m");
        assert_eq!(format_duration(2 * 3600 + 5 * 60), "2h 5m");
        assert_eq!(format_duration(3 * 3600), "3h");
        assert_eq!(format_duration(28 * 3600), "1d 4h");
        assert_eq!(format_duration(2 * 86_400 + 59), "2d");
    }

    #[test]
    fn level_ladder() {
        let beginner = StudyLevel::for_seconds(0);
        assert_eq!(beginner.level, 1);
        assert_eq!(beginner.name, "Beginner");
        assert_eq!(beginner.progress, 0);
        assert_eq!(beginner.next_level_seconds, Some(3600));

        let student = StudyLevel::for_seconds(5400);
        assert_eq!(student.name, "Student");
        assert_eq!(student.progress, 50);

        let committed = StudyLevel::for_seconds(4 * 3600);
        assert_eq!(committed.name, "Committed");
        assert_eq!(committed.progress, 0);

        let master = StudyLevel::for_seconds(40 * 3600);
        assert_eq!(master.level, 7);
        assert_eq!(master.name, "Master");
        assert_eq!(master.progress, 100);
        assert_eq!(master.next_level_seconds, None);
    }

    #[test]
    fn average_session_handles_zero_sessions() {
        assert_eq!(average_session_seconds(600, 0), 0);
        assert_eq!(average_session_seconds(600, 4), 150);
    }

    #[test]
    fn days_since_start_rounds_up() {
        let start = Utc::now();
        assert_eq!(days_since_start(start, start), 0);
        assert_eq!(days_since_start(start, start + Duration::hours(1)), 1);
        assert_eq!(days_since_start(start, start + Duration::hours(49)), 3);
    }
}
