// src/services/time_tracker.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::store::{StoreError, StudyTimeStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrackingSession {
    /// Stored total when the session began.
    baseline_seconds: u64,
    started_at: DateTime<Utc>,
}

impl TrackingSession {
    fn total_at(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = (now - self.started_at).num_seconds().max(0) as u64;
        self.baseline_seconds + elapsed
    }
}

/// Per-user entry of the session map. `Opening` holds the slot while the
/// store records the new session, so a concurrent `start` sees it as taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionSlot {
    Opening,
    Active(TrackingSession),
}

impl SessionSlot {
    fn active(&self) -> Option<&TrackingSession> {
        match self {
            SessionSlot::Opening => None,
            SessionSlot::Active(session) => Some(session),
        }
    }
}

/// Accumulates study time for users with an open session and periodically
/// writes the running totals back to the store.
///
/// At most one session exists per user. Flushes overwrite the stored total;
/// when the same user is tracked by more than one server, the last flush wins.
pub struct StudyTimeTracker {
    store: Arc<dyn StudyTimeStore>,
    sessions: Mutex<HashMap<String, SessionSlot>>,
}

impl StudyTimeTracker {
    pub fn new(store: Arc<dyn StudyTimeStore>) -> Self {
        Self {
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SessionSlot>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_tracking(&self, user_id: &str) -> bool {
        self.sessions()
            .get(user_id)
            .is_some_and(|slot| slot.active().is_some())
    }

    /// Opens a session for `user_id`. Returns `false` when one is already open
    /// or being opened.
    pub async fn start(&self, user_id: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
        {
            let mut sessions = self.sessions();
            if sessions.contains_key(user_id) {
                return Ok(false);
            }
            sessions.insert(user_id.to_string(), SessionSlot::Opening);
        }

        let stats = match self.store.begin_session(user_id, now).await {
            Ok(stats) => stats,
            Err(e) => {
                let mut sessions = self.sessions();
                if sessions.get(user_id) == Some(&SessionSlot::Opening) {
                    sessions.remove(user_id);
                }
                return Err(e);
            }
        };

        let mut sessions = self.sessions();
        match sessions.get_mut(user_id) {
            Some(slot) if *slot == SessionSlot::Opening => {
                *slot = SessionSlot::Active(TrackingSession {
                    baseline_seconds: stats.total_seconds,
                    started_at: now,
                });
            }
            // Stopped while the store was recording the session.
            _ => return Ok(false),
        }
        tracing::debug!(user_id, baseline = stats.total_seconds, "Study session started");
        Ok(true)
    }

    /// Closes the session of `user_id` after a final flush. Returns the
    /// flushed total, or `None` when no session was open.
    pub async fn stop(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<u64>, StoreError> {
        let Some(SessionSlot::Active(session)) = self.sessions().remove(user_id) else {
            return Ok(None);
        };

        let total = session.total_at(now);
        self.store.save_study_time(user_id, total, now).await?;
        tracing::debug!(user_id, total, "Study session stopped");
        Ok(Some(total))
    }

    /// Running total of an open session.
    pub fn current_total(&self, user_id: &str, now: DateTime<Utc>) -> Option<u64> {
        self.sessions()
            .get(user_id)
            .and_then(SessionSlot::active)
            .map(|s| s.total_at(now))
    }

    /// Writes the running total of every open session. Failures are logged
    /// and do not stop the remaining writes. Returns how many were saved.
    pub async fn flush(&self, now: DateTime<Utc>) -> usize {
        let snapshot: Vec<(String, u64)> = self
            .sessions()
            .iter()
            .filter_map(|(user_id, slot)| {
                slot.active()
                    .map(|session| (user_id.clone(), session.total_at(now)))
            })
            .collect();

        let mut saved = 0;
        for (user_id, total) in snapshot {
            match self.store.save_study_time(&user_id, total, now).await {
                Ok(()) => saved += 1,
                Err(e) => tracing::error!("Failed to flush study time for {}: {:?}", user_id, e),
            }
        }
        saved
    }

    /// Flushes every `period` until the runtime shuts down.
    pub fn spawn_flush_loop(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let saved = self.flush(Utc::now()).await;
                if saved > 0 {
                    tracing::debug!(saved, "Flushed study time");
                }
            }
        })
    }
}
