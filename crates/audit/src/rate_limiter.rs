//! RateLimiter - per-user sliding window admission control
//!
//! One timestamp window per user, pruned to the trailing window duration.
//! Admission is a single atomic check-and-record: the count is inspected
//! and the new timestamp appended under the same per-user lock, so two
//! concurrent requests can never both slip under the limit. Windows for
//! different users never contend.
//!
//! Timestamps use `tokio::time::Instant`, so tests drive the window with
//! a paused runtime clock.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;

/// Sliding window duration
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Idle entries are swept once per this many acquisitions
const SWEEP_EVERY: u64 = 256;

/// Outcome of an admission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Under the limit; the request has been recorded
    Admitted,
    /// Over the limit; nothing was recorded
    Limited { count: usize, limit: usize },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

#[derive(Debug)]
struct UserWindow {
    hits: VecDeque<Instant>,
    last_seen: Instant,
}

impl UserWindow {
    fn new(now: Instant) -> Self {
        Self {
            hits: VecDeque::new(),
            last_seen: now,
        }
    }

    fn prune(&mut self, now: Instant, window: Duration) {
        // checked_sub: early in process lifetime `now - window` can underflow
        let Some(cutoff) = now.checked_sub(window) else {
            return;
        };
        while self.hits.front().is_some_and(|t| *t < cutoff) {
            self.hits.pop_front();
        }
    }
}

/// Sliding-window rate limiter keyed by user id.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    users: RwLock<HashMap<String, Arc<Mutex<UserWindow>>>>,
    acquires: AtomicU64,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Limiter with a non-default window duration
    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            users: RwLock::new(HashMap::new()),
            acquires: AtomicU64::new(0),
        }
    }

    /// Atomically check the user's window against `limit` and, if under
    /// it, record the request. Prune, count, and append happen in one
    /// critical section per user.
    pub fn acquire(&self, user_id: &str, limit: usize) -> Admission {
        if self.acquires.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.sweep_idle();
        }

        let slot = self.slot(user_id);
        let mut window = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        window.prune(now, self.window);
        window.last_seen = now;

        let count = window.hits.len();
        if count >= limit {
            tracing::warn!(user = user_id, count, limit, "rate limit exceeded");
            return Admission::Limited { count, limit };
        }

        window.hits.push_back(now);
        Admission::Admitted
    }

    /// Give back the most recently recorded slot for a user.
    ///
    /// Called when a later pipeline stage denies a request that was
    /// already admitted, so denials consume no quota.
    pub fn release(&self, user_id: &str) {
        if let Some(slot) = self.existing_slot(user_id) {
            let mut window = slot.lock().unwrap_or_else(PoisonError::into_inner);
            window.hits.pop_back();
        }
    }

    /// Requests currently inside the user's window
    pub fn current_count(&self, user_id: &str) -> usize {
        let Some(slot) = self.existing_slot(user_id) else {
            return 0;
        };
        let mut window = slot.lock().unwrap_or_else(PoisonError::into_inner);
        window.prune(Instant::now(), self.window);
        window.hits.len()
    }

    /// Clear the window for a user (admin use)
    pub fn reset(&self, user_id: &str) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.remove(user_id);
        tracing::info!(user = user_id, "rate limit window reset");
    }

    /// Drop entries whose window has been empty for longer than one
    /// window duration. Keeps the map bounded under many distinct
    /// callers. Returns the number of evicted users.
    pub fn sweep_idle(&self) -> usize {
        let now = Instant::now();
        let window = self.window;
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        let before = users.len();
        users.retain(|_, slot| {
            let mut w = slot.lock().unwrap_or_else(PoisonError::into_inner);
            w.prune(now, window);
            !w.hits.is_empty() || now.duration_since(w.last_seen) <= window
        });
        before - users.len()
    }

    /// Number of users currently tracked
    pub fn user_count(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn existing_slot(&self, user_id: &str) -> Option<Arc<Mutex<UserWindow>>> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
    }

    fn slot(&self, user_id: &str) -> Arc<Mutex<UserWindow>> {
        if let Some(slot) = self.existing_slot(user_id) {
            return slot;
        }
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UserWindow::new(Instant::now()))))
            .clone()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
