use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Sliding-window call budget: at most `limit` calls in any `window`.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            calls: Mutex::new(VecDeque::new()),
        }
    }

    /// `limit` calls per rolling minute.
    pub fn per_minute(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Record a call if budget remains. Returns `false` when exhausted.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    pub fn remaining(&self) -> usize {
        self.remaining_at(Instant::now())
    }

    pub(crate) fn try_acquire_at(&self, now: Instant) -> bool {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        Self::expire(&mut calls, now, self.window);

        if calls.len() >= self.limit {
            return false;
        }
        calls.push_back(now);
        true
    }

    pub(crate) fn remaining_at(&self, now: Instant) -> usize {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        Self::expire(&mut calls, now, self.window);
        self.limit.saturating_sub(calls.len())
    }

    fn expire(calls: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(oldest) = calls.front() {
            if now.saturating_duration_since(*oldest) < window {
                break;
            }
            calls.pop_front();
        }
    }
}
