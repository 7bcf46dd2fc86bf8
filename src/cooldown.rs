//! Per-user command cooldown.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Tracked users above which expired entries are dropped.
const PRUNE_THRESHOLD: usize = 1024;

/// Rejects a user's commands for `interval` after each accepted one.
#[derive(Debug)]
pub struct CooldownGate {
    interval: Duration,
    last_accepted: Mutex<HashMap<String, Instant>>,
}

impl CooldownGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    /// Accept the command (and restart the user's cooldown), or return the
    /// time left until the user may issue the next one.
    pub fn check(&self, user: &str) -> Result<(), Duration> {
        self.check_at(user, Instant::now())
    }

    pub fn check_at(&self, user: &str, now: Instant) -> Result<(), Duration> {
        let mut last = self
            .last_accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(&at) = last.get(user) {
            let elapsed = now.saturating_duration_since(at);
            if elapsed < self.interval {
                return Err(self.interval - elapsed);
            }
        }

        if last.len() >= PRUNE_THRESHOLD {
            let interval = self.interval;
            last.retain(|_, at| now.saturating_duration_since(*at) < interval);
        }
        last.insert(user.to_string(), now);
        Ok(())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.last_accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
