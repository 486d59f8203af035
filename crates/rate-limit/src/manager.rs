//! Sliding window log admission, keyed by client id.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use clock::Clock;
use config::RateLimitConfig;
use dashmap::DashMap;
use jiff::Timestamp;

use crate::error::RateLimitError;

/// Per-client request admission over a rolling window.
///
/// Window state is created lazily on a client's first request and lives for
/// the process lifetime. The `DashMap` entry guard makes prune, check and
/// append one atomic region per client key, so two concurrent requests can
/// never both claim the last remaining slot.
pub struct RateLimitManager {
    max_requests: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: DashMap<String, VecDeque<Timestamp>>,
}

impl RateLimitManager {
    /// Create a new rate limit manager with the given quota.
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Result<Self, RateLimitError> {
        if config.max_requests == 0 {
            return Err(RateLimitError::InvalidQuota("max_requests must be greater than zero"));
        }

        if config.window.is_zero() {
            return Err(RateLimitError::InvalidQuota("window must be greater than zero"));
        }

        Ok(Self {
            max_requests: config.max_requests as usize,
            window: config.window,
            clock,
            windows: DashMap::new(),
        })
    }

    /// Decide whether one more request from this client fits into the
    /// current window.
    ///
    /// A rejected attempt is not recorded: it neither consumes a slot nor
    /// extends the window.
    pub fn admit(&self, client_id: &str) -> bool {
        let now = self.clock.now();
        let cutoff = now.checked_sub(self.window).unwrap_or(Timestamp::MIN);

        let mut window = self.windows.entry(client_id.to_string()).or_default();

        while window.front().is_some_and(|recorded| *recorded <= cutoff) {
            window.pop_front();
        }

        if window.len() >= self.max_requests {
            log::debug!(
                "Request rejected for client '{client_id}': {} requests already recorded in the last {:?}",
                window.len(),
                self.window
            );
            return false;
        }

        window.push_back(now);
        log::debug!(
            "Request admitted for client '{client_id}': {}/{} slots used",
            window.len(),
            self.max_requests
        );

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clock::ManualClock;

    fn manager(max_requests: u32, window_secs: u64) -> (RateLimitManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_epoch());
        let config = RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
        };

        let manager = RateLimitManager::new(config, clock.clone()).unwrap();

        (manager, clock)
    }

    #[test]
    fn admits_up_to_the_quota_then_rejects() {
        let (manager, _clock) = manager(10, 60);

        for _ in 0..10 {
            assert!(manager.admit("demo_client_id_123"));
        }

        assert!(!manager.admit("demo_client_id_123"));
    }

    #[test]
    fn rejected_attempts_do_not_extend_the_window() {
        let (manager, clock) = manager(2, 60);

        assert!(manager.admit("client"));
        assert!(manager.admit("client"));

        // Hammering while over quota must not push the recovery point out.
        for _ in 0..5 {
            clock.advance(Duration::from_secs(5));
            assert!(!manager.admit("client"));
        }

        // 61s after the first recorded request its slot frees up.
        clock.advance(Duration::from_secs(36));
        assert!(manager.admit("client"));
    }

    #[test]
    fn window_slides_rather_than_resets() {
        let (manager, clock) = manager(2, 60);

        assert!(manager.admit("client"));
        clock.advance(Duration::from_secs(30));
        assert!(manager.admit("client"));
        assert!(!manager.admit("client"));

        // The first slot frees a full window after the first request, the
        // second stays taken.
        clock.advance(Duration::from_secs(31));
        assert!(manager.admit("client"));
        assert!(!manager.admit("client"));
    }

    #[test]
    fn clients_are_limited_independently() {
        let (manager, _clock) = manager(1, 60);

        assert!(manager.admit("client_a"));
        assert!(!manager.admit("client_a"));
        assert!(manager.admit("client_b"));
    }

    #[test]
    fn concurrent_admits_cannot_overshoot_the_last_slot() {
        let (manager, _clock) = manager(1, 60);
        let manager = Arc::new(manager);

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let manager = manager.clone();
                std::thread::spawn(move || manager.admit("client"))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(|result| matches!(result, Ok(true)))
            .count();

        assert_eq!(1, admitted);
    }

    #[test]
    fn zero_quota_is_rejected_at_construction() {
        let clock = Arc::new(ManualClock::at_epoch());
        let config = RateLimitConfig {
            max_requests: 0,
            window: Duration::from_secs(60),
        };

        assert!(RateLimitManager::new(config, clock).is_err());
    }
}
