use std::collections::HashMap;
use std::time::{Duration, Instant};

use shared::types::UserId;

/// Per-user cooldown gate. Entries are never pruned; growth is bounded by
/// the number of unique users seen in the process lifetime.
pub struct RateLimiter {
    cooldown: Duration,
    last_action: HashMap<UserId, Instant>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_action: HashMap::new(),
        }
    }

    /// Returns true when the action arrives within the cooldown window of the
    /// previously allowed one. Records `now` only when the action is allowed,
    /// so rejected spam does not push the window forward.
    pub fn is_too_fast(&mut self, user_id: UserId, now: Instant) -> bool {
        if let Some(last) = self.last_action.get(&user_id) {
            if now.duration_since(*last) < self.cooldown {
                return true;
            }
        }
        self.last_action.insert(user_id, now);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserId = UserId(42);

    #[test]
    fn test_first_action_allowed() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1));
        assert!(!limiter.is_too_fast(USER, Instant::now()));
    }

    #[test]
    fn test_action_within_cooldown_rejected() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(!limiter.is_too_fast(USER, t0));
        assert!(limiter.is_too_fast(USER, t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_action_at_cooldown_boundary_allowed() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(!limiter.is_too_fast(USER, t0));
        assert!(!limiter.is_too_fast(USER, t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_rejection_does_not_extend_window() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(!limiter.is_too_fast(USER, t0));
        // Rejected spam at t0+900ms must not reset the window...
        assert!(limiter.is_too_fast(USER, t0 + Duration::from_millis(900)));
        // ...so a full cooldown after t0 is allowed again.
        assert!(!limiter.is_too_fast(USER, t0 + Duration::from_millis(1100)));
    }

    #[test]
    fn test_users_tracked_independently() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(!limiter.is_too_fast(UserId(1), t0));
        assert!(!limiter.is_too_fast(UserId(2), t0));
        assert!(limiter.is_too_fast(UserId(1), t0 + Duration::from_millis(100)));
    }
}
