use std::collections::HashMap;

use shared::types::UserId;

/// Per-user completed-submission counter. Monotonic; quota is consumed for
/// the process lifetime, there is no decrement or reset.
pub struct QuotaTracker {
    limit: u32,
    counts: HashMap<UserId, u32>,
}

impl QuotaTracker {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            counts: HashMap::new(),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn count(&self, user_id: UserId) -> u32 {
        self.counts.get(&user_id).copied().unwrap_or(0)
    }

    pub fn has_remaining(&self, user_id: UserId) -> bool {
        self.count(user_id) < self.limit
    }

    /// Increments the stored count and returns the new value.
    pub fn increment(&mut self, user_id: UserId) -> u32 {
        let count = self.counts.entry(user_id).or_insert(0);
        *count += 1;
        *count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserId = UserId(7);

    #[test]
    fn test_fresh_user_has_remaining() {
        let quota = QuotaTracker::new(2);
        assert_eq!(quota.count(USER), 0);
        assert!(quota.has_remaining(USER));
    }

    #[test]
    fn test_increment_returns_new_value() {
        let mut quota = QuotaTracker::new(2);
        assert_eq!(quota.increment(USER), 1);
        assert_eq!(quota.increment(USER), 2);
        assert_eq!(quota.count(USER), 2);
    }

    #[test]
    fn test_limit_reached() {
        let mut quota = QuotaTracker::new(2);
        quota.increment(USER);
        assert!(quota.has_remaining(USER));
        quota.increment(USER);
        assert!(!quota.has_remaining(USER));
    }

    #[test]
    fn test_users_counted_independently() {
        let mut quota = QuotaTracker::new(2);
        quota.increment(UserId(1));
        quota.increment(UserId(1));
        assert!(!quota.has_remaining(UserId(1)));
        assert!(quota.has_remaining(UserId(2)));
    }
}
