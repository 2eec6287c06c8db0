//! Password age evaluation
//!
//! Pure decision logic: no clock access, no I/O. The worker passes `now` in
//! so the same inputs always produce the same answer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default overdue threshold in whole days.
pub const DEFAULT_THRESHOLD_DAYS: u32 = 150;

/// When a password counts as overdue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverduePolicy {
    /// A password older than this many whole days is overdue.
    pub threshold_days: u32,

    /// Whether accounts with no password-last-set value count as overdue.
    /// Off by default: directories commonly leave the attribute unset for
    /// exempt accounts (service accounts, never-expires policies), and a
    /// missing value must not produce false reminders.
    pub notify_never_set: bool,
}

impl Default for OverduePolicy {
    fn default() -> Self {
        Self {
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            notify_never_set: false,
        }
    }
}

impl OverduePolicy {
    /// Create a policy with the given threshold and the conservative
    /// never-set default.
    pub fn new(threshold_days: u32) -> Self {
        Self {
            threshold_days,
            notify_never_set: false,
        }
    }

    /// Opt in to treating never-set passwords as overdue.
    #[must_use]
    pub fn with_notify_never_set(mut self, notify: bool) -> Self {
        self.notify_never_set = notify;
        self
    }

    /// Decide whether a password is overdue at `now`.
    ///
    /// A password is overdue when `now - password_last_set >= threshold_days`,
    /// compared as exact durations so the boundary day is included. An absent
    /// timestamp follows the `notify_never_set` flag.
    pub fn is_overdue(&self, password_last_set: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match password_last_set {
            Some(last_set) => now - last_set >= Duration::days(i64::from(self.threshold_days)),
            None => self.notify_never_set,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        use chrono::TimeZone;
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_policy() {
        let policy = OverduePolicy::default();
        assert_eq!(policy.threshold_days, 150);
        assert!(!policy.notify_never_set);
    }

    #[test]
    fn test_overdue_past_threshold() {
        let policy = OverduePolicy::new(150);
        let last_set = now() - Duration::days(151);
        assert!(policy.is_overdue(Some(last_set), now()));
    }

    #[test]
    fn test_not_overdue_within_threshold() {
        let policy = OverduePolicy::new(150);
        let last_set = now() - Duration::days(10);
        assert!(!policy.is_overdue(Some(last_set), now()));
    }

    #[test]
    fn test_boundary_is_overdue() {
        // Exactly threshold days old counts: now - T >= D.
        let policy = OverduePolicy::new(150);
        let last_set = now() - Duration::days(150);
        assert!(policy.is_overdue(Some(last_set), now()));
    }

    #[test]
    fn test_just_under_boundary_is_not_overdue() {
        let policy = OverduePolicy::new(150);
        let last_set = now() - Duration::days(150) + Duration::seconds(1);
        assert!(!policy.is_overdue(Some(last_set), now()));
    }

    #[test]
    fn test_never_set_defaults_to_not_overdue() {
        let policy = OverduePolicy::new(150);
        assert!(!policy.is_overdue(None, now()));
    }

    #[test]
    fn test_never_set_opt_in() {
        let policy = OverduePolicy::new(150).with_notify_never_set(true);
        assert!(policy.is_overdue(None, now()));
    }

    #[test]
    fn test_future_timestamp_is_not_overdue() {
        // Clock skew can put pwdLastSet slightly ahead of us.
        let policy = OverduePolicy::new(150);
        let last_set = now() + Duration::hours(1);
        assert!(!policy.is_overdue(Some(last_set), now()));
    }

    #[test]
    fn test_deterministic() {
        let policy = OverduePolicy::new(150);
        let last_set = Some(now() - Duration::days(200));
        assert_eq!(
            policy.is_overdue(last_set, now()),
            policy.is_overdue(last_set, now())
        );
    }
}
