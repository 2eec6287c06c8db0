//! Per-cycle counters.

/// What one scan cycle did, for the summary log line and for tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    /// Accounts returned by the directory fetch.
    pub fetched: usize,

    /// Accounts whose password is overdue.
    pub overdue: usize,

    /// Overdue accounts skipped because the current password was already
    /// notified.
    pub already_notified: usize,

    /// Notifications handed to the relay.
    pub sent: usize,

    /// Delivery attempts that failed.
    pub failed: usize,

    /// State entries removed for accounts no longer in scope.
    pub pruned: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_zero() {
        let stats = CycleStats::default();
        assert_eq!(stats.fetched, 0);
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.already_notified, 0);
        assert_eq!(stats.sent, 0);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.pruned, 0);
    }
}
