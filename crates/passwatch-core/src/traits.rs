//! Capability traits
//!
//! The scan worker consumes the directory, the mail server, and the durable
//! notification state through these seams, so tests can swap in fakes
//! without live network access.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{DeliveryResult, DirectoryResult, StoreResult};
use crate::types::{SearchScope, UserRecord};

/// Read access to the directory service.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Fetch every user record under the given scope.
    ///
    /// Only accounts under the scope's included OUs are returned (the whole
    /// base when none are configured). An empty scope yields an empty vector,
    /// not an error. No state is retained between fetches.
    async fn fetch_users(&self, scope: &SearchScope) -> DirectoryResult<Vec<UserRecord>>;
}

/// Outbound mail delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one plain-text message.
    ///
    /// A failure is per-message: the caller decides whether to retry, and
    /// must not mark the recipient as notified.
    async fn send(&self, to: &str, subject: &str, body: &str) -> DeliveryResult<()>;
}

/// Durable record of who was notified for which password generation.
///
/// Single-writer: only the scan worker mutates the store, strictly
/// sequentially within one cycle. Implementations must survive process
/// restarts.
pub trait NotificationStore: Send {
    /// True iff an entry exists for `user_id` whose stored password-last-set
    /// value equals `current_password_last_set` (absent equals absent). A
    /// differing value means the password changed and the overdue period
    /// reset.
    fn has_been_notified(
        &self,
        user_id: &str,
        current_password_last_set: Option<DateTime<Utc>>,
    ) -> StoreResult<bool>;

    /// Create or overwrite the entry for `user_id`.
    fn record_notification(
        &mut self,
        user_id: &str,
        password_last_set: Option<DateTime<Utc>>,
        sent_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Remove entries for users no longer present in the directory scope.
    /// Returns the number of entries removed.
    fn prune(&mut self, active_user_ids: &HashSet<String>) -> StoreResult<usize>;
}
