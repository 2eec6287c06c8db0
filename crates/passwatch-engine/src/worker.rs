//! Scan worker.
//!
//! Runs the poll loop: fetch the accounts in scope, decide who is overdue,
//! send reminders that have not gone out for the current password, record
//! them, prune state for departed accounts, sleep, repeat. The first cycle
//! runs immediately at startup.
//!
//! Failure rules inside a cycle:
//! - a failed fetch skips the whole cycle (nothing is sent or pruned);
//! - a failed delivery is logged and the account is retried next cycle;
//! - a failed state read or write aborts dispatch for the rest of the
//!   cycle, because without state the worker cannot tell who was already
//!   notified.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use passwatch_core::age::OverduePolicy;
use passwatch_core::error::{DeliveryError, DirectoryError, StoreResult};
use passwatch_core::traits::{DirectoryClient, Mailer, NotificationStore};
use passwatch_core::types::{SearchScope, UserRecord};

use crate::message;
use crate::stats::CycleStats;

/// Scan worker configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory scope to fetch.
    pub scope: SearchScope,

    /// When a password counts as overdue.
    pub policy: OverduePolicy,

    /// Domain suffix for accounts without a mail attribute.
    pub domain_suffix: String,

    /// Seconds between cycles.
    pub check_interval_secs: u64,

    /// Upper bound on one directory fetch.
    pub fetch_timeout_secs: u64,

    /// Upper bound on one delivery attempt.
    pub send_timeout_secs: u64,
}

/// Background worker that polls the directory and sends reminders.
pub struct ScanWorker {
    directory: Arc<dyn DirectoryClient>,
    mailer: Arc<dyn Mailer>,
    store: Box<dyn NotificationStore>,
    config: ScanConfig,
    cancel: CancellationToken,
}

impl ScanWorker {
    /// Create a new worker.
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        mailer: Arc<dyn Mailer>,
        store: Box<dyn NotificationStore>,
        config: ScanConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            directory,
            mailer,
            store,
            config,
            cancel,
        }
    }

    /// Run until cancelled. The first cycle starts immediately.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        info!(
            check_interval_secs = self.config.check_interval_secs,
            threshold_days = self.config.policy.threshold_days,
            "starting scan worker"
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("scan worker shutdown requested");
                    break;
                }
                _ = sleep(Duration::from_secs(self.config.check_interval_secs)) => {}
            }
        }

        info!("scan worker stopped");
    }

    /// Run one scan cycle and return its counters.
    #[instrument(skip(self))]
    pub async fn run_cycle(&mut self) -> CycleStats {
        let mut stats = CycleStats::default();
        let started = std::time::Instant::now();

        let fetch = timeout(
            Duration::from_secs(self.config.fetch_timeout_secs),
            self.directory.fetch_users(&self.config.scope),
        );

        let users = tokio::select! {
            _ = self.cancel.cancelled() => {
                info!("cycle abandoned during fetch: shutdown requested");
                return stats;
            }
            result = fetch => {
                let result = match result {
                    Ok(inner) => inner,
                    Err(_) => Err(DirectoryError::timeout(self.config.fetch_timeout_secs)),
                };
                match result {
                    Ok(users) => users,
                    Err(e) => {
                        if e.is_transient() {
                            warn!(error = %e, "directory fetch failed; skipping this cycle");
                        } else {
                            error!(error = %e, "directory fetch failed; skipping this cycle");
                        }
                        return stats;
                    }
                }
            }
        };

        stats.fetched = users.len();
        let now = Utc::now();
        let mut store_failed = false;

        for user in &users {
            if self.cancel.is_cancelled() {
                info!("cycle interrupted: shutdown requested");
                break;
            }

            if !self.config.policy.is_overdue(user.password_last_set, now) {
                continue;
            }
            stats.overdue += 1;

            match self
                .store
                .has_been_notified(&user.id, user.password_last_set)
            {
                Ok(true) => {
                    debug!(user_id = %user.id, "already notified for the current password");
                    stats.already_notified += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    error!(
                        error = %e,
                        user_id = %user.id,
                        "state lookup failed; holding further notifications this cycle"
                    );
                    store_failed = true;
                    break;
                }
            }

            if self.notify(user, &mut stats).await.is_err() {
                store_failed = true;
                break;
            }
        }

        // Prune only against a complete, successfully fetched account set.
        if !store_failed && !self.cancel.is_cancelled() {
            let active: HashSet<String> = users.iter().map(|u| u.id.clone()).collect();
            match self.store.prune(&active) {
                Ok(removed) => stats.pruned = removed,
                Err(e) => {
                    error!(error = %e, "failed to prune the state store");
                }
            }
        }

        info!(
            fetched = stats.fetched,
            overdue = stats.overdue,
            already_notified = stats.already_notified,
            sent = stats.sent,
            failed = stats.failed,
            pruned = stats.pruned,
            duration_ms = started.elapsed().as_millis() as u64,
            "scan cycle complete"
        );

        stats
    }

    /// Send one reminder and record it.
    ///
    /// A delivery failure only bumps the failure counter; the account is
    /// retried next cycle. A state write failure is returned to the caller,
    /// which stops dispatch: the reminder went out but could not be
    /// recorded, so this account may be notified twice.
    async fn notify(&mut self, user: &UserRecord, stats: &mut CycleStats) -> StoreResult<()> {
        let recipient = user.resolve_email(&self.config.domain_suffix);
        let body = message::notification_body(user.salutation(), self.config.policy.threshold_days);

        let send_result = match timeout(
            Duration::from_secs(self.config.send_timeout_secs),
            self.mailer.send(&recipient, message::SUBJECT, &body),
        )
        .await
        {
            Ok(inner) => inner,
            Err(_) => Err(DeliveryError::timeout(self.config.send_timeout_secs)),
        };

        match send_result {
            Ok(()) => {
                info!(user_id = %user.id, recipient = %recipient, "reminder sent");
                stats.sent += 1;

                if let Err(e) =
                    self.store
                        .record_notification(&user.id, user.password_last_set, Utc::now())
                {
                    error!(
                        error = %e,
                        user_id = %user.id,
                        "sent reminder could not be recorded; the account may be notified again; \
                         holding further notifications this cycle"
                    );
                    return Err(e);
                }
                Ok(())
            }
            Err(e) => {
                stats.failed += 1;
                if e.is_transient() {
                    warn!(
                        error = %e,
                        user_id = %user.id,
                        recipient = %recipient,
                        "reminder delivery failed; will retry next cycle"
                    );
                } else {
                    error!(
                        error = %e,
                        user_id = %user.id,
                        recipient = %recipient,
                        "reminder delivery failed"
                    );
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
    use passwatch_core::error::{
        DeliveryResult, DirectoryResult, StoreError, StoreResult,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockDirectory {
        users: Vec<UserRecord>,
        fail: bool,
    }

    #[async_trait]
    impl DirectoryClient for MockDirectory {
        async fn fetch_users(&self, _scope: &SearchScope) -> DirectoryResult<Vec<UserRecord>> {
            if self.fail {
                Err(DirectoryError::connection("mock directory down"))
            } else {
                Ok(self.users.clone())
            }
        }
    }

    #[derive(Default)]
    struct MockMailer {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, to: &str, _subject: &str, _body: &str) -> DeliveryResult<()> {
            if self.fail {
                return Err(DeliveryError::connection("mock relay down"));
            }
            self.sent.lock().unwrap().push(to.to_string());
            Ok(())
        }
    }

    /// In-memory store sharing its map with the test through an Arc.
    #[derive(Clone, Default)]
    struct MemoryStore {
        entries: Arc<Mutex<HashMap<String, Option<DateTime<Utc>>>>>,
    }

    impl NotificationStore for MemoryStore {
        fn has_been_notified(
            &self,
            user_id: &str,
            current_password_last_set: Option<DateTime<Utc>>,
        ) -> StoreResult<bool> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .get(user_id)
                .map(|stored| *stored == current_password_last_set)
                .unwrap_or(false))
        }

        fn record_notification(
            &mut self,
            user_id: &str,
            password_last_set: Option<DateTime<Utc>>,
            _sent_at: DateTime<Utc>,
        ) -> StoreResult<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(user_id.to_string(), password_last_set);
            Ok(())
        }

        fn prune(&mut self, active_user_ids: &HashSet<String>) -> StoreResult<usize> {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|user_id, _| active_user_ids.contains(user_id));
            Ok(before - entries.len())
        }
    }

    struct FailingStore;

    impl NotificationStore for FailingStore {
        fn has_been_notified(
            &self,
            _user_id: &str,
            _current_password_last_set: Option<DateTime<Utc>>,
        ) -> StoreResult<bool> {
            Err(StoreError::io("mock store unavailable"))
        }

        fn record_notification(
            &mut self,
            _user_id: &str,
            _password_last_set: Option<DateTime<Utc>>,
            _sent_at: DateTime<Utc>,
        ) -> StoreResult<()> {
            Err(StoreError::io("mock store unavailable"))
        }

        fn prune(&mut self, _active_user_ids: &HashSet<String>) -> StoreResult<usize> {
            Err(StoreError::io("mock store unavailable"))
        }
    }

    fn user(id: &str, password_age_days: Option<i64>) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            display_name: None,
            email: Some(format!("{id}@corp.example.com")),
            password_last_set: password_age_days
                .map(|days| Utc::now() - ChronoDuration::days(days)),
            distinguished_name: format!("CN={id},OU=Staff,DC=corp,DC=example,DC=com"),
        }
    }

    fn config() -> ScanConfig {
        ScanConfig {
            scope: SearchScope::new("DC=corp,DC=example,DC=com"),
            policy: OverduePolicy::new(150),
            domain_suffix: "corp.example.com".to_string(),
            check_interval_secs: 3600,
            fetch_timeout_secs: 5,
            send_timeout_secs: 5,
        }
    }

    fn worker(
        users: Vec<UserRecord>,
        mailer: Arc<MockMailer>,
        store: MemoryStore,
    ) -> ScanWorker {
        ScanWorker::new(
            Arc::new(MockDirectory { users, fail: false }),
            mailer,
            Box::new(store),
            config(),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_cycle_notifies_only_overdue_users() {
        let mailer = Arc::new(MockMailer::default());
        let store = MemoryStore::default();
        let mut worker = worker(
            vec![
                user("overdue", Some(200)),
                user("fresh", Some(10)),
                user("never-set", None),
            ],
            mailer.clone(),
            store,
        );

        let stats = worker.run_cycle().await;

        assert_eq!(stats.fetched, 3);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.sent, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(
            *mailer.sent.lock().unwrap(),
            vec!["overdue@corp.example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_repeat_cycle_is_idempotent() {
        let mailer = Arc::new(MockMailer::default());
        let store = MemoryStore::default();
        let mut worker = worker(vec![user("jdoe", Some(200))], mailer.clone(), store);

        let first = worker.run_cycle().await;
        let second = worker.run_cycle().await;

        assert_eq!(first.sent, 1);
        assert_eq!(second.sent, 0);
        assert_eq!(second.already_notified, 1);
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_password_change_rearms_notification() {
        let mailer = Arc::new(MockMailer::default());
        let store = MemoryStore::default();

        let mut worker = worker(vec![user("jdoe", Some(400))], mailer.clone(), store.clone());
        worker.run_cycle().await;

        // The user changed the password, but left it to rot again.
        let mut changed = worker;
        changed.directory = Arc::new(MockDirectory {
            users: vec![user("jdoe", Some(200))],
            fail: false,
        });

        let stats = changed.run_cycle().await;
        assert_eq!(stats.sent, 1);
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_cycle() {
        let mailer = Arc::new(MockMailer::default());
        let store = MemoryStore::default();
        store
            .entries
            .lock()
            .unwrap()
            .insert("departed".to_string(), None);

        let mut worker = ScanWorker::new(
            Arc::new(MockDirectory {
                users: vec![],
                fail: true,
            }),
            mailer.clone(),
            Box::new(store.clone()),
            config(),
            CancellationToken::new(),
        );

        let stats = worker.run_cycle().await;

        assert_eq!(stats, CycleStats::default());
        assert!(mailer.sent.lock().unwrap().is_empty());
        // A failed fetch must not prune the store.
        assert!(store.entries.lock().unwrap().contains_key("departed"));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_retried_next_cycle() {
        let store = MemoryStore::default();
        let users = vec![user("jdoe", Some(200))];

        let failing = Arc::new(MockMailer {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let mut worker = ScanWorker::new(
            Arc::new(MockDirectory {
                users: users.clone(),
                fail: false,
            }),
            failing,
            Box::new(store.clone()),
            config(),
            CancellationToken::new(),
        );

        let first = worker.run_cycle().await;
        assert_eq!(first.failed, 1);
        assert_eq!(first.sent, 0);

        // Nothing recorded, so a healthy relay sends it next cycle.
        let working = Arc::new(MockMailer::default());
        let mut worker = ScanWorker::new(
            Arc::new(MockDirectory { users, fail: false }),
            working.clone(),
            Box::new(store),
            config(),
            CancellationToken::new(),
        );

        let second = worker.run_cycle().await;
        assert_eq!(second.sent, 1);
        assert_eq!(working.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_holds_notifications() {
        let mailer = Arc::new(MockMailer::default());
        let mut worker = ScanWorker::new(
            Arc::new(MockDirectory {
                users: vec![user("a", Some(200)), user("b", Some(200))],
                fail: false,
            }),
            mailer.clone(),
            Box::new(FailingStore),
            config(),
            CancellationToken::new(),
        );

        let stats = worker.run_cycle().await;

        assert_eq!(stats.sent, 0);
        assert_eq!(stats.pruned, 0);
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_never_set_opt_in_notifies() {
        let mailer = Arc::new(MockMailer::default());
        let store = MemoryStore::default();
        let mut worker = worker(vec![user("svc-backup", None)], mailer.clone(), store);
        worker.config.policy = OverduePolicy::new(150).with_notify_never_set(true);

        let stats = worker.run_cycle().await;

        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.sent, 1);
    }

    #[tokio::test]
    async fn test_missing_email_falls_back_to_domain_suffix() {
        let mailer = Arc::new(MockMailer::default());
        let store = MemoryStore::default();
        let mut no_mail = user("jdoe", Some(200));
        no_mail.email = None;

        let mut worker = worker(vec![no_mail], mailer.clone(), store);
        worker.run_cycle().await;

        assert_eq!(
            *mailer.sent.lock().unwrap(),
            vec!["jdoe@corp.example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_prune_removes_departed_accounts() {
        let mailer = Arc::new(MockMailer::default());
        let store = MemoryStore::default();
        store
            .entries
            .lock()
            .unwrap()
            .insert("departed".to_string(), None);

        let mut worker = worker(vec![user("jdoe", Some(10))], mailer, store.clone());
        let stats = worker.run_cycle().await;

        assert_eq!(stats.pruned, 1);
        assert!(!store.entries.lock().unwrap().contains_key("departed"));
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let mut worker = ScanWorker::new(
            Arc::new(MockDirectory {
                users: vec![],
                fail: false,
            }),
            Arc::new(MockMailer::default()),
            Box::new(MemoryStore::default()),
            config(),
            cancel.clone(),
        );

        let handle = tokio::spawn(async move { worker.run().await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        timeout(Duration::from_secs(5), handle)
            .await
            .expect("worker did not stop after cancel")
            .expect("worker task panicked");
    }
}
