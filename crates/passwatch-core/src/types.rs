//! Domain types shared across the scan pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The directory region a scan covers: a base DN plus an optional set of
/// organizational units to restrict the search to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchScope {
    /// Base DN every search is anchored under.
    pub base_dn: String,

    /// Included OU DNs. Empty means the whole base is in scope.
    #[serde(default)]
    pub included_ous: Vec<String>,
}

impl SearchScope {
    /// Create a scope covering the whole base DN.
    pub fn new(base_dn: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            included_ous: Vec::new(),
        }
    }

    /// Restrict the scope to the given OU DNs.
    #[must_use]
    pub fn with_included_ous(mut self, ous: Vec<String>) -> Self {
        self.included_ous = ous;
        self
    }

    /// The effective search bases for one fetch: each included OU, or the
    /// base DN itself when no OUs are configured.
    pub fn search_bases(&self) -> Vec<&str> {
        if self.included_ous.is_empty() {
            vec![self.base_dn.as_str()]
        } else {
            self.included_ous.iter().map(String::as_str).collect()
        }
    }
}

/// A user account as read from the directory in one scan cycle.
///
/// Built fresh from each fetch; nothing here outlives the cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    /// Unique account identifier within the directory (`sAMAccountName`).
    pub id: String,

    /// Human-readable name, when the directory has one.
    pub display_name: Option<String>,

    /// Mail attribute as stored in the directory. May be absent or blank;
    /// use [`UserRecord::resolve_email`] for the deliverable address.
    pub email: Option<String>,

    /// When the password was last set. `None` means never set (or the
    /// attribute is missing), which the overdue policy handles explicitly.
    pub password_last_set: Option<DateTime<Utc>>,

    /// Full DN, kept for diagnostics.
    pub distinguished_name: String,
}

impl UserRecord {
    /// Resolve the deliverable address: the directory's mail attribute when
    /// present and non-blank, otherwise `identifier@domain` synthesized from
    /// the configured suffix. The suffix may be given with or without a
    /// leading `@`.
    pub fn resolve_email(&self, domain_suffix: &str) -> String {
        match self.email.as_deref().map(str::trim) {
            Some(addr) if !addr.is_empty() => addr.to_string(),
            _ => format!("{}@{}", self.id, domain_suffix.trim_start_matches('@')),
        }
    }

    /// The name to greet the user with: display name when known, account
    /// identifier otherwise.
    pub fn salutation(&self) -> &str {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }
}

/// One row of durable notification state: the password generation a user was
/// last notified for, and when.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEntry {
    /// Account identifier the entry belongs to.
    pub user_id: String,

    /// The password-last-set value in effect when the notification went out.
    /// A change in this value marks a new overdue period.
    pub password_last_set: Option<DateTime<Utc>>,

    /// When the notification was sent.
    pub last_notified: DateTime<Utc>,
}
