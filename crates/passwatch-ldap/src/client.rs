//! Active Directory client.
//!
//! Connects with an optional StartTLS upgrade, performs a simple bind, then
//! runs one subtree search per configured search base. Entries that cannot
//! be mapped to a user record are skipped with a warning; they must never
//! abort the whole fetch.

use std::collections::HashSet;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use tracing::{debug, info, warn};

use passwatch_core::error::{DirectoryError, DirectoryResult};
use passwatch_core::filetime::parse_filetime;
use passwatch_core::traits::DirectoryClient;
use passwatch_core::types::{SearchScope, UserRecord};

use crate::filter;
use crate::settings::DirectorySettings;

/// LDAP result code for invalid credentials.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Directory client backed by an Active Directory LDAP server.
pub struct LdapDirectory {
    settings: DirectorySettings,
}

impl LdapDirectory {
    /// Create a client from validated settings.
    pub fn new(settings: DirectorySettings) -> Self {
        Self { settings }
    }

    /// Open a connection and bind with the configured identity.
    async fn connect(&self) -> DirectoryResult<Ldap> {
        let url = self.settings.url();

        debug!(url = %url, "connecting to directory server");

        let conn_settings = LdapConnSettings::new()
            .set_conn_timeout(std::time::Duration::from_secs(self.settings.timeout_secs))
            .set_starttls(self.settings.starttls);

        let (conn, mut ldap) = LdapConnAsync::with_settings(conn_settings, &url)
            .await
            .map_err(|e| {
                DirectoryError::connection_with_source(
                    format!("failed to connect to directory server at {url}"),
                    e,
                )
            })?;

        // Drive the connection until it closes.
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "ldap connection driver error");
            }
        });

        debug!(bind_dn = %self.settings.bind_dn, "binding to directory");

        let result = ldap
            .simple_bind(&self.settings.bind_dn, &self.settings.bind_password)
            .await
            .map_err(|e| {
                DirectoryError::connection_with_source(
                    format!("bind failed for {}", self.settings.bind_dn),
                    e,
                )
            })?;

        if result.rc != 0 {
            if result.rc == RC_INVALID_CREDENTIALS {
                return Err(DirectoryError::auth(format!(
                    "invalid credentials for {}",
                    self.settings.bind_dn
                )));
            }
            return Err(DirectoryError::connection(format!(
                "bind failed with code {}: {}",
                result.rc, result.text
            )));
        }

        Ok(ldap)
    }

    /// Search one base DN and map the entries to user records.
    async fn search_base(&self, ldap: &mut Ldap, base: &str) -> DirectoryResult<Vec<UserRecord>> {
        debug!(base = %base, "searching for user accounts");

        let result = ldap
            .search(
                base,
                Scope::Subtree,
                filter::ACTIVE_USER_FILTER,
                filter::user_attributes(),
            )
            .await
            .map_err(|e| {
                DirectoryError::query_with_source(format!("search under {base} failed"), e)
            })?;

        let (entries, _res) = result.success().map_err(|e| {
            DirectoryError::query_with_source(format!("search under {base} was rejected"), e)
        })?;

        let mut records = Vec::with_capacity(entries.len());
        for result_entry in entries {
            let entry = SearchEntry::construct(result_entry);
            match map_entry(&entry) {
                Some(record) => records.push(record),
                None => {
                    warn!(dn = %entry.dn, "skipping entry without an account identifier");
                }
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl DirectoryClient for LdapDirectory {
    async fn fetch_users(&self, scope: &SearchScope) -> DirectoryResult<Vec<UserRecord>> {
        let mut ldap = self.connect().await?;

        // Nested OUs can return the same account from several bases.
        let mut seen: HashSet<String> = HashSet::new();
        let mut users: Vec<UserRecord> = Vec::new();

        for base in scope.search_bases() {
            for record in self.search_base(&mut ldap, base).await? {
                if seen.insert(record.id.clone()) {
                    users.push(record);
                }
            }
        }

        if let Err(e) = ldap.unbind().await {
            warn!(error = %e, "error during ldap unbind");
        }

        info!(user_count = users.len(), "directory fetch complete");

        Ok(users)
    }
}

/// Map an LDAP entry to a user record.
///
/// - `sAMAccountName` -> id (required; entries without it are skipped)
/// - `displayName` -> display name
/// - `mail` -> email
/// - `pwdLastSet` -> password last set (Windows FileTime; `0` means never)
/// - `distinguishedName` -> DN, falling back to the entry DN
fn map_entry(entry: &SearchEntry) -> Option<UserRecord> {
    let id = first_attr(entry, "sAMAccountName")?.to_string();

    let password_last_set = first_attr(entry, "pwdLastSet").and_then(parse_filetime);

    let distinguished_name = first_attr(entry, "distinguishedName")
        .map(str::to_string)
        .unwrap_or_else(|| entry.dn.clone());

    Some(UserRecord {
        id,
        display_name: first_attr(entry, "displayName").map(str::to_string),
        email: first_attr(entry, "mail").map(str::to_string),
        password_last_set,
        distinguished_name,
    })
}

/// First non-empty value of an attribute.
fn first_attr<'a>(entry: &'a SearchEntry, name: &str) -> Option<&'a str> {
    entry
        .attrs
        .get(name)
        .and_then(|values| values.first())
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}
