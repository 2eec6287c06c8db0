//! # passwatch-ldap
//!
//! Active Directory client for the passwatch daemon.
//!
//! Implements the directory capability over LDAP: simple bind with an
//! optional StartTLS upgrade, one subtree search per configured base, and
//! mapping of AD user entries (including the Windows FileTime encoding of
//! `pwdLastSet`) into domain records.
//!
//! ## Example
//!
//! ```ignore
//! use passwatch_core::traits::DirectoryClient;
//! use passwatch_core::types::SearchScope;
//! use passwatch_ldap::{DirectorySettings, LdapDirectory};
//!
//! let settings = DirectorySettings::new(
//!     "dc01.corp.example.com",
//!     "CN=svc-passwatch,OU=Service,DC=corp,DC=example,DC=com",
//!     "secret",
//! )
//! .with_starttls(true);
//!
//! let directory = LdapDirectory::new(settings);
//! let scope = SearchScope::new("DC=corp,DC=example,DC=com");
//! let users = directory.fetch_users(&scope).await?;
//! ```

pub mod client;
pub mod filter;
pub mod settings;

// Re-exports
pub use client::LdapDirectory;
pub use filter::{escape_filter_value, ACTIVE_USER_FILTER};
pub use settings::DirectorySettings;
