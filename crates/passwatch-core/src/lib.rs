//! # passwatch-core
//!
//! Domain types and capability seams for the password-expiry notification
//! daemon.
//!
//! ## Features
//!
//! - User records as read from the directory, with two-step email resolution
//! - Overdue policy (pure age evaluation against a day threshold)
//! - Windows FileTime conversion for the `pwdLastSet` attribute
//! - Capability traits for the directory client, the mailer, and the
//!   notification state store
//! - Error taxonomy with transient/permanent classification
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use passwatch_core::OverduePolicy;
//!
//! let policy = OverduePolicy::new(150);
//! let now = Utc::now();
//! assert!(policy.is_overdue(Some(now - Duration::days(151)), now));
//! assert!(!policy.is_overdue(Some(now - Duration::days(10)), now));
//! assert!(!policy.is_overdue(None, now));
//! ```

pub mod age;
pub mod error;
pub mod filetime;
pub mod traits;
pub mod types;

pub use age::{OverduePolicy, DEFAULT_THRESHOLD_DAYS};
pub use error::{
    DeliveryError, DeliveryResult, DirectoryError, DirectoryResult, StoreError, StoreResult,
};
pub use filetime::{filetime_to_datetime, parse_filetime};
pub use traits::{DirectoryClient, Mailer, NotificationStore};
pub use types::{NotificationEntry, SearchScope, UserRecord};
