//! # passwatch-store
//!
//! SQLite-backed notification state for the passwatch daemon.
//!
//! One row per notified account, keyed by the account identifier and
//! carrying the password-last-set value the notification was sent for.
//! A later password change makes the stored value differ from the live
//! one, which re-arms the notification.

pub mod store;

// Re-exports
pub use store::SqliteStore;
