//! # passwatch-engine
//!
//! The scan worker for the passwatch daemon: fetches the accounts in scope,
//! decides who is overdue, sends one reminder per password, records it, and
//! prunes state for accounts that left the scope. Capabilities (directory,
//! mailer, store) come in through the traits in `passwatch-core`, so the
//! worker is tested against mocks.

pub mod message;
pub mod stats;
pub mod worker;

// Re-exports
pub use stats::CycleStats;
pub use worker::{ScanConfig, ScanWorker};
