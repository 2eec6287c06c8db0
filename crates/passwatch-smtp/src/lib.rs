//! # passwatch-smtp
//!
//! SMTP mailer for the passwatch daemon.
//!
//! Implements the mail capability over lettre: STARTTLS relay on the
//! submission port, optional LOGIN authentication, plain-text messages.
//!
//! ## Example
//!
//! ```ignore
//! use passwatch_core::traits::Mailer;
//! use passwatch_smtp::{SmtpMailer, SmtpSettings};
//!
//! let settings = SmtpSettings::new("mail.corp.example.com", "noreply@corp.example.com")
//!     .with_credentials("noreply@corp.example.com", "secret");
//!
//! let mailer = SmtpMailer::new(&settings)?;
//! mailer.send("john.doe@corp.example.com", "Password change required", "...").await?;
//! ```

pub mod mailer;
pub mod settings;

// Re-exports
pub use mailer::SmtpMailer;
pub use settings::SmtpSettings;
