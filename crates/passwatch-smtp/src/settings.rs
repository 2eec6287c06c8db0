//! SMTP connection settings.

use serde::{Deserialize, Serialize};

/// Default submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings for the outgoing mail relay.
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpSettings {
    /// Relay hostname.
    pub host: String,

    /// Relay port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Username for LOGIN authentication. Must be set together with
    /// `password`; both absent means an unauthenticated relay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for LOGIN authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Sender address for all notifications.
    pub from_email: String,

    /// Per-attempt I/O timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***REDACTED***"))
            .field("from_email", &self.from_email)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SmtpSettings {
    /// Create settings for an unauthenticated relay.
    pub fn new(host: impl Into<String>, from_email: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_smtp_port(),
            username: None,
            password: None,
            from_email: from_email.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the relay port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set LOGIN credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the per-attempt I/O timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_new_defaults() {
        let settings = SmtpSettings::new("mail.corp.example.com", "noreply@corp.example.com");

        assert_eq!(settings.port, 587);
        assert_eq!(settings.username, None);
        assert_eq!(settings.password, None);
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn test_settings_builders() {
        let settings = SmtpSettings::new("mail.corp.example.com", "noreply@corp.example.com")
            .with_port(2525)
            .with_credentials("noreply@corp.example.com", "secret")
            .with_timeout_secs(5);

        assert_eq!(settings.port, 2525);
        assert_eq!(settings.username.as_deref(), Some("noreply@corp.example.com"));
        assert_eq!(settings.password.as_deref(), Some("secret"));
        assert_eq!(settings.timeout_secs, 5);
    }

    #[test]
    fn test_debug_redacts_password() {
        let settings = SmtpSettings::new("mail.corp.example.com", "noreply@corp.example.com")
            .with_credentials("user", "super-secret");
        let debug = format!("{settings:?}");

        assert!(debug.contains("***REDACTED***"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_settings_serialization_skips_absent_credentials() {
        let settings = SmtpSettings::new("mail.corp.example.com", "noreply@corp.example.com");
        let json = serde_json::to_string(&settings).unwrap();

        assert!(!json.contains("username"));
        assert!(!json.contains("password"));

        let parsed: SmtpSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.host, "mail.corp.example.com");
        assert_eq!(parsed.port, 587);
    }
}
