//! Directory connection settings.

use serde::{Deserialize, Serialize};

/// Default LDAP port for plain and StartTLS connections.
pub const DEFAULT_LDAP_PORT: u16 = 389;

fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings for an Active Directory server.
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectorySettings {
    /// Server address: a hostname, `host:port`, or a full `ldap://` /
    /// `ldaps://` URL.
    pub server: String,

    /// Bind DN or UPN used for the simple bind.
    pub bind_dn: String,

    /// Bind password.
    pub bind_password: String,

    /// Upgrade the plain connection with StartTLS before binding.
    #[serde(default)]
    pub starttls: bool,

    /// Connect timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for DirectorySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySettings")
            .field("server", &self.server)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &"***REDACTED***")
            .field("starttls", &self.starttls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl DirectorySettings {
    /// Create settings with the given server, bind identity and password.
    pub fn new(
        server: impl Into<String>,
        bind_dn: impl Into<String>,
        bind_password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            bind_dn: bind_dn.into(),
            bind_password: bind_password.into(),
            starttls: false,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Enable or disable the StartTLS upgrade.
    #[must_use]
    pub fn with_starttls(mut self, starttls: bool) -> Self {
        self.starttls = starttls;
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Normalize the configured server address into an LDAP URL.
    ///
    /// A full `ldap://` or `ldaps://` URL passes through unchanged. A bare
    /// `host` gets the default port; `host:port` keeps its port.
    #[must_use]
    pub fn url(&self) -> String {
        let server = self.server.trim();
        if server.starts_with("ldap://") || server.starts_with("ldaps://") {
            return server.to_string();
        }
        if server.contains(':') {
            format!("ldap://{server}")
        } else {
            format!("ldap://{server}:{DEFAULT_LDAP_PORT}")
        }
    }
}
