//! Daemon configuration.
//!
//! Loaded once at startup from the environment (a `.env` file is honored)
//! into an immutable [`Config`] that the rest of the process receives
//! explicitly. Variables are only read here; nothing else touches the
//! environment at runtime.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use passwatch_core::age::{OverduePolicy, DEFAULT_THRESHOLD_DAYS};
use passwatch_core::types::SearchScope;
use passwatch_engine::ScanConfig;
use passwatch_ldap::DirectorySettings;
use passwatch_smtp::SmtpSettings;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Immutable daemon configuration.
#[derive(Clone)]
pub struct Config {
    /// Directory address: `host`, `host:port`, or a full `ldap[s]://` URL.
    pub ad_server: String,

    /// Bind identity (DN or UPN).
    pub ad_user: String,

    /// Bind credential.
    pub ad_password: String,

    /// Base DN every search is anchored under.
    pub ad_base_dn: String,

    /// Included OU DNs. Empty means the whole base is scanned.
    pub ad_included_ous: Vec<String>,

    /// Upgrade plain connections with StartTLS before binding.
    pub ad_starttls: bool,

    /// Whole-fetch timeout, also used as the connect timeout.
    pub ad_timeout_secs: u64,

    /// Mail server host.
    pub smtp_server: String,

    /// Mail server port.
    pub smtp_port: u16,

    /// SMTP auth user. Unset means an unauthenticated relay.
    pub smtp_user: Option<String>,

    /// SMTP auth credential. Must be set exactly when the user is.
    pub smtp_password: Option<String>,

    /// From-address on every reminder.
    pub smtp_from_email: String,

    /// Per-send timeout.
    pub smtp_timeout_secs: u64,

    /// Domain suffix for accounts without a mail attribute.
    pub email_domain: String,

    /// Overdue threshold in whole days.
    pub password_age_days: u32,

    /// Seconds between scan cycles. Clamped to at least 1.
    pub check_interval_secs: u64,

    /// Treat accounts whose password was never set as overdue.
    pub notify_never_set: bool,

    /// SQLite state database path.
    pub state_db_path: PathBuf,

    /// Log filter directive.
    pub rust_log: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("ad_server", &self.ad_server)
            .field("ad_user", &self.ad_user)
            .field("ad_password", &"***REDACTED***")
            .field("ad_base_dn", &self.ad_base_dn)
            .field("ad_included_ous", &self.ad_included_ous)
            .field("ad_starttls", &self.ad_starttls)
            .field("ad_timeout_secs", &self.ad_timeout_secs)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field(
                "smtp_password",
                &self.smtp_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("smtp_from_email", &self.smtp_from_email)
            .field("smtp_timeout_secs", &self.smtp_timeout_secs)
            .field("email_domain", &self.email_domain)
            .field("password_age_days", &self.password_age_days)
            .field("check_interval_secs", &self.check_interval_secs)
            .field("notify_never_set", &self.notify_never_set)
            .field("state_db_path", &self.state_db_path)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Config {
    /// Load the configuration from the environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    /// Fails on missing required variables and on values that are present
    /// but unparseable; optional variables fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let ad_server = require_var("AD_SERVER")?;
        let ad_user = require_var("AD_USER")?;
        let ad_password = require_var("AD_PASSWORD")?;
        let ad_base_dn = require_var("AD_BASE_DN")?;
        // Semicolon-separated because OU DNs contain commas.
        let ad_included_ous = optional_var("AD_INCLUDED_OUS")
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|ou| !ou.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let ad_starttls = parse_bool_var("AD_STARTTLS", false)?;
        let ad_timeout_secs = parse_var("AD_TIMEOUT_SECS", 30)?;

        let smtp_server = require_var("SMTP_SERVER")?;
        let smtp_port = parse_var("SMTP_PORT", 587)?;
        let smtp_user = optional_var("SMTP_USER");
        let smtp_password = optional_var("SMTP_PASSWORD");
        if smtp_user.is_some() != smtp_password.is_some() {
            return Err(ConfigError::InvalidValue {
                var: "SMTP_USER".to_string(),
                message: "SMTP_USER and SMTP_PASSWORD must be set together".to_string(),
            });
        }
        let smtp_from_email = require_var("SMTP_FROM_EMAIL")?;
        let smtp_timeout_secs = parse_var("SMTP_TIMEOUT_SECS", 30)?;

        let email_domain = require_var("EMAIL_DOMAIN")?;
        let password_age_days = parse_var("PASSWORD_AGE_DAYS", DEFAULT_THRESHOLD_DAYS)?;
        let check_interval_secs: u64 = parse_var("CHECK_INTERVAL", 3600)?;
        let notify_never_set = parse_bool_var("NOTIFY_NEVER_SET", false)?;
        let state_db_path = optional_var("STATE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("passwatch.db"));
        let rust_log = optional_var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            ad_server,
            ad_user,
            ad_password,
            ad_base_dn,
            ad_included_ous,
            ad_starttls,
            ad_timeout_secs,
            smtp_server,
            smtp_port,
            smtp_user,
            smtp_password,
            smtp_from_email,
            smtp_timeout_secs,
            email_domain,
            password_age_days,
            check_interval_secs: check_interval_secs.max(1),
            notify_never_set,
            state_db_path,
            rust_log,
        })
    }

    /// Directory connection settings for the LDAP client.
    pub fn directory_settings(&self) -> DirectorySettings {
        DirectorySettings::new(
            self.ad_server.clone(),
            self.ad_user.clone(),
            self.ad_password.clone(),
        )
        .with_starttls(self.ad_starttls)
        .with_timeout_secs(self.ad_timeout_secs)
    }

    /// Mail transport settings.
    pub fn smtp_settings(&self) -> SmtpSettings {
        let settings = SmtpSettings::new(self.smtp_server.clone(), self.smtp_from_email.clone())
            .with_port(self.smtp_port)
            .with_timeout_secs(self.smtp_timeout_secs);

        match (&self.smtp_user, &self.smtp_password) {
            (Some(user), Some(password)) => settings.with_credentials(user.clone(), password.clone()),
            _ => settings,
        }
    }

    /// Directory region the scan covers.
    pub fn search_scope(&self) -> SearchScope {
        SearchScope::new(self.ad_base_dn.clone()).with_included_ous(self.ad_included_ous.clone())
    }

    /// Overdue policy for the age evaluator.
    pub fn overdue_policy(&self) -> OverduePolicy {
        OverduePolicy::new(self.password_age_days).with_notify_never_set(self.notify_never_set)
    }

    /// Full scan worker configuration.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            scope: self.search_scope(),
            policy: self.overdue_policy(),
            domain_suffix: self.email_domain.clone(),
            check_interval_secs: self.check_interval_secs,
            fetch_timeout_secs: self.ad_timeout_secs,
            send_timeout_secs: self.smtp_timeout_secs,
        }
    }
}

/// Read a required variable. Unset or blank fails.
fn require_var(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name.to_string())),
    }
}

/// Read an optional variable. Unset and blank both read as absent.
fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional variable, falling back to `default` when unset or
/// blank. A value that is present but unparseable is an error, not a
/// silent fallback.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match optional_var(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: name.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse an optional boolean variable.
fn parse_bool_var(name: &str, default: bool) -> Result<bool, ConfigError> {
    let raw = match optional_var(name) {
        Some(raw) => raw,
        None => return Ok(default),
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            var: name.to_string(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}
