//! Error taxonomy for the scan pipeline
//!
//! One error type per consumed capability, with transient/permanent
//! classification so the orchestrator can pick log levels and the operator
//! can tell a flaky network from a broken configuration.

use thiserror::Error;

/// Error raised by the directory client while fetching user records.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Failed to establish or keep a connection to the directory server.
    #[error("directory connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The bind identity or credential was rejected.
    #[error("directory bind rejected: {message}")]
    Auth { message: String },

    /// The search itself failed (bad base, bad filter, server-side error).
    #[error("directory query failed: {message}")]
    Query {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The fetch did not complete within the configured timeout.
    #[error("directory fetch timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl DirectoryError {
    /// Check if this error is transient and the next cycle may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::Connection { .. } | DirectoryError::Timeout { .. }
        )
    }

    /// Check if this error is permanent and needs operator attention.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::Connection { .. } => "CONNECTION_FAILED",
            DirectoryError::Auth { .. } => "AUTH_FAILED",
            DirectoryError::Query { .. } => "QUERY_FAILED",
            DirectoryError::Timeout { .. } => "FETCH_TIMEOUT",
        }
    }

    // Convenience constructors

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        DirectoryError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source.
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        DirectoryError::Auth {
            message: message.into(),
        }
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        DirectoryError::Query {
            message: message.into(),
            source: None,
        }
    }

    /// Create a query error with source.
    pub fn query_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::Query {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a timeout error.
    pub fn timeout(timeout_secs: u64) -> Self {
        DirectoryError::Timeout { timeout_secs }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Error raised by the mailer while delivering a notification.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Could not reach or negotiate with the mail server.
    #[error("mail server connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server accepted the connection but refused the message.
    #[error("message rejected: {message}")]
    Rejected {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The recipient or sender address could not be parsed.
    #[error("invalid address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    /// The send did not complete within the configured timeout.
    #[error("mail send timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl DeliveryError {
    /// Check if this error is transient and a later cycle may deliver.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DeliveryError::Connection { .. } | DeliveryError::Timeout { .. }
        )
    }

    /// Check if this error is permanent and needs operator attention.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DeliveryError::Connection { .. } => "SMTP_CONNECTION_FAILED",
            DeliveryError::Rejected { .. } => "MESSAGE_REJECTED",
            DeliveryError::InvalidAddress { .. } => "INVALID_ADDRESS",
            DeliveryError::Timeout { .. } => "SEND_TIMEOUT",
        }
    }

    // Convenience constructors

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        DeliveryError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source.
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DeliveryError::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        DeliveryError::Rejected {
            message: message.into(),
            source: None,
        }
    }

    /// Create a rejection error with source.
    pub fn rejected_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DeliveryError::Rejected {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-address error.
    pub fn invalid_address(address: impl Into<String>, message: impl Into<String>) -> Self {
        DeliveryError::InvalidAddress {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(timeout_secs: u64) -> Self {
        DeliveryError::Timeout { timeout_secs }
    }
}

/// Result type for mail delivery.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Error raised by the notification state store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be opened or its schema prepared.
    #[error("failed to open notification store: {message}")]
    Open {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A read or write against an open store failed.
    #[error("notification store I/O failed: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The store contains data that cannot be interpreted.
    #[error("notification store is corrupt: {message}")]
    Corrupt { message: String },
}

impl StoreError {
    /// Check if this error is transient (the next cycle may find the store
    /// healthy again).
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io { .. })
    }

    /// Check if this error is permanent and needs operator attention.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Open { .. } => "STORE_OPEN_FAILED",
            StoreError::Io { .. } => "STORE_IO_FAILED",
            StoreError::Corrupt { .. } => "STORE_CORRUPT",
        }
    }

    // Convenience constructors

    /// Create an open error.
    pub fn open(message: impl Into<String>) -> Self {
        StoreError::Open {
            message: message.into(),
            source: None,
        }
    }

    /// Create an open error with source.
    pub fn open_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::Open {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        StoreError::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source.
    pub fn io_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a corruption error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        StoreError::Corrupt {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_transient_classification() {
        let transient = vec![
            DirectoryError::connection("refused"),
            DirectoryError::timeout(30),
        ];
        for err in transient {
            assert!(
                err.is_transient(),
                "Expected {} to be transient",
                err.error_code()
            );
            assert!(!err.is_permanent());
        }

        let permanent = vec![
            DirectoryError::auth("invalid credentials"),
            DirectoryError::query("bad filter"),
        ];
        for err in permanent {
            assert!(
                err.is_permanent(),
                "Expected {} to be permanent",
                err.error_code()
            );
            assert!(!err.is_transient());
        }
    }

    #[test]
    fn test_delivery_transient_classification() {
        assert!(DeliveryError::connection("refused").is_transient());
        assert!(DeliveryError::timeout(30).is_transient());
        assert!(DeliveryError::rejected("mailbox full").is_permanent());
        assert!(DeliveryError::invalid_address("x", "no domain").is_permanent());
    }

    #[test]
    fn test_store_transient_classification() {
        assert!(StoreError::io("disk full").is_transient());
        assert!(StoreError::open("permission denied").is_permanent());
        assert!(StoreError::corrupt("bad timestamp").is_permanent());
    }

    #[test]
    fn test_error_display() {
        let err = DirectoryError::timeout(30);
        assert_eq!(err.to_string(), "directory fetch timed out after 30 seconds");

        let err = DeliveryError::invalid_address("not-an-address", "missing domain");
        assert_eq!(
            err.to_string(),
            "invalid address 'not-an-address': missing domain"
        );

        let err = StoreError::corrupt("unparseable timestamp for user jdoe");
        assert_eq!(
            err.to_string(),
            "notification store is corrupt: unparseable timestamp for user jdoe"
        );
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::new(std::io::ErrorKind::Other, "underlying error");
        let err = DirectoryError::connection_with_source("failed", source_err);

        assert!(err.is_transient());
        if let DirectoryError::Connection { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("Expected Connection variant");
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(DirectoryError::auth("x").error_code(), "AUTH_FAILED");
        assert_eq!(DeliveryError::rejected("x").error_code(), "MESSAGE_REJECTED");
        assert_eq!(StoreError::corrupt("x").error_code(), "STORE_CORRUPT");
    }
}
