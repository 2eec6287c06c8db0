//! passwatchd: password expiry notification daemon.
//!
//! Polls Active Directory for accounts whose password is older than the
//! configured threshold and emails each one a reminder, at most once per
//! password generation. Runs until SIGINT or SIGTERM.

mod config;
mod logging;

use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use passwatch_engine::ScanWorker;
use passwatch_ldap::LdapDirectory;
use passwatch_smtp::SmtpMailer;
use passwatch_store::SqliteStore;

use crate::config::Config;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values).
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        directory = %config.ad_server,
        mail_server = %config.smtp_server,
        check_interval_secs = config.check_interval_secs,
        threshold_days = config.password_age_days,
        "Starting passwatchd"
    );

    let directory = Arc::new(LdapDirectory::new(config.directory_settings()));

    let mailer = match SmtpMailer::new(&config.smtp_settings()) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            eprintln!("Failed to build the SMTP transport: {e}");
            std::process::exit(1);
        }
    };

    let store = match SqliteStore::open(&config.state_db_path) {
        Ok(store) => {
            info!(path = %config.state_db_path.display(), "Notification store opened");
            store
        }
        Err(e) => {
            eprintln!("Failed to open the notification store: {e}");
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let mut worker = ScanWorker::new(
        directory,
        mailer,
        Box::new(store),
        config.scan_config(),
        cancel.clone(),
    );
    let worker_handle = tokio::spawn(async move {
        worker.run().await;
    });
    info!("Scan worker started");

    shutdown_signal().await;
    cancel.cancel();

    if let Err(e) = worker_handle.await {
        error!("Scan worker task failed: {e}");
    }

    info!("passwatchd stopped");
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                // Fall through - we still want to wait for terminate signal
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                // Wait forever if we can't install the handler
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
