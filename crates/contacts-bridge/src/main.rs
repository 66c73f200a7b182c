// # contacts-bridge - Host Bridge
//
// Thin integration layer between a host process and contacts-core.
// Validation, dispatch and listener rules all live in contacts-core;
// this binary only wires stdio to an `AddressBook`.
//
// The bridge is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the address book from the store registry
// 4. Serving newline-delimited JSON requests on stdin
// 5. Writing responses and contact-changed events to stdout
//
// Logs go to stderr so stdout stays a clean protocol stream.
//
// ## Configuration
//
// - `CONTACTS_STORE_TYPE`: Store backend (memory)
// - `CONTACTS_AUTH_STATUS`: Initial authorization of the memory store
//   (authorized, denied, restricted, not-determined)
// - `CONTACTS_EVENT_CAPACITY`: Unread events buffered per subscriber, for both
//   the store change feed and the observer fan-out (1-65536)
// - `CONTACTS_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export CONTACTS_AUTH_STATUS=not-determined
// echo '{"id":1,"op":"requestAccess"}' | contacts-bridge
// ```

mod protocol;

use anyhow::{Context, Result};
use contacts_core::{
    AddressBook, AuthStatus, ContactsConfig, ListenerConfig, StoreConfig, StoreRegistry,
};
use serde::Serialize;
use std::env;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown (stdin closed or signal)
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum BridgeExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<BridgeExitCode> for ExitCode {
    fn from(code: BridgeExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    store_type: String,
    authorization: AuthStatus,
    event_capacity: usize,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let authorization = match env::var("CONTACTS_AUTH_STATUS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("CONTACTS_AUTH_STATUS '{}' is not valid", raw))?,
            Err(_) => AuthStatus::Authorized,
        };

        let event_capacity = match env::var("CONTACTS_EVENT_CAPACITY") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("CONTACTS_EVENT_CAPACITY '{}' is not a number", raw))?,
            Err(_) => ListenerConfig::default().event_channel_capacity,
        };

        Ok(Self {
            store_type: env::var("CONTACTS_STORE_TYPE").unwrap_or_else(|_| "memory".to_string()),
            authorization,
            event_capacity,
            log_level: env::var("CONTACTS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.store_type.as_str() {
            "memory" => {}
            _ => anyhow::bail!(
                "CONTACTS_STORE_TYPE '{}' is not supported. \
                Supported types: memory",
                self.store_type
            ),
        }

        if !(1..=65536).contains(&self.event_capacity) {
            anyhow::bail!(
                "CONTACTS_EVENT_CAPACITY must be between 1 and 65536. Got: {}",
                self.event_capacity
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "CONTACTS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn contacts_config(&self) -> ContactsConfig {
        ContactsConfig {
            store: StoreConfig::Memory {
                authorization: self.authorization,
                change_feed_capacity: self.event_capacity,
            },
            listener: ListenerConfig {
                event_channel_capacity: self.event_capacity,
            },
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return BridgeExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return BridgeExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return BridgeExitCode::ConfigError.into();
    }

    info!("Starting contacts-bridge");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return BridgeExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_bridge(config).await {
            error!("Bridge error: {:#}", e);
            BridgeExitCode::RuntimeError
        } else {
            BridgeExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Serve requests until stdin closes or a shutdown signal arrives
async fn run_bridge(config: Config) -> Result<()> {
    let registry = StoreRegistry::with_builtin();
    let book = AddressBook::from_registry(&registry, &config.contacts_config())
        .context("failed to build address book")?;

    info!(
        store = %config.store_type,
        authorization = %config.authorization,
        "Address book ready"
    );

    let mut events = book.listener().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    info!("stdin closed, shutting down");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = protocol::handle_line(&book, &line).await;
                write_line(&mut stdout, &response).await?;
            }
            event = events.recv() => match event {
                Ok(event) => write_line(&mut stdout, &event).await?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event writer fell behind, dropping contact-changed events");
                }
                Err(RecvError::Closed) => {
                    debug!("Event channel closed");
                    break;
                }
            },
            signal = &mut shutdown => {
                info!("Received shutdown signal: {}", signal?);
                break;
            }
        }
    }

    if book.listener().is_listening() {
        book.listener().remove()?;
    }

    info!("Shutting down contacts-bridge");
    Ok(())
}

async fn write_line<T: Serialize>(stdout: &mut tokio::io::Stdout, value: &T) -> Result<()> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    stdout.write_all(&line).await?;
    stdout.flush().await?;
    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
