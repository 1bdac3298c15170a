// # zonesyncd - zone synchronization daemon
//
// The daemon is a thin integration layer around zonesync-core:
//
// 1. Read configuration from environment variables
// 2. Initialize tracing and the tokio runtime
// 3. Register the available processors and select one by id
// 4. Drive reconciliation passes on a fixed interval until shutdown
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Worker
// - `ZONESYNC_PROCESSOR`: id of the processor to run (e.g. "froxlor")
// - `ZONESYNC_LOOKUP_INTERVAL`: seconds between passes (default 30)
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn or error (default info)
//
// ### Domain provider (traefik)
// - `ZONESYNC_TRAEFIK_BASE_URI`: base URI of the traefik API
//
// ### Froxlor processor
// - `ZONESYNC_FROXLOR_URI`: base URI of the froxlor panel
// - `ZONESYNC_FROXLOR_KEY`: customer API key
// - `ZONESYNC_FROXLOR_SECRET`: customer API secret
//
// ### IP resolver
// - `ZONESYNC_IP_RESOLVER_URL`: plain-text IPv4 lookup service (optional)
//
// ## Example
//
// ```bash
// export ZONESYNC_PROCESSOR=froxlor
// export ZONESYNC_TRAEFIK_BASE_URI=http://traefik:8080
// export ZONESYNC_FROXLOR_URI=https://panel.example.com
// export ZONESYNC_FROXLOR_KEY=your_key
// export ZONESYNC_FROXLOR_SECRET=your_secret
//
// zonesyncd
// ```

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use zonesync_core::ProcessorRegistry;
use zonesync_core::traits::{DomainProcessor, DomainProvider};
use zonesync_domains_traefik::TraefikApi;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum ExitStatus {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

/// Worker configuration
struct Config {
    processor: String,
    lookup_interval_secs: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            processor: env::var("ZONESYNC_PROCESSOR").unwrap_or_default(),
            lookup_interval_secs: match env::var("ZONESYNC_LOOKUP_INTERVAL") {
                Ok(raw) => raw.parse().map_err(|_| {
                    anyhow::anyhow!("ZONESYNC_LOOKUP_INTERVAL is not a number: '{raw}'")
                })?,
                Err(_) => 30,
            },
            log_level: env::var("ZONESYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.processor.is_empty() {
            anyhow::bail!(
                "ZONESYNC_PROCESSOR is required. \
                Set it via: export ZONESYNC_PROCESSOR=froxlor"
            );
        }

        if self.lookup_interval_secs == 0 {
            anyhow::bail!("ZONESYNC_LOOKUP_INTERVAL must be greater than zero");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitStatus::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e}");
        return ExitStatus::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return ExitStatus::ConfigError.into();
    }

    info!("Starting zonesyncd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return ExitStatus::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => ExitStatus::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {e}");
                ExitStatus::RuntimeError
            }
        }
    })
    .into()
}

/// Run the daemon: wire up provider and processor, then work domains
/// until a shutdown signal arrives.
async fn run_daemon(config: Config) -> Result<()> {
    let registry = ProcessorRegistry::new();

    #[cfg(feature = "froxlor")]
    {
        info!("Registering froxlor processor");
        zonesync_provider_froxlor::register(&registry);
    }

    let mut processor = registry
        .create(&config.processor)
        .map_err(|e| anyhow::anyhow!("failed to create processor '{}': {e}", config.processor))?;

    let provider = TraefikApi::from_env()?;

    info!(
        processor = processor.id(),
        interval_secs = config.lookup_interval_secs,
        "Started listening for domains"
    );

    work_domains(
        &provider,
        processor.as_mut(),
        Duration::from_secs(config.lookup_interval_secs),
    )
    .await;

    Ok(())
}

/// Query the provider and run the processor on every tick until a
/// shutdown signal arrives.
///
/// The first tick fires immediately, so a fresh daemon reconciles right
/// away instead of waiting a full interval. A pass already in flight runs
/// to completion; signals received meanwhile are handled on the next loop
/// iteration.
async fn work_domains(
    provider: &dyn DomainProvider,
    processor: &mut dyn DomainProcessor,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut shutdown = Box::pin(shutdown_signal());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                process_domains(provider, processor).await;
            }
            signal = &mut shutdown => {
                info!(signal, "Received shutdown signal");
                break;
            }
        }
    }

    info!("Stopped listening for domains");
}

/// Retrieve the current domains and forward them to the processor
async fn process_domains(provider: &dyn DomainProvider, processor: &mut dyn DomainProcessor) {
    info!("Querying for domains");
    let domains = provider.domains().await;
    info!(count = domains.len(), "Done querying for domains");
    processor.process(&domains).await;
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to setup SIGTERM handler: {e}");
            return "signal-setup-failed";
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to setup SIGINT handler: {e}");
            return "signal-setup-failed";
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

/// Wait for CTRL-C (fallback for non-Unix platforms)
#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "CTRL-C"
}
