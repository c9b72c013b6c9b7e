use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info, warn};
use unseeded_config::{AppConfig, LoggingSettings, config_path_from_env, load_from_path};
use unseeded_core::{CancelFlag, Connector, HttpConnector};
use unseeded_telemetry::{DEFAULT_LOG_LEVEL, FileLogConfig, LogFormat, LoggingConfig};

use crate::cycle::run_cycle;
use crate::error::{AppError, AppResult};

/// Environment variable overriding the rolling log directory.
pub const LOG_DIR_ENV: &str = "UNSEEDED_LOG_DIR";
const LOG_FILE_PREFIX: &str = "unseeded";

/// Dependencies required to run the scheduler.
pub(crate) struct BootstrapDependencies {
    logging: LoggingConfig,
    config_path: PathBuf,
    config: AppConfig,
    connector: Arc<dyn Connector>,
}

impl BootstrapDependencies {
    /// Load the configuration named by the environment; failures are fatal.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config_path = config_path_from_env();
        let config = load_from_path(&config_path)
            .map_err(|err| AppError::config("config.load", &config_path, err))?;
        let log_dir = std::env::var_os(LOG_DIR_ENV).map(PathBuf::from);
        Ok(Self {
            logging: logging_config(&config.logging, log_dir),
            config_path,
            config,
            connector: Arc::new(HttpConnector),
        })
    }
}

/// Translate the document's logging block into subscriber settings.
pub(crate) fn logging_config(settings: &LoggingSettings, env_dir: Option<PathBuf>) -> LoggingConfig {
    let level = settings
        .level
        .as_deref()
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string();
    let file = env_dir
        .or_else(|| settings.directory.clone())
        .map(|directory| FileLogConfig {
            directory,
            prefix: LOG_FILE_PREFIX.to_string(),
        });
    LoggingConfig {
        level,
        format: LogFormat::from_setting(settings.format.as_deref()),
        file,
    }
}

/// Entry point for the detector: load config, install logging, run cycles
/// until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the initial configuration cannot be loaded or logging
/// cannot be installed.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let _logging_guard = unseeded_telemetry::init_logging(&dependencies.logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    let BootstrapDependencies {
        logging: _,
        config_path,
        config,
        connector,
    } = dependencies;

    info!(
        config = %config_path.display(),
        mode = if config.enable_auto_remove { "auto-remove" } else { "report-only" },
        scope = if config.global_scan.enabled { "global" } else { "per-service" },
        interval_minutes = config.check_interval_minutes,
        services = config.services.len(),
        notifications = %config.notification_type,
        "unseeded detector starting"
    );

    let cancel = CancelFlag::new();
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let signal_task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
            let _ = shutdown_tx.send(());
        }
    });

    let mut period = config.check_interval();
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut current = config;
    let mut first_cycle = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown_rx => break,
        }
        if cancel.is_cancelled() {
            break;
        }

        if !first_cycle {
            match reload(&config_path) {
                Some(config) => current = config,
                None => continue,
            }
        }
        first_cycle = false;

        run_cycle(&current, connector.as_ref(), &cancel).await;

        let next = current.check_interval();
        if next != period {
            info!(
                interval_minutes = current.check_interval_minutes,
                "check interval changed"
            );
            period = next;
            ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }
    }

    signal_task.abort();
    info!("unseeded detector stopped");
    Ok(())
}

fn reload(path: &Path) -> Option<AppConfig> {
    match load_from_path(path) {
        Ok(config) => Some(config),
        Err(err) => {
            error!(
                config = %path.display(),
                error = %err,
                detail = ?err,
                "failed to reload configuration; skipping cycle"
            );
            None
        }
    }
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => info!("received SIGINT; shutting down"),
        () = terminate => info!("received SIGTERM; shutting down"),
    }
}
