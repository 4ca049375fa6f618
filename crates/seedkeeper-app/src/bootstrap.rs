use std::future::Future;
use std::io;
use std::sync::Arc;

use seedkeeper_config::ServiceConfig;
use seedkeeper_maintenance::MaintenanceService;
use seedkeeper_rpc::Dispatcher;
use seedkeeper_session::{StubSession, TorrentSession};
use seedkeeper_telemetry::{LoggingConfig, Metrics};
use tracing::info;

use crate::error::{AppError, AppResult};

/// Build identifier baked in at compile time, `dev` otherwise.
const BUILD_SHA: &str = match option_env!("SEEDKEEPER_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// Dependencies required to bootstrap the daemon.
pub struct BootstrapDependencies {
    config: ServiceConfig,
    session: Arc<dyn TorrentSession>,
    metrics: Metrics,
}

impl BootstrapDependencies {
    /// Assemble dependencies from explicit parts.
    #[must_use]
    pub fn new(config: ServiceConfig, session: Arc<dyn TorrentSession>, metrics: Metrics) -> Self {
        Self {
            config,
            session,
            metrics,
        }
    }

    /// Construct production dependencies from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or metrics cannot be registered.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construct dependencies reading settings through `lookup`.
    ///
    /// The session is the in-memory [`StubSession`] rooted at the configured
    /// download directory.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or metrics cannot be registered.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ServiceConfig::from_lookup(lookup)
            .map_err(|err| AppError::config("config.from_env", err))?;
        let metrics = Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        let session: Arc<dyn TorrentSession> =
            Arc::new(StubSession::new(config.session.download_dir.clone()));
        Ok(Self::new(config, session, metrics))
    }

    /// Loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Running daemon core: the dispatcher a transport mounts plus the maintenance timers.
pub struct ControlPlane {
    dispatcher: Dispatcher,
    maintenance: MaintenanceService,
    metrics: Metrics,
}

impl ControlPlane {
    /// Wire the dispatcher and start maintenance.
    ///
    /// # Errors
    ///
    /// Returns an error if a maintenance timer fails to start.
    pub fn start(dependencies: BootstrapDependencies) -> AppResult<Self> {
        let BootstrapDependencies {
            config,
            session,
            metrics,
        } = dependencies;

        let dispatcher = Dispatcher::new(Arc::clone(&session), metrics.clone());
        let maintenance =
            MaintenanceService::new(&session, config.seeding, &config.schedule, &metrics);
        maintenance
            .start()
            .map_err(|err| AppError::maintenance("maintenance.start", err))?;

        info!(
            max_ratio = config.seeding.max_ratio,
            max_time_hours = config.seeding.max_time_hours,
            expired_action = %config.seeding.expired_action,
            download_dir = %config.session.download_dir,
            "control plane ready"
        );
        Ok(Self {
            dispatcher,
            maintenance,
            metrics,
        })
    }

    /// Dispatcher handle for request transports.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Maintenance timers.
    #[must_use]
    pub const fn maintenance(&self) -> &MaintenanceService {
        &self.maintenance
    }

    /// Shared metrics registry.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Stop every maintenance timer, waiting for in-flight ticks.
    pub async fn shutdown(&self) {
        self.maintenance.shutdown().await;
    }
}

/// Entry point for the daemon: load the environment, install logging and run
/// until Ctrl-C.
///
/// # Errors
///
/// Returns an error if dependency construction, logging setup or startup fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    let logging = &dependencies.config().logging;
    seedkeeper_telemetry::init_logging(&LoggingConfig {
        level: &logging.level,
        format: logging.format,
        build_sha: BUILD_SHA,
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    run_app_with(dependencies, tokio::signal::ctrl_c()).await
}

/// Boot sequence over injected dependencies, stopping when `shutdown_signal` resolves.
///
/// # Errors
///
/// Returns an error if startup fails or the shutdown signal reports an error;
/// maintenance is stopped in either case once it has started.
pub async fn run_app_with<S>(
    dependencies: BootstrapDependencies,
    shutdown_signal: S,
) -> AppResult<()>
where
    S: Future<Output = io::Result<()>>,
{
    info!(build_sha = BUILD_SHA, "seedkeeper starting");
    let control = ControlPlane::start(dependencies)?;

    let signal = shutdown_signal.await;
    info!("shutdown requested");
    control.shutdown().await;

    signal.map_err(|err| AppError::signal("signal.ctrl_c", err))?;
    info!("seedkeeper stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedkeeper_maintenance::TimerStatus;
    use seedkeeper_test_support::RecordingSession;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn invalid_environment_is_a_config_error() {
        let result = BootstrapDependencies::from_lookup(lookup(&[(
            "SEEDKEEPER_MAX_RATIO",
            "plenty",
        )]));
        assert!(matches!(
            result,
            Err(AppError::Config {
                operation: "config.from_env",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn control_plane_serves_calls_and_stops_timers() -> anyhow::Result<()> {
        let dependencies = BootstrapDependencies::from_lookup(lookup(&[
            ("SEEDKEEPER_MAX_RATIO", "2"),
            ("SEEDKEEPER_DOWNLOAD_DIR", "/srv/torrents"),
        ]))?;
        assert_eq!(dependencies.config().session.download_dir, "/srv/torrents");

        let control = ControlPlane::start(dependencies)?;
        let pong = control.dispatcher().call("ping", &[]).await?;
        assert_eq!(pong, json!("pong"));
        assert_eq!(control.metrics().rpc_requests("ping", "ok"), 1);
        assert_eq!(control.maintenance().timers().len(), 2);

        control.shutdown().await;
        assert!(
            control
                .maintenance()
                .timers()
                .iter()
                .all(|(_, status)| *status == TimerStatus::Stopped)
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn run_app_with_returns_after_the_signal() -> anyhow::Result<()> {
        let recorder = Arc::new(RecordingSession::default());
        let dependencies =
            BootstrapDependencies::new(ServiceConfig::default(), recorder.clone(), Metrics::new()?);

        run_app_with(dependencies, async {
            tokio::time::sleep(Duration::from_secs(45)).await;
            Ok(())
        })
        .await?;

        assert_eq!(recorder.resume_saves().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn signal_failures_surface_after_shutdown() -> anyhow::Result<()> {
        let dependencies = BootstrapDependencies::new(
            ServiceConfig::default(),
            Arc::new(RecordingSession::default()),
            Metrics::new()?,
        );
        let result = run_app_with(dependencies, async { Err(io::Error::other("closed")) }).await;
        assert!(matches!(result, Err(AppError::Signal { .. })));
        Ok(())
    }
}
