//! Owner of the maintenance timers.

use std::sync::Arc;

use seedkeeper_config::{MaintenanceSchedule, SeedingLimits};
use seedkeeper_session::TorrentSession;
use seedkeeper_telemetry::Metrics;
use tracing::info;

use crate::diagnostics::{self, TorrentDiagnostics};
use crate::resume::{self, ResumePersistence};
use crate::seeding::{self, SeedingLimitMonitor};
use crate::timer::{RepeatingTimer, TimerError, TimerStatus};

/// Background maintenance for one session: seeding limits, resume data and
/// optional diagnostics, each on its own timer.
pub struct MaintenanceService {
    timers: Vec<RepeatingTimer>,
}

impl MaintenanceService {
    /// Build the timers enabled by `limits` and `schedule` without starting them.
    ///
    /// The seeding-limit timer is omitted when no limit is configured and the
    /// diagnostics timer when it has no interval.
    #[must_use]
    pub fn new(
        session: &Arc<dyn TorrentSession>,
        limits: SeedingLimits,
        schedule: &MaintenanceSchedule,
        metrics: &Metrics,
    ) -> Self {
        let mut timers = Vec::with_capacity(3);
        if limits.is_enabled() {
            let monitor = SeedingLimitMonitor::new(Arc::clone(session), limits, metrics.clone());
            timers.push(RepeatingTimer::new(
                seeding::TASK_NAME,
                schedule.limits_interval,
                Arc::new(monitor),
            ));
        }

        let persistence = ResumePersistence::new(Arc::clone(session), metrics.clone());
        timers.push(RepeatingTimer::new(
            resume::TASK_NAME,
            schedule.resume_interval,
            Arc::new(persistence),
        ));

        if let Some(interval) = schedule.diagnostics_interval {
            let diagnostics = TorrentDiagnostics::new(Arc::clone(session), metrics.clone());
            timers.push(RepeatingTimer::new(
                diagnostics::TASK_NAME,
                interval,
                Arc::new(diagnostics),
            ));
        }

        Self { timers }
    }

    /// Name and status of every owned timer.
    #[must_use]
    pub fn timers(&self) -> Vec<(&'static str, TimerStatus)> {
        self.timers
            .iter()
            .map(|timer| (timer.name(), timer.status()))
            .collect()
    }

    /// Start every timer.
    ///
    /// # Errors
    ///
    /// Returns the first [`TimerError`]; timers started before it keep running
    /// until [`Self::shutdown`].
    pub fn start(&self) -> Result<(), TimerError> {
        for timer in &self.timers {
            timer.start()?;
        }
        info!(timers = self.timers.len(), "maintenance started");
        Ok(())
    }

    /// Abort every timer and wait for in-flight ticks to finish.
    pub async fn shutdown(&self) {
        for timer in &self.timers {
            timer.abort().await;
        }
        info!("maintenance stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedkeeper_test_support::RecordingSession;
    use std::time::Duration;

    fn session() -> Arc<dyn TorrentSession> {
        Arc::new(RecordingSession::default())
    }

    #[test]
    fn disabled_tasks_get_no_timer() -> anyhow::Result<()> {
        let service = MaintenanceService::new(
            &session(),
            SeedingLimits::default(),
            &MaintenanceSchedule::default(),
            &Metrics::new()?,
        );
        assert_eq!(
            service.timers(),
            vec![(resume::TASK_NAME, TimerStatus::Idle)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn start_and_shutdown_cover_every_timer() -> anyhow::Result<()> {
        let limits = SeedingLimits {
            max_ratio: 2.0,
            ..SeedingLimits::default()
        };
        let schedule = MaintenanceSchedule {
            diagnostics_interval: Some(Duration::from_secs(30)),
            ..MaintenanceSchedule::default()
        };
        let service = MaintenanceService::new(&session(), limits, &schedule, &Metrics::new()?);

        service.start()?;
        assert!(
            service
                .timers()
                .iter()
                .all(|(_, status)| *status == TimerStatus::Running)
        );
        assert!(service.start().is_err());

        service.shutdown().await;
        let names: Vec<_> = service.timers().into_iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec![seeding::TASK_NAME, resume::TASK_NAME, diagnostics::TASK_NAME]
        );
        assert!(
            service
                .timers()
                .iter()
                .all(|(_, status)| *status == TimerStatus::Stopped)
        );
        Ok(())
    }
}
