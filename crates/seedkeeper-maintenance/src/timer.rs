//! Repeating timer driving a maintenance task on a dedicated tokio task.
//!
//! The loop wakes every [`POLL_QUANTUM`], runs the task once the interval has
//! elapsed since the previous run finished, and exits on cancellation. A run
//! already in progress is never interrupted.

use std::future::Future;
use std::mem;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// How often the timer loop checks for cancellation and elapsed time.
pub const POLL_QUANTUM: Duration = Duration::from_millis(100);

/// Work executed on every timer tick.
#[async_trait]
pub trait TimerTask: Send + Sync + 'static {
    /// Run one tick. Failures are the task's own concern.
    async fn run(&self);
}

#[async_trait]
impl<F, Fut> TimerTask for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn run(&self) {
        (self)().await;
    }
}

/// Errors raised by timer lifecycle calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// `start` was called after `abort`.
    #[error("timer '{name}' has been stopped and cannot be restarted")]
    Stopped {
        /// Timer name.
        name: &'static str,
    },
    /// `start` was called on a running timer.
    #[error("timer '{name}' is already running")]
    AlreadyRunning {
        /// Timer name.
        name: &'static str,
    },
}

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// Created but not started.
    Idle,
    /// Loop task is active.
    Running,
    /// Aborted; terminal.
    Stopped,
}

enum State {
    Idle,
    Running(JoinHandle<()>),
    Stopped,
}

/// Timer owning one background loop that invokes a [`TimerTask`] at a fixed interval.
pub struct RepeatingTimer {
    name: &'static str,
    interval: Duration,
    task: Arc<dyn TimerTask>,
    cancel: CancellationToken,
    state: Mutex<State>,
}

impl RepeatingTimer {
    /// Create an idle timer.
    #[must_use]
    pub fn new(name: &'static str, interval: Duration, task: Arc<dyn TimerTask>) -> Self {
        Self {
            name,
            interval,
            task,
            cancel: CancellationToken::new(),
            state: Mutex::new(State::Idle),
        }
    }

    /// Timer name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> TimerStatus {
        match *self.lock() {
            State::Idle => TimerStatus::Idle,
            State::Running(_) => TimerStatus::Running,
            State::Stopped => TimerStatus::Stopped,
        }
    }

    /// Spawn the timer loop on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`TimerError::AlreadyRunning`] if the loop is active.
    /// - [`TimerError::Stopped`] if the timer was aborted.
    pub fn start(&self) -> Result<(), TimerError> {
        let mut state = self.lock();
        match *state {
            State::Running(_) => Err(TimerError::AlreadyRunning { name: self.name }),
            State::Stopped => Err(TimerError::Stopped { name: self.name }),
            State::Idle => {
                let handle = tokio::spawn(run_loop(
                    self.name,
                    self.interval,
                    Arc::clone(&self.task),
                    self.cancel.clone(),
                ));
                *state = State::Running(handle);
                debug!(timer = self.name, interval = ?self.interval, "timer started");
                Ok(())
            }
        }
    }

    /// Stop the loop and wait for it to exit.
    ///
    /// An in-flight task run completes first. Only the first call waits; later
    /// or concurrent calls return immediately. Aborting an idle timer moves it
    /// straight to the stopped state.
    pub async fn abort(&self) {
        let handle = match mem::replace(&mut *self.lock(), State::Stopped) {
            State::Running(handle) => Some(handle),
            State::Idle | State::Stopped => None,
        };
        self.cancel.cancel();

        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(timer = self.name, error = %err, "timer loop ended abnormally");
            }
            debug!(timer = self.name, "timer stopped");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_loop(
    name: &'static str,
    interval: Duration,
    task: Arc<dyn TimerTask>,
    cancel: CancellationToken,
) {
    let mut last_run = Instant::now();
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(POLL_QUANTUM) => {}
        }
        if last_run.elapsed() >= interval {
            trace!(timer = name, "timer tick");
            task.run().await;
            last_run = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>) -> Arc<dyn TimerTask> {
        let counter = Arc::clone(counter);
        Arc::new(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_interval() {
        let counter = Arc::new(AtomicUsize::new(0));
        let timer = RepeatingTimer::new("test", Duration::from_secs(1), counting_task(&counter));
        timer.start().expect("start");

        tokio::time::sleep(Duration::from_millis(3_050)).await;
        timer.abort().await;

        let ticks = counter.load(Ordering::SeqCst);
        assert!((2..=4).contains(&ticks), "observed {ticks} ticks");
        assert_eq!(timer.status(), TimerStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tasks_never_overlap() {
        let active = Arc::new(AtomicBool::new(false));
        let overlapped = Arc::new(AtomicBool::new(false));
        let runs = Arc::new(AtomicUsize::new(0));
        let task: Arc<dyn TimerTask> = {
            let active = Arc::clone(&active);
            let overlapped = Arc::clone(&overlapped);
            let runs = Arc::clone(&runs);
            Arc::new(move || {
                let active = Arc::clone(&active);
                let overlapped = Arc::clone(&overlapped);
                let runs = Arc::clone(&runs);
                async move {
                    if active.swap(true, Ordering::SeqCst) {
                        overlapped.store(true, Ordering::SeqCst);
                    }
                    tokio::time::sleep(Duration::from_millis(1_500)).await;
                    runs.fetch_add(1, Ordering::SeqCst);
                    active.store(false, Ordering::SeqCst);
                }
            })
        };
        let timer = RepeatingTimer::new("slow", Duration::from_secs(1), task);
        timer.start().expect("start");

        tokio::time::sleep(Duration::from_secs(6)).await;
        timer.abort().await;

        assert!(!overlapped.load(Ordering::SeqCst));
        assert!(runs.load(Ordering::SeqCst) >= 2);
        assert!(!active.load(Ordering::SeqCst), "abort waited for the run");
    }

    #[tokio::test(start_paused = true)]
    async fn abort_is_idempotent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let timer = RepeatingTimer::new("twice", Duration::from_secs(1), counting_task(&counter));
        timer.start().expect("start");
        timer.abort().await;

        let before = Instant::now();
        timer.abort().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn lifecycle_errors() {
        let counter = Arc::new(AtomicUsize::new(0));
        let timer = RepeatingTimer::new("life", Duration::from_secs(60), counting_task(&counter));
        assert_eq!(timer.status(), TimerStatus::Idle);

        timer.start().expect("start");
        assert_eq!(
            timer.start(),
            Err(TimerError::AlreadyRunning { name: "life" })
        );

        timer.abort().await;
        assert_eq!(timer.start(), Err(TimerError::Stopped { name: "life" }));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn aborting_an_idle_timer_stops_it() {
        let counter = Arc::new(AtomicUsize::new(0));
        let timer = RepeatingTimer::new("idle", Duration::from_secs(1), counting_task(&counter));
        timer.abort().await;
        assert_eq!(timer.status(), TimerStatus::Stopped);
        assert!(timer.start().is_err());
    }
}
