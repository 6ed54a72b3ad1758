// Monitor loop
//
// Drives a detection strategy on a fixed schedule until a deadline, and
// reports lifecycle and per-poll events to an EventSink.

use crate::metrics::Metrics;
use crate::models::DownloadStatusRecord;
use crate::strategy::DetectionStrategy;
use camino::{Utf8Path, Utf8PathBuf};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, SystemTime};
use tokio::time::Instant;

/// Shortest pause between polls.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Deadline used when `now + duration` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// How long to monitor and how often to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub duration: Duration,
    pub interval: Duration,
    /// Stop after the first poll regardless of `duration`
    pub single_poll: bool,
}

impl Schedule {
    /// `interval` is raised to [`MIN_INTERVAL`] if shorter.
    pub fn new(duration: Duration, interval: Duration) -> Self {
        Self {
            duration,
            interval: interval.max(MIN_INTERVAL),
            single_poll: false,
        }
    }

    pub fn once() -> Self {
        Self {
            duration: Duration::ZERO,
            interval: Duration::ZERO,
            single_poll: true,
        }
    }
}

/// Events emitted by the monitor loop, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum MonitorEvent {
    /// No install root; nothing was polled
    InstallNotFound,

    /// The loop is about to poll for the first time
    Started {
        install_root: Utf8PathBuf,
        source: String,
        schedule: Schedule,
        /// Set when the strategy is missing an input it will wait for
        warning: Option<String>,
    },

    /// One poll cycle finished; `records` may be empty
    Polled {
        poll: u64,
        records: Vec<DownloadStatusRecord>,
    },

    /// The deadline was reached
    Completed { polls: u64 },

    /// The operator interrupted the loop
    Interrupted { polls: u64 },
}

/// Consumer of monitor events (the presentation layer).
pub trait EventSink {
    fn emit(&mut self, event: MonitorEvent);
}

impl EventSink for Vec<MonitorEvent> {
    fn emit(&mut self, event: MonitorEvent) {
        self.push(event);
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    InstallNotFound,
    Completed { polls: u64 },
    Interrupted { polls: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Polls a detection strategy until the schedule's deadline.
///
/// The loop owns the strategy, and with it the log cursor and size samples.
/// Without an install root no strategy is ever built, so nothing is read.
pub struct MonitorLoop {
    install_root: Option<Utf8PathBuf>,
    strategy: Option<Box<dyn DetectionStrategy>>,
    schedule: Schedule,
    state: LoopState,
    metrics: Metrics,
}

impl MonitorLoop {
    /// Creates the loop; `build` is only called when `install_root` is known.
    pub fn new<F>(install_root: Option<Utf8PathBuf>, schedule: Schedule, build: F) -> Self
    where
        F: FnOnce(&Utf8Path) -> Box<dyn DetectionStrategy>,
    {
        let strategy = install_root.as_deref().map(build);
        Self {
            install_root,
            strategy,
            schedule,
            state: LoopState::Stopped,
            metrics: Metrics::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Runs to completion, or until `shutdown` resolves.
    ///
    /// `shutdown` is checked after every poll (single-poll mode included) and
    /// while waiting between polls; a poll in progress always finishes first.
    pub async fn run<S>(&mut self, sink: &mut dyn EventSink, shutdown: S) -> MonitorOutcome
    where
        S: Future<Output = ()>,
    {
        let (Some(install_root), Some(strategy)) =
            (self.install_root.clone(), self.strategy.as_mut())
        else {
            tracing::error!("Steam installation not found, monitor not started");
            sink.emit(MonitorEvent::InstallNotFound);
            self.state = LoopState::Stopped;
            return MonitorOutcome::InstallNotFound;
        };

        tokio::pin!(shutdown);

        let schedule = self.schedule;
        let deadline = deadline_after(Instant::now(), schedule.duration);
        let mut polls = 0u64;
        let mut interrupted = false;

        self.state = LoopState::Running;
        tracing::info!(
            "Monitoring {} ({} strategy) for {:?}, polling every {:?}",
            install_root,
            strategy.kind(),
            schedule.duration,
            schedule.interval
        );
        sink.emit(MonitorEvent::Started {
            install_root,
            source: strategy.source(),
            schedule,
            warning: strategy.startup_warning(),
        });

        while schedule.single_poll || Instant::now() < deadline {
            polls += 1;
            let records = strategy.poll(SystemTime::now());
            self.metrics.record_poll(&records);
            tracing::info!("Poll #{}: {} record(s)", polls, records.len());
            sink.emit(MonitorEvent::Polled {
                poll: polls,
                records,
            });

            if already_resolved(shutdown.as_mut()).await {
                interrupted = true;
                break;
            }

            if schedule.single_poll {
                break;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            let pause = schedule.interval.min(remaining);
            if pause.is_zero() {
                continue;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    interrupted = true;
                    break;
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }

        self.state = LoopState::Stopped;

        if interrupted {
            tracing::info!("Monitoring interrupted by operator after {} poll(s)", polls);
            sink.emit(MonitorEvent::Interrupted { polls });
            return MonitorOutcome::Interrupted { polls };
        }

        tracing::info!("Monitoring completed after {} poll(s)", polls);
        sink.emit(MonitorEvent::Completed { polls });
        MonitorOutcome::Completed { polls }
    }
}

/// `start + duration`, or a deadline decades away when that overflows.
fn deadline_after(start: Instant, duration: Duration) -> Instant {
    start
        .checked_add(duration)
        .or_else(|| start.checked_add(FAR_FUTURE))
        .unwrap_or(start)
}

/// True if `shutdown` has resolved already; never waits.
async fn already_resolved<S>(shutdown: Pin<&mut S>) -> bool
where
    S: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = shutdown => true,
        _ = std::future::ready(()) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrategyKind;

    struct CountingStrategy {
        polls: u64,
    }

    impl DetectionStrategy for CountingStrategy {
        fn kind(&self) -> StrategyKind {
            StrategyKind::Log
        }

        fn source(&self) -> String {
            "test".to_string()
        }

        fn poll(&mut self, _now: SystemTime) -> Vec<DownloadStatusRecord> {
            self.polls += 1;
            Vec::new()
        }
    }

    fn counting(_root: &Utf8Path) -> Box<dyn DetectionStrategy> {
        Box::new(CountingStrategy { polls: 0 })
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_deadline() {
        let schedule = Schedule::new(Duration::from_secs(60), Duration::from_secs(20));
        let mut monitor = MonitorLoop::new(Some(Utf8PathBuf::from("/steam")), schedule, counting);
        let mut events: Vec<MonitorEvent> = Vec::new();

        let outcome = monitor.run(&mut events, std::future::pending()).await;

        assert_eq!(outcome, MonitorOutcome::Completed { polls: 3 });
        assert_eq!(monitor.state(), LoopState::Stopped);
        assert_eq!(monitor.metrics().polls(), 3);
        assert_eq!(events.last(), Some(&MonitorEvent::Completed { polls: 3 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_poll_mode() {
        let mut monitor =
            MonitorLoop::new(Some(Utf8PathBuf::from("/steam")), Schedule::once(), counting);
        let mut events: Vec<MonitorEvent> = Vec::new();

        let outcome = monitor.run(&mut events, std::future::pending()).await;
        assert_eq!(outcome, MonitorOutcome::Completed { polls: 1 });
    }

    #[tokio::test]
    async fn test_missing_root_never_builds_strategy() {
        let schedule = Schedule::new(Duration::from_secs(60), Duration::from_secs(1));
        let build = |_root: &Utf8Path| -> Box<dyn DetectionStrategy> {
            panic!("strategy must not be built without an install root")
        };
        let mut monitor = MonitorLoop::new(None, schedule, build);
        let mut events: Vec<MonitorEvent> = Vec::new();

        let outcome = monitor.run(&mut events, std::future::pending()).await;
        assert_eq!(outcome, MonitorOutcome::InstallNotFound);
        assert_eq!(events, vec![MonitorEvent::InstallNotFound]);
    }

    #[test]
    fn test_deadline_saturates_instead_of_overflowing() {
        let start = Instant::now();
        let deadline = deadline_after(start, Duration::from_secs(u64::MAX));
        assert!(deadline > start);

        let minute = deadline_after(start, Duration::from_secs(60));
        assert_eq!(minute - start, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_poll_reports_pending_interrupt() {
        let mut monitor =
            MonitorLoop::new(Some(Utf8PathBuf::from("/steam")), Schedule::once(), counting);
        let mut events: Vec<MonitorEvent> = Vec::new();

        let outcome = monitor.run(&mut events, std::future::ready(())).await;
        assert_eq!(outcome, MonitorOutcome::Interrupted { polls: 1 });
        assert_eq!(events.last(), Some(&MonitorEvent::Interrupted { polls: 1 }));
    }
}
