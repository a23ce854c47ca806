//! Aggregated progress of concurrently running tasks.
//!
//! Every task reports `(value, max)` under an id obtained from
//! [`TaskProgress::next_id`]. After each change the combined progress of all
//! live tasks is handed to a [`ProgressSink`], e.g. a taskbar button. A task
//! that stops reporting for [`STALE_AFTER`] is assumed dead and dropped.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

/// How long a task may go without an update before it is dropped.
pub const STALE_AFTER: Duration = Duration::from_secs(15);

pub type TaskId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressReport {
    /// No task is running.
    Idle,
    /// `completed` out of `total` percent points, summed over all live tasks.
    Active { completed: u64, total: u64 },
}

pub trait ProgressSink {
    fn report(&self, report: ProgressReport);
}

/// Discards all reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSink;

impl ProgressSink for NoSink {
    fn report(&self, _report: ProgressReport) {}
}

type Clock = Box<dyn Fn() -> Instant + Send + Sync>;

#[derive(Debug)]
struct Tasks {
    next_id: TaskId,
    percentages: BTreeMap<TaskId, (Instant, u64)>,
}

/// Tracks task progress for one progress indicator.
///
/// Construct one per indicator and share it by reference; call
/// [`shutdown`](Self::shutdown) before the indicator goes away.
pub struct TaskProgress<S> {
    tasks: Mutex<Tasks>,
    sink: S,
    clock: Clock,
}

impl<S: ProgressSink> TaskProgress<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self::with_clock(sink, Instant::now)
    }

    #[must_use]
    pub fn with_clock<C>(sink: S, clock: C) -> Self
    where
        C: Fn() -> Instant + Send + Sync + 'static,
    {
        Self {
            tasks: Mutex::new(Tasks {
                next_id: 1,
                percentages: BTreeMap::new(),
            }),
            sink,
            clock: Box::new(clock),
        }
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Hand out a fresh task id.
    #[must_use]
    pub fn next_id(&self) -> TaskId {
        let mut tasks = self.lock();
        let id = tasks.next_id;
        tasks.next_id = tasks.next_id.wrapping_add(1);
        id
    }

    /// Record that task `id` is at `value` of `max`. Reaching `max` finishes the task.
    pub fn update(&self, id: TaskId, value: u64, max: u64) {
        let mut tasks = self.lock();

        if max == 0 || value >= max {
            tasks.percentages.remove(&id);
        } else {
            let percent = value.saturating_mul(100) / max;
            tasks.percentages.insert(id, ((self.clock)(), percent));
        }

        self.publish(&mut tasks);
    }

    /// Stop tracking task `id`.
    pub fn forget(&self, id: TaskId) {
        let mut tasks = self.lock();
        tasks.percentages.remove(&id);
        self.publish(&mut tasks);
    }

    /// Number of tasks currently tracked, including stale ones not yet expired.
    #[must_use]
    pub fn active(&self) -> usize {
        self.lock().percentages.len()
    }

    /// Drop every task and report [`ProgressReport::Idle`].
    pub fn shutdown(&self) {
        let mut tasks = self.lock();
        tasks.percentages.clear();
        self.sink.report(ProgressReport::Idle);
    }

    fn lock(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, tasks: &mut Tasks) {
        let now = (self.clock)();

        tasks.percentages.retain(|id, (updated, _)| {
            let idle = now.saturating_duration_since(*updated);
            let alive = idle < STALE_AFTER;
            if !alive {
                debug!(task = *id, "no progress in {}s, dropping task", idle.as_secs());
            }
            alive
        });

        let report = if tasks.percentages.is_empty() {
            ProgressReport::Idle
        } else {
            ProgressReport::Active {
                completed: tasks.percentages.values().map(|(_, percent)| percent).sum(),
                total: tasks.percentages.len() as u64 * 100,
            }
        };

        self.sink.report(report);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        reports: Mutex<Vec<ProgressReport>>,
    }

    impl Recorder {
        fn last(&self) -> Option<ProgressReport> {
            self.reports.lock().unwrap().last().copied()
        }
    }

    impl ProgressSink for Recorder {
        fn report(&self, report: ProgressReport) {
            self.reports.lock().unwrap().push(report);
        }
    }

    /// A clock that only moves when told to.
    fn manual_clock() -> (Arc<Mutex<Instant>>, impl Fn() -> Instant + Send + Sync + 'static) {
        let now = Arc::new(Mutex::new(Instant::now()));
        let handle = Arc::clone(&now);
        (now, move || *handle.lock().unwrap())
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let progress = TaskProgress::new(NoSink);
        assert_eq!(progress.next_id(), 1);
        assert_eq!(progress.next_id(), 2);
        assert_eq!(progress.next_id(), 3);
    }

    #[test]
    fn reports_sum_of_percentages() {
        let progress = TaskProgress::new(Recorder::default());
        let download = progress.next_id();
        let install = progress.next_id();

        progress.update(download, 50, 200);
        progress.update(install, 3, 4);

        assert_eq!(
            progress.sink().last(),
            Some(ProgressReport::Active {
                completed: 100,
                total: 200
            })
        );
    }

    #[test]
    fn finished_task_is_dropped() {
        let progress = TaskProgress::new(Recorder::default());
        let id = progress.next_id();

        progress.update(id, 10, 100);
        progress.update(id, 100, 100);

        assert_eq!(progress.active(), 0);
        assert_eq!(progress.sink().last(), Some(ProgressReport::Idle));
    }

    #[test]
    fn zero_max_counts_as_finished() {
        let progress = TaskProgress::new(Recorder::default());
        progress.update(progress.next_id(), 0, 0);

        assert_eq!(progress.active(), 0);
    }

    #[test]
    fn forget_removes_task() {
        let progress = TaskProgress::new(Recorder::default());
        let first = progress.next_id();
        let second = progress.next_id();
        progress.update(first, 1, 4);
        progress.update(second, 1, 2);

        progress.forget(first);

        assert_eq!(
            progress.sink().last(),
            Some(ProgressReport::Active {
                completed: 50,
                total: 100
            })
        );
    }

    #[test]
    fn stale_tasks_expire() {
        let (now, clock) = manual_clock();
        let progress = TaskProgress::with_clock(Recorder::default(), clock);
        let stuck = progress.next_id();
        let busy = progress.next_id();

        progress.update(stuck, 20, 100);
        *now.lock().unwrap() += Duration::from_secs(10);
        progress.update(busy, 40, 100);
        *now.lock().unwrap() += Duration::from_secs(6);
        progress.update(busy, 60, 100);

        assert_eq!(progress.active(), 1);
        assert_eq!(
            progress.sink().last(),
            Some(ProgressReport::Active {
                completed: 60,
                total: 100
            })
        );
    }

    #[test]
    fn shutdown_reports_idle() {
        let progress = TaskProgress::new(Recorder::default());
        progress.update(progress.next_id(), 1, 3);

        progress.shutdown();

        assert_eq!(progress.active(), 0);
        assert_eq!(progress.sink().last(), Some(ProgressReport::Idle));
    }

    #[test]
    fn shared_between_threads() {
        let progress = Arc::new(TaskProgress::new(Recorder::default()));

        let handles = (0..4)
            .map(|_| {
                let progress = Arc::clone(&progress);
                std::thread::spawn(move || {
                    let id = progress.next_id();
                    progress.update(id, 1, 2);
                    id
                })
            })
            .collect::<Vec<_>>();

        let mut ids = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 4);
        assert_eq!(progress.active(), 4);
    }
}
