//! Periodic task scheduler.
//!
//! Each task gets its own tokio task and interval timer, so cadences never
//! block one another, and a task's invocations never overlap because each
//! one runs inline in that task's own loop. Cancellation is cooperative:
//! a tick already running finishes, the next one never starts.

use futures::future::join_all;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    name: String,
    interval: Duration,
    token: CancellationToken,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct ScheduledTask {
    handle: TaskHandle,
    join: JoinHandle<()>,
}

pub struct Scheduler {
    root: CancellationToken,
    tasks: Mutex<Vec<ScheduledTask>>,
    next_id: AtomicU64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Run `task` every `interval`, first after one full interval.
    ///
    /// Must be called from within a tokio runtime. Scheduling after
    /// [`Scheduler::shutdown`] returns an already-cancelled handle.
    pub fn schedule<F>(&self, name: &str, interval: Duration, mut task: F) -> TaskHandle
    where
        F: FnMut() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = self.root.child_token();
        let handle = TaskHandle {
            id,
            name: name.to_string(),
            interval,
            token: token.clone(),
        };

        let task_name = handle.name.clone();
        let period = interval.max(Duration::from_millis(1));
        let join = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!(task = %task_name, "Scheduled task cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if catch_unwind(AssertUnwindSafe(&mut task)).is_err() {
                            tracing::error!(task = %task_name, "Scheduled task panicked; continuing");
                        }
                    }
                }
            }
        });

        tracing::info!(task = %name, interval_ms = interval.as_millis() as u64, "Task scheduled");
        self.tasks.lock().push(ScheduledTask {
            handle: handle.clone(),
            join,
        });
        handle
    }

    /// Stop future invocations of one task. Safe while it is mid-tick.
    pub fn cancel(&self, handle: &TaskHandle) {
        handle.token.cancel();
        self.tasks.lock().retain(|t| t.handle.id != handle.id);
    }

    pub fn active_tasks(&self) -> Vec<TaskHandle> {
        self.tasks
            .lock()
            .iter()
            .filter(|t| !t.handle.token.is_cancelled() && !t.join.is_finished())
            .map(|t| t.handle.clone())
            .collect()
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Cancel everything and wait for in-flight ticks to finish.
    pub async fn shutdown(&self) {
        self.root.cancel();
        let joins: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).map(|t| t.join).collect();
        let count = joins.len();
        for result in join_all(joins).await {
            if let Err(err) = result {
                tracing::warn!(error = %err, "Scheduled task ended abnormally");
            }
        }
        tracing::info!(tasks = count, "Scheduler shut down");
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_runs_at_its_cadence() {
        let scheduler = Scheduler::new();
        let (count, task) = counter();
        scheduler.schedule("count", Duration::from_millis(100), task);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 10);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_cadences_keep_their_ratios() {
        let scheduler = Scheduler::new();
        let (fast, fast_task) = counter();
        let (slow, slow_task) = counter();
        scheduler.schedule("fast", Duration::from_secs(1), fast_task);
        scheduler.schedule("slow", Duration::from_secs(5), slow_task);

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(fast.load(Ordering::SeqCst), 10);
        assert_eq!(slow.load(Ordering::SeqCst), 2);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_only_that_task() {
        let scheduler = Scheduler::new();
        let (a, a_task) = counter();
        let (b, b_task) = counter();
        let handle_a = scheduler.schedule("a", Duration::from_millis(100), a_task);
        scheduler.schedule("b", Duration::from_millis(100), b_task);

        tokio::time::sleep(Duration::from_millis(350)).await;
        scheduler.cancel(&handle_a);
        assert!(handle_a.is_cancelled());
        let a_at_cancel = a.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(a.load(Ordering::SeqCst), a_at_cancel);
        assert_eq!(b.load(Ordering::SeqCst), 8);
        assert_eq!(scheduler.active_tasks().len(), 1);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_twice_is_harmless() {
        let scheduler = Scheduler::new();
        let (_count, task) = counter();
        let handle = scheduler.schedule("x", Duration::from_millis(10), task);
        scheduler.cancel(&handle);
        scheduler.cancel(&handle);
        assert!(scheduler.active_tasks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_all_tasks() {
        let scheduler = Scheduler::new();
        let (a, a_task) = counter();
        let (b, b_task) = counter();
        scheduler.schedule("a", Duration::from_millis(10), a_task);
        scheduler.schedule("b", Duration::from_millis(30), b_task);

        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.shutdown().await;
        assert!(scheduler.is_shut_down());
        let (a_final, b_final) = (a.load(Ordering::SeqCst), b.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(a.load(Ordering::SeqCst), a_final);
        assert_eq!(b.load(Ordering::SeqCst), b_final);
        assert!(scheduler.active_tasks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_after_shutdown_never_runs() {
        let scheduler = Scheduler::new();
        scheduler.shutdown().await;
        let (count, task) = counter();
        let handle = scheduler.schedule("late", Duration::from_millis(10), task);
        assert!(handle.is_cancelled());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_task_keeps_running_and_spares_others() {
        let scheduler = Scheduler::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        scheduler.schedule("boom", Duration::from_millis(100), move || {
            seen.fetch_add(1, Ordering::SeqCst);
            panic!("bad tick");
        });
        let (ok, ok_task) = counter();
        scheduler.schedule("ok", Duration::from_millis(100), ok_task);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(ok.load(Ordering::SeqCst), 3);
        scheduler.shutdown().await;
    }
}
