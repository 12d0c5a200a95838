//! Bounded scheduler.
//!
//! Runs admitted tasks on the tokio runtime while guaranteeing that at most
//! `limit` of them execute at the same time. Tasks beyond the ceiling wait
//! for a free slot. By default any number of tasks can wait; with a queue
//! capacity, [`Scheduler::admit`] itself waits once `limit + capacity` tasks
//! are outstanding, pushing back on the caller.
//!
//! Admitted tasks always run to completion. There is no priority and no
//! fairness guarantee between waiting tasks.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use ccv_config::EngineConfig;
use tokio::{sync::Semaphore, task::JoinHandle};
use tracing::debug;

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Scheduler {
    limit: usize,
    slots: Arc<Semaphore>,
    /// Bounds running plus waiting tasks when a queue capacity is set.
    admissions: Option<Arc<Semaphore>>,
}

impl Scheduler {
    /// Scheduler running at most `limit` tasks at once, with unbounded queuing.
    ///
    /// `limit` is clamped to what a tokio semaphore can hold.
    pub fn new(limit: usize) -> Self {
        let limit = limit.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            limit,
            slots: Arc::new(Semaphore::new(limit)),
            admissions: None,
        }
    }

    /// Scheduler that also bounds the number of tasks waiting for a slot.
    pub fn with_queue_capacity(limit: usize, capacity: usize) -> Self {
        let mut scheduler = Self::new(limit);
        let admissions = scheduler
            .limit
            .saturating_add(capacity)
            .min(Semaphore::MAX_PERMITS);
        scheduler.admissions = Some(Arc::new(Semaphore::new(admissions)));
        scheduler
    }

    /// Scheduler sized from configuration and the host's processor count.
    pub fn from_config(config: &EngineConfig) -> Self {
        let limit = config.concurrency_limit(num_cpus::get());
        match config.queue_capacity {
            Some(capacity) => Self::with_queue_capacity(limit, capacity),
            None => Self::new(limit),
        }
    }

    /// Maximum number of tasks executing at once.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Slots currently free for execution.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Admit `task` for execution.
    ///
    /// Returns as soon as the task is queued (or, with a queue capacity, as
    /// soon as there is room to queue it). The returned [`Admission`] resolves
    /// to the task's output once it has run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ccv_engine::scheduler::Scheduler;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let scheduler = Scheduler::new(2);
    ///     let admission = scheduler.admit(async { 40 + 2 }).await.unwrap();
    ///     assert_eq!(admission.await.unwrap(), 42);
    /// }
    /// ```
    pub async fn admit<F, T>(&self, task: F) -> Result<Admission<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let admitted = match &self.admissions {
            Some(admissions) => Some(
                Arc::clone(admissions)
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::SchedulerClosed)?,
            ),
            None => None,
        };
        let slots = Arc::clone(&self.slots);

        let handle = tokio::spawn(async move {
            let _admitted = admitted;
            let _slot = Arc::clone(&slots)
                .acquire_owned()
                .await
                .map_err(|_| Error::SchedulerClosed)?;
            debug!("Task started, {} slots left", slots.available_permits());
            Ok(task.await)
        });

        Ok(Admission { handle })
    }

    /// Stop admitting new tasks. Tasks already running finish normally,
    /// tasks still waiting for a slot resolve to [`Error::SchedulerClosed`].
    pub fn close(&self) {
        self.slots.close();
        if let Some(admissions) = &self.admissions {
            admissions.close();
        }
    }
}

/// Pending result of an admitted task.
#[derive(Debug)]
pub struct Admission<T> {
    handle: JoinHandle<Result<T>>,
}

impl<T> Future for Admission<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.unwrap_or_else(|err| Err(Error::from(err))))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use tokio::{sync::oneshot, time::timeout};

    use super::*;

    /// Counts how many stub tasks are inside their critical section at once.
    #[derive(Default)]
    struct ConcurrencyProbe {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ConcurrencyProbe {
        async fn work(&self, duration: Duration) {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(duration).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_exceeds_limit() {
        let scheduler = Scheduler::new(3);
        let probe = Arc::new(ConcurrencyProbe::default());

        let mut admissions = Vec::new();
        for i in 0..40 {
            let probe = Arc::clone(&probe);
            let admission = scheduler
                .admit(async move {
                    probe.work(Duration::from_millis(5)).await;
                    i
                })
                .await
                .unwrap();
            admissions.push(admission);
        }

        let mut outputs = Vec::new();
        for admission in admissions {
            outputs.push(admission.await.unwrap());
        }

        assert_eq!(outputs, (0..40).collect::<Vec<_>>());
        assert!(probe.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(probe.peak.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.available_slots(), 3);
    }

    #[tokio::test]
    async fn default_limit_from_processors() {
        let config = EngineConfig {
            processors: Some(4),
            ..Default::default()
        };
        assert_eq!(Scheduler::from_config(&config).limit(), 9);
        assert_eq!(Scheduler::new(0).limit(), 1);
    }

    #[tokio::test]
    async fn oversized_limits_are_clamped() {
        let config = EngineConfig {
            processors: Some(usize::MAX),
            queue_capacity: Some(i64::MAX as usize),
            ..Default::default()
        };
        let scheduler = Scheduler::from_config(&config);
        assert_eq!(scheduler.limit(), Semaphore::MAX_PERMITS);

        let admission = scheduler.admit(async { 7 }).await.unwrap();
        assert_eq!(admission.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn bounded_queue_applies_backpressure() {
        let scheduler = Scheduler::with_queue_capacity(1, 1);
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let running = scheduler
            .admit(async move {
                let _ = release_rx.await;
            })
            .await
            .unwrap();
        let queued = scheduler.admit(async {}).await.unwrap();

        // One running and one waiting, a third admission has to wait
        assert!(
            timeout(Duration::from_millis(50), scheduler.admit(async {}))
                .await
                .is_err()
        );

        release_tx.send(()).unwrap();
        running.await.unwrap();
        queued.await.unwrap();

        let third = timeout(Duration::from_millis(500), scheduler.admit(async { 3 }))
            .await
            .expect("Admission should not block once the queue drained")
            .unwrap();
        assert_eq!(third.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn unbounded_queue_admits_immediately() {
        let scheduler = Scheduler::new(1);
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let running = scheduler
            .admit(async move {
                let _ = release_rx.await;
            })
            .await
            .unwrap();

        let mut waiting = Vec::new();
        for _ in 0..100 {
            let admission = timeout(Duration::from_millis(50), scheduler.admit(async {}))
                .await
                .expect("Admission should never block without a queue capacity")
                .unwrap();
            waiting.push(admission);
        }

        release_tx.send(()).unwrap();
        running.await.unwrap();
        for admission in waiting {
            admission.await.unwrap();
        }
    }

    #[tokio::test]
    async fn panicking_task_is_reported() {
        let scheduler = Scheduler::new(1);
        let admission = scheduler
            .admit(async {
                panic!("compiler exploded");
            })
            .await
            .unwrap();

        match admission.await {
            Err(Error::TaskPanicked(message)) => assert_eq!(message, "compiler exploded"),
            other => panic!("Expected TaskPanicked, got {:?}", other),
        }

        // The slot was released by the panicking task
        let next = scheduler.admit(async { 1 }).await.unwrap();
        assert_eq!(next.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn closed_scheduler_rejects_waiting_tasks() {
        let scheduler = Scheduler::with_queue_capacity(1, 4);
        let (started_tx, started_rx) = oneshot::channel::<()>();
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let running = scheduler
            .admit(async move {
                let _ = started_tx.send(());
                let _ = release_rx.await;
                1
            })
            .await
            .unwrap();
        let waiting = scheduler.admit(async { 2 }).await.unwrap();

        started_rx.await.unwrap();
        scheduler.close();
        release_tx.send(()).unwrap();

        assert_eq!(running.await.unwrap(), 1);
        assert!(matches!(waiting.await, Err(Error::SchedulerClosed)));
        assert!(matches!(
            scheduler.admit(async { 3 }).await,
            Err(Error::SchedulerClosed)
        ));
    }
}
