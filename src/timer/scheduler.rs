use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Identifies one repeating tick registered with a [`Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

/// Owner of repeating tick callbacks
///
/// The countdown never sleeps itself. It asks a scheduler for a repeating
/// tick, gets a handle back, and hands that handle to `cancel` whenever it
/// leaves the ticking state.
pub trait Scheduler {
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
}

/// Runs each tick as a tokio task and delivers fired handles over a channel
pub struct TokioScheduler {
    next_id: u64,
    tasks: HashMap<TickHandle, JoinHandle<()>>,
    tx: UnboundedSender<TickHandle>,
}

impl TokioScheduler {
    /// Create a scheduler plus the receiving end the UI loop drains
    pub fn new() -> (Self, UnboundedReceiver<TickHandle>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_id: 0,
            tasks: HashMap::new(),
            tx,
        };
        (scheduler, rx)
    }

    #[cfg(test)]
    fn active(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            // First tick lands one full period after scheduling
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(handle).is_err() {
                    break; // Receiver gone, app is shutting down
                }
            }
        });

        tracing::debug!(?handle, ?period, "scheduled repeating tick");
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            tracing::debug!(?handle, "cancelled tick");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// Scheduler double that never fires on its own; tests deliver ticks by hand
#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Default)]
    pub struct ManualScheduler {
        next_id: u64,
        pub active: HashSet<TickHandle>,
        pub scheduled: usize,
        pub cancelled: usize,
    }

    impl ManualScheduler {
        /// The single active handle, if exactly one exists
        pub fn only_active(&self) -> Option<TickHandle> {
            if self.active.len() == 1 {
                self.active.iter().next().copied()
            } else {
                None
            }
        }
    }

    impl Scheduler for ManualScheduler {
        fn schedule_repeating(&mut self, _period: Duration) -> TickHandle {
            self.next_id += 1;
            let handle = TickHandle(self.next_id);
            self.active.insert(handle);
            self.scheduled += 1;
            handle
        }

        fn cancel(&mut self, handle: TickHandle) {
            if self.active.remove(&handle) {
                self.cancelled += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let (mut scheduler, mut rx) = TokioScheduler::new();
        let started = Instant::now();
        let handle = scheduler.schedule_repeating(Duration::from_secs(1));

        for expected in 1..=3u64 {
            let fired = rx.recv().await.unwrap();
            assert_eq!(fired, handle);
            let elapsed = started.elapsed();
            assert!(elapsed >= Duration::from_secs(expected));
            assert!(elapsed < Duration::from_secs(expected) + Duration::from_millis(10));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let (mut scheduler, mut rx) = TokioScheduler::new();
        let handle = scheduler.schedule_repeating(Duration::from_secs(1));
        assert_eq!(rx.recv().await, Some(handle));

        scheduler.cancel(handle);
        assert_eq!(scheduler.active(), 0);

        let next = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(next.is_err(), "no tick expected after cancel");
    }

    #[tokio::test(start_paused = true)]
    async fn test_handles_are_distinct() {
        let (mut scheduler, _rx) = TokioScheduler::new();
        let a = scheduler.schedule_repeating(Duration::from_secs(1));
        let b = scheduler.schedule_repeating(Duration::from_secs(1));
        assert_ne!(a, b);
        assert_eq!(scheduler.active(), 2);

        scheduler.cancel(a);
        scheduler.cancel(a);
        assert_eq!(scheduler.active(), 1);
    }
}
