//! Periodic flush scheduling
//!
//! The sink never spawns threads of its own. When the file opens it
//! registers a named repeating callback with a [`FlushScheduler`], and it
//! removes the registration on close. The callback contract is narrow: it
//! may only flush the sink, and it returns false to stop repeating.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Repeating callback; returns false to cancel itself
pub type FlushCallback = Box<dyn FnMut() -> bool + Send>;

/// Cancellable repeating-timer contract consumed by the sink
pub trait FlushScheduler: Send + Sync {
    /// Register a named repeating task, replacing any task already
    /// registered under the same name
    fn register(&self, name: &str, interval: Duration, callback: FlushCallback);

    /// Remove a named task. With `wait` the call blocks until an in-flight
    /// callback finishes; a caller holding a lock the callback needs must
    /// pass `wait = false`, as must a caller on the thread driving the
    /// task's runtime (a current-thread runtime cannot finish the aborted
    /// task while its only thread is blocked here)
    fn unregister(&self, name: &str, wait: bool);
}

/// Tokio-backed [`FlushScheduler`]
///
/// Registration is a silent no-op outside a tokio runtime; the sink still
/// works, with durability coming from urgent flushes and explicit flush
/// calls. Ticks that fall behind are skipped rather than bursted, so at
/// most one invocation of a task is outstanding at any time.
#[derive(Debug, Default)]
pub struct IntervalFlusher {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl IntervalFlusher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlushScheduler for IntervalFlusher {
    fn register(&self, name: &str, interval: Duration, mut callback: FlushCallback) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; consume it
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !callback() {
                    break;
                }
            }
        });
        if let Some(previous) = self.tasks.lock().insert(name.to_string(), task) {
            previous.abort();
        }
    }

    fn unregister(&self, name: &str, wait: bool) {
        let Some(task) = self.tasks.lock().remove(name) else {
            return;
        };
        task.abort();
        if wait {
            // The abort completes on the runtime, not here; poll for it
            // instead of spinning hot
            while !task.is_finished() {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    }
}
