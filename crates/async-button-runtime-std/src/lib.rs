//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform abstraction
//! traits defined in `async-button-core`. Applications construct a
//! [`StdRuntime`] and drive it from their event loop; between pumps they can
//! park on [`StdRuntime::take_wake_request`] and
//! [`StdRuntime::next_timer_deadline`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_button_core::{Clock, Runtime, RuntimeHandle, RuntimeScheduler};

/// Scheduler that records wake requests and forwards them to a host hook.
pub struct StdScheduler {
    wake_requested: AtomicBool,
    wake_hook: RwLock<Option<Arc<dyn Fn() + Send + Sync + 'static>>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            wake_requested: AtomicBool::new(false),
            wake_hook: RwLock::new(None),
        }
    }

    /// Returns whether a wake has been requested since the last call.
    pub fn take_wake_request(&self) -> bool {
        self.wake_requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a hook invoked whenever the runtime requests a wake, e.g.
    /// to unpark an event-loop thread.
    pub fn set_wake_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.wake_hook.write().unwrap() = Some(Arc::new(hook));
    }

    /// Clears any registered wake hook.
    pub fn clear_wake_hook(&self) {
        *self.wake_hook.write().unwrap() = None;
    }

    fn notify(&self) {
        let hook = self.wake_hook.read().unwrap().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field("wake_requested", &self.wake_requested.load(Ordering::SeqCst))
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_wake(&self) {
        self.wake_requested.store(true, Ordering::SeqCst);
        self.notify();
    }
}

/// Clock implementation backed by [`std::time`].
#[derive(Debug, Default, Clone)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn elapsed_millis(&self, since: Self::Instant) -> u64 {
        since.elapsed().as_millis() as u64
    }
}

impl StdClock {
    /// Returns the elapsed time as a [`Duration`] for convenience.
    pub fn elapsed(&self, since: Instant) -> Duration {
        since.elapsed()
    }
}

/// Convenience container bundling the standard scheduler and clock.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
    clock: Arc<StdClock>,
    runtime: Runtime,
    started: Instant,
}

impl StdRuntime {
    /// Creates a new standard runtime instance.
    pub fn new() -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        Self {
            scheduler,
            clock: Arc::new(StdClock),
            runtime,
            started: Instant::now(),
        }
    }

    /// Returns a handle to the runtime.
    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    /// Returns the scheduler implementation.
    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Returns the clock implementation.
    pub fn clock(&self) -> Arc<StdClock> {
        Arc::clone(&self.clock)
    }

    /// Milliseconds elapsed since this runtime was created.
    pub fn now_millis(&self) -> u64 {
        self.clock.elapsed_millis(self.started)
    }

    /// Pumps the runtime at the current wall-clock time.
    pub fn pump(&self) {
        self.runtime.handle().pump(self.now_millis());
    }

    /// Returns whether a wake was requested since the last poll.
    pub fn take_wake_request(&self) -> bool {
        self.scheduler.take_wake_request()
    }

    /// Earliest armed timer deadline in this runtime's milli timeline.
    pub fn next_timer_deadline(&self) -> Option<u64> {
        self.runtime.handle().next_timer_deadline()
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("clock", &self.clock)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use async_button_core::MutableState;

    use super::StdRuntime;

    #[test]
    fn std_runtime_requests_wake_on_spawn_and_runs_tasks() {
        let runtime = StdRuntime::new();
        let handle = runtime.runtime_handle();
        let ran = Rc::new(Cell::new(false));

        handle.spawn_task({
            let ran = ran.clone();
            move || ran.set(true)
        });
        assert!(
            runtime.take_wake_request(),
            "spawn_task should request a wake"
        );

        runtime.pump();
        assert!(ran.get());
    }

    #[test]
    fn state_writes_notify_watchers_synchronously() {
        let runtime = StdRuntime::new();
        let state = MutableState::with_runtime(0, runtime.runtime_handle());
        let seen = Rc::new(Cell::new(0));

        let _sub = state.subscribe({
            let seen = seen.clone();
            move |value| seen.set(*value)
        });

        state.set(7);
        assert_eq!(seen.get(), 7);
    }
}
