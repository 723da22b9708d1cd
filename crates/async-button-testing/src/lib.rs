//! Deterministic testing utilities for the async-button control.
//!
//! [`ManualClock`] replaces wall time with an explicitly advanced milli
//! counter, and [`TestLoop`] bundles it with a runtime so tests can express
//! scenarios as "activate, advance 150 ms, assert".

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_button_core::{Clock, Runtime, RuntimeHandle, RuntimeScheduler};

/// Clock whose time only moves when a test advances it.
#[derive(Clone, Default)]
pub struct ManualClock {
    now_millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_millis(&self) -> u64 {
        self.now_millis.load(Ordering::SeqCst)
    }

    pub fn advance(&self, millis: u64) {
        self.now_millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    type Instant = u64;

    fn now(&self) -> u64 {
        self.now_millis()
    }

    fn elapsed_millis(&self, since: u64) -> u64 {
        self.now_millis().saturating_sub(since)
    }
}

/// Scheduler that records wake requests without waking anything.
#[derive(Default)]
pub struct RecordingScheduler {
    wake_requested: AtomicBool,
}

impl RecordingScheduler {
    pub fn take_wake_request(&self) -> bool {
        self.wake_requested.swap(false, Ordering::SeqCst)
    }
}

impl RuntimeScheduler for RecordingScheduler {
    fn schedule_wake(&self) {
        self.wake_requested.store(true, Ordering::SeqCst);
    }
}

/// Runtime plus manual clock, pumped explicitly from test code.
pub struct TestLoop {
    runtime: Runtime,
    scheduler: Arc<RecordingScheduler>,
    clock: ManualClock,
}

impl TestLoop {
    pub fn new() -> Self {
        let scheduler = Arc::new(RecordingScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        Self {
            runtime,
            scheduler,
            clock: ManualClock::new(),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    pub fn take_wake_request(&self) -> bool {
        self.scheduler.take_wake_request()
    }

    /// Processes everything runnable at the current manual time.
    pub fn pump(&self) {
        self.runtime.handle().pump(self.clock.now_millis());
    }

    /// Moves time forward and processes everything that became due.
    ///
    /// Timers fire one deadline at a time with full settling in between, so
    /// a single large advance behaves like many small ones.
    pub fn advance(&self, millis: u64) {
        self.clock.advance(millis);
        self.pump();
    }
}

impl Default for TestLoop {
    fn default() -> Self {
        Self::new()
    }
}

pub mod prelude {
    pub use crate::{ManualClock, RecordingScheduler, TestLoop};
}
