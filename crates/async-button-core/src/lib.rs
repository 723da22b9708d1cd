#![doc = r"Reactive substrate for the async-button control.

Observable state cells with synchronous, change-triggered watcher
notification, plus a single-threaded cooperative runtime: a deferred-task
queue, a timer queue keyed on host-supplied milli timestamps, and a local
future executor. Hosts drive everything by calling
[`RuntimeHandle::pump`] with their clock's current time."]

pub mod platform;
pub mod runtime;
pub mod state;
pub mod task;
pub mod timer;

pub use platform::{Clock, RuntimeScheduler};
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle};
pub use state::{MutableState, MutationPolicy, NeverEqual, State, StructuralEquality, Subscription};
pub use task::{TaskHandle, TaskScope};
pub use timer::{sleep, Sleep, TimerRegistration};

#[cfg(test)]
pub use runtime::TestScheduler;
