use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::runtime::{RuntimeHandle, TaskId};

/// Cooperative cancellation signal handed to a spawned future.
///
/// Long-running work can check [`TaskScope::is_active`] between steps and
/// bail out early; the runtime never preempts a future mid-poll.
#[derive(Clone)]
pub struct TaskScope {
    active: Arc<AtomicBool>,
}

impl TaskScope {
    pub(crate) fn new(active: Arc<AtomicBool>) -> Self {
        Self { active }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Owner handle for a spawned task.
///
/// Dropping the handle cancels the task: the future is removed from the
/// executor and dropped on the spot, which runs any scope-exit cleanup the
/// future owns.
pub struct TaskHandle {
    runtime: RuntimeHandle,
    id: Option<TaskId>,
    active: Arc<AtomicBool>,
}

impl TaskHandle {
    pub(crate) fn new(runtime: RuntimeHandle, id: TaskId, active: Arc<AtomicBool>) -> Self {
        Self {
            runtime,
            id: Some(id),
            active,
        }
    }

    pub(crate) fn detached(runtime: RuntimeHandle, active: Arc<AtomicBool>) -> Self {
        Self {
            runtime,
            id: None,
            active,
        }
    }

    /// Cancels the task now instead of waiting for the handle to drop.
    pub fn cancel(mut self) {
        self.cancel_in_place();
    }

    fn cancel_in_place(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(id) = self.id.take() {
            self.runtime.cancel_task(id);
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel_in_place();
    }
}
