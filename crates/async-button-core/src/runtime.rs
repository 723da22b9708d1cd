use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};
use std::thread::{self, ThreadId};

use ahash::RandomState;
use futures_task::{waker, ArcWake};
use hashbrown::HashMap;

use crate::platform::RuntimeScheduler;
use crate::task::{TaskHandle, TaskScope};
use crate::timer::TimerRegistration;

pub(crate) type TaskId = u64;
pub(crate) type TimerId = u64;

pub(crate) type LocalFuture = Pin<Box<dyn Future<Output = ()> + 'static>>;

struct TaskEntry {
    future: LocalFuture,
    waker: Waker,
    active: Arc<AtomicBool>,
}

struct TimerEntry {
    id: TimerId,
    deadline_millis: u64,
    callback: Box<dyn FnOnce() + 'static>,
}

/// Wakes a suspended task by queueing its id and asking the host to pump.
///
/// This is the only runtime piece that crosses threads: host I/O may complete
/// anywhere, so the ready queue lives behind a mutex and the wake request
/// goes through the scheduler.
struct TaskWaker {
    id: TaskId,
    ready: Arc<Mutex<VecDeque<TaskId>>>,
    scheduler: Arc<dyn RuntimeScheduler>,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.ready.lock().unwrap().push_back(arc_self.id);
        arc_self.scheduler.schedule_wake();
    }
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    ui_thread: ThreadId,
    last_now_millis: Cell<u64>,
    pending_tasks: RefCell<VecDeque<Box<dyn FnOnce() + 'static>>>,
    tasks: RefCell<HashMap<TaskId, TaskEntry, RandomState>>,
    next_task_id: Cell<TaskId>,
    ready: Arc<Mutex<VecDeque<TaskId>>>,
    timers: RefCell<Vec<TimerEntry>>,
    next_timer_id: Cell<TimerId>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            ui_thread: thread::current().id(),
            last_now_millis: Cell::new(0),
            pending_tasks: RefCell::new(VecDeque::new()),
            tasks: RefCell::new(HashMap::default()),
            next_task_id: Cell::new(1),
            ready: Arc::new(Mutex::new(VecDeque::new())),
            timers: RefCell::new(Vec::new()),
            next_timer_id: Cell::new(1),
        }
    }

    fn schedule(&self) {
        self.scheduler.schedule_wake();
    }

    fn assert_ui_thread(&self) {
        assert_eq!(
            thread::current().id(),
            self.ui_thread,
            "runtime accessed from a thread other than its UI thread"
        );
    }

    fn enqueue_task(&self, task: Box<dyn FnOnce() + 'static>) {
        self.pending_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn drain_tasks(&self) -> bool {
        let mut tasks: Vec<Box<dyn FnOnce() + 'static>> = {
            let mut pending = self.pending_tasks.borrow_mut();
            pending.drain(..).collect()
        };
        let drained = !tasks.is_empty();
        for task in tasks.drain(..) {
            task();
        }
        drained
    }

    fn spawn_future(&self, future: LocalFuture, active: Arc<AtomicBool>) -> TaskId {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        let task_waker = Arc::new(TaskWaker {
            id,
            ready: Arc::clone(&self.ready),
            scheduler: Arc::clone(&self.scheduler),
        });
        let entry = TaskEntry {
            future,
            waker: waker(task_waker),
            active,
        };
        self.tasks.borrow_mut().insert(id, entry);
        self.ready.lock().unwrap().push_back(id);
        self.schedule();
        id
    }

    fn remove_task(&self, id: TaskId) {
        // Take the entry out before dropping it: dropping the future runs
        // scope-exit cleanup, which may re-enter the runtime.
        let entry = self.tasks.borrow_mut().remove(&id);
        drop(entry);
    }

    fn poll_ready(&self) -> bool {
        let ready_ids: Vec<TaskId> = {
            let mut ready = self.ready.lock().unwrap();
            ready.drain(..).collect()
        };
        if ready_ids.is_empty() {
            return false;
        }
        for id in ready_ids {
            let entry = self.tasks.borrow_mut().remove(&id);
            let Some(mut entry) = entry else { continue };
            if !entry.active.load(Ordering::SeqCst) {
                drop(entry);
                continue;
            }
            let task_waker = entry.waker.clone();
            let mut cx = Context::from_waker(&task_waker);
            match entry.future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => drop(entry),
                Poll::Pending => {
                    // A task may cancel itself from inside poll; observe the
                    // flag before parking it again.
                    if entry.active.load(Ordering::SeqCst) {
                        self.tasks.borrow_mut().insert(id, entry);
                    } else {
                        drop(entry);
                    }
                }
            }
        }
        true
    }

    fn register_timer(&self, delay_millis: u64, callback: Box<dyn FnOnce() + 'static>) -> TimerId {
        let id = self.next_timer_id.get();
        self.next_timer_id.set(id + 1);
        self.timers.borrow_mut().push(TimerEntry {
            id,
            deadline_millis: self.last_now_millis.get() + delay_millis,
            callback,
        });
        self.schedule();
        id
    }

    fn cancel_timer(&self, id: TimerId) {
        let mut timers = self.timers.borrow_mut();
        if let Some(index) = timers.iter().position(|entry| entry.id == id) {
            timers.remove(index);
        }
    }

    /// Fires the single earliest due timer, if any. Timers sharing a deadline
    /// fire in registration order.
    fn fire_next_due_timer(&self, now_millis: u64) -> bool {
        let entry = {
            let mut timers = self.timers.borrow_mut();
            let due = timers
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.deadline_millis <= now_millis)
                .min_by_key(|(_, entry)| (entry.deadline_millis, entry.id))
                .map(|(index, _)| index);
            due.map(|index| timers.remove(index))
        };
        match entry {
            Some(entry) => {
                (entry.callback)();
                true
            }
            None => false,
        }
    }

    fn next_timer_deadline(&self) -> Option<u64> {
        self.timers
            .borrow()
            .iter()
            .map(|entry| entry.deadline_millis)
            .min()
    }

    fn has_pending_work(&self, now_millis: u64) -> bool {
        if !self.pending_tasks.borrow().is_empty() {
            return true;
        }
        if !self.ready.lock().unwrap().is_empty() {
            return true;
        }
        self.timers
            .borrow()
            .iter()
            .any(|entry| entry.deadline_millis <= now_millis)
    }

    /// Processes everything runnable at `now_millis`.
    ///
    /// Deferred tasks and woken futures settle completely between timer
    /// firings, so a timer can never observe work that was logically
    /// scheduled before an earlier deadline.
    fn pump(&self, now_millis: u64) {
        self.assert_ui_thread();
        if now_millis > self.last_now_millis.get() {
            self.last_now_millis.set(now_millis);
        }
        loop {
            let drained = self.drain_tasks();
            let polled = self.poll_ready();
            if drained || polled {
                continue;
            }
            if !self.fire_next_due_timer(now_millis) {
                break;
            }
        }
    }
}

/// Owns the single-threaded cooperative runtime: a deferred-task queue, a
/// timer queue keyed on host-supplied milli timestamps, and a local future
/// executor. The host drives it by calling [`RuntimeHandle::pump`] with its
/// clock's current time.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Weak, cheaply clonable reference to a [`Runtime`].
///
/// Every operation degrades to a no-op once the runtime is gone; spawning
/// drops the future immediately so its scope-exit cleanup still runs.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

impl RuntimeHandle {
    pub fn assert_ui_thread(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.assert_ui_thread();
        }
    }

    /// Queues a closure to run on the next pump.
    pub fn spawn_task(&self, task: impl FnOnce() + 'static) {
        match self.inner.upgrade() {
            Some(inner) => inner.enqueue_task(Box::new(task)),
            None => task(),
        }
    }

    /// Spawns a future on the runtime's executor.
    ///
    /// The returned handle cancels the task when dropped.
    #[must_use]
    pub fn spawn_local(&self, future: impl Future<Output = ()> + 'static) -> TaskHandle {
        self.spawn_scoped(move |_scope| future)
    }

    /// Spawns a future that can observe its own cancellation through the
    /// provided [`TaskScope`].
    #[must_use]
    pub fn spawn_scoped<F, Fut>(&self, f: F) -> TaskHandle
    where
        F: FnOnce(TaskScope) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let scope = TaskScope::new(Arc::clone(&active));
        let future: LocalFuture = Box::pin(f(scope));
        match self.inner.upgrade() {
            Some(inner) => {
                inner.assert_ui_thread();
                let id = inner.spawn_future(future, Arc::clone(&active));
                TaskHandle::new(self.clone(), id, active)
            }
            None => {
                // Dead runtime: cancel immediately. Dropping the future here
                // still runs any scope-exit cleanup it owns.
                active.store(false, Ordering::SeqCst);
                drop(future);
                TaskHandle::detached(self.clone(), active)
            }
        }
    }

    pub(crate) fn cancel_task(&self, id: TaskId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.remove_task(id);
        }
    }

    /// Arms a one-shot timer relative to the runtime's last pumped time.
    ///
    /// Returns `None` when the runtime is gone. Dropping the registration
    /// cancels the timer if it has not fired yet.
    #[must_use]
    pub fn register_timer(
        &self,
        delay_millis: u64,
        callback: impl FnOnce() + 'static,
    ) -> Option<TimerRegistration> {
        let inner = self.inner.upgrade()?;
        inner.assert_ui_thread();
        let id = inner.register_timer(delay_millis, Box::new(callback));
        Some(TimerRegistration::new(self.clone(), id))
    }

    pub(crate) fn cancel_timer(&self, id: TimerId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_timer(id);
        }
    }

    /// Runs queued tasks, polls woken futures, and fires due timers until
    /// nothing runnable remains at `now_millis`.
    pub fn pump(&self, now_millis: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.pump(now_millis);
        }
    }

    pub fn has_pending_work(&self, now_millis: u64) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending_work(now_millis))
            .unwrap_or(false)
    }

    /// Earliest armed timer deadline, for hosts that sleep between pumps.
    pub fn next_timer_deadline(&self) -> Option<u64> {
        self.inner.upgrade().and_then(|inner| inner.next_timer_deadline())
    }

    pub fn last_pumped_millis(&self) -> u64 {
        self.inner
            .upgrade()
            .map(|inner| inner.last_now_millis.get())
            .unwrap_or(0)
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_wake(&self) {}
}

#[cfg(test)]
#[derive(Default)]
pub struct TestScheduler;

#[cfg(test)]
impl RuntimeScheduler for TestScheduler {
    fn schedule_wake(&self) {}
}
