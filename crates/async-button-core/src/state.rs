use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::runtime::RuntimeHandle;

/// Decides whether a write actually changed a state cell.
///
/// Watchers are notified only when the old and new values are NOT
/// equivalent, so re-assigning an equal value never re-fires reactions.
pub trait MutationPolicy<T> {
    fn equivalent(&self, a: &T, b: &T) -> bool;
}

/// Default policy: values compare with `PartialEq`.
pub struct StructuralEquality;

impl<T: PartialEq> MutationPolicy<T> for StructuralEquality {
    fn equivalent(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Policy for values without a usable equality; every write notifies.
pub struct NeverEqual;

impl<T> MutationPolicy<T> for NeverEqual {
    fn equivalent(&self, _a: &T, _b: &T) -> bool {
        false
    }
}

struct WatcherEntry<T> {
    callback: Box<dyn Fn(&T)>,
}

struct MutableStateInner<T: Clone + 'static> {
    value: RefCell<T>,
    watchers: RefCell<Vec<Weak<WatcherEntry<T>>>>,
    policy: Rc<dyn MutationPolicy<T>>,
    runtime: RuntimeHandle,
}

impl<T: Clone + 'static> MutableStateInner<T> {
    fn notify_watchers(&self, value: &T) {
        // Collect strong entries first so callbacks can freely subscribe or
        // write other states without hitting an outstanding borrow.
        let watchers: Vec<Rc<WatcherEntry<T>>> = {
            let mut watchers = self.watchers.borrow_mut();
            watchers.retain(|w| w.strong_count() > 0);
            watchers.iter().filter_map(|w| w.upgrade()).collect()
        };

        for watcher in watchers {
            (watcher.callback)(value);
        }
    }
}

/// Keeps a watcher registered for as long as it is held.
///
/// Dropping the subscription unregisters the watcher; the state cell prunes
/// the dead entry on its next notification or subscribe.
pub struct Subscription<T> {
    _entry: Rc<WatcherEntry<T>>,
}

/// Read-only handle to an observable value.
pub struct State<T: Clone + 'static> {
    inner: Rc<MutableStateInner<T>>,
}

/// Read-write handle to an observable value.
///
/// Handles are cheap clones of the same cell. All writes must happen on the
/// runtime's UI thread; watcher callbacks run synchronously, on that same
/// thread, before the write call returns.
pub struct MutableState<T: Clone + 'static> {
    inner: Rc<MutableStateInner<T>>,
}

impl<T: Clone + 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> PartialEq for MutableState<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + 'static> Eq for MutableState<T> {}

impl<T: Clone + PartialEq + 'static> MutableState<T> {
    pub fn with_runtime(value: T, runtime: RuntimeHandle) -> Self {
        Self::with_policy(value, runtime, Rc::new(StructuralEquality))
    }
}

impl<T: Clone + 'static> MutableState<T> {
    pub fn with_policy(
        value: T,
        runtime: RuntimeHandle,
        policy: Rc<dyn MutationPolicy<T>>,
    ) -> Self {
        Self {
            inner: Rc::new(MutableStateInner {
                value: RefCell::new(value),
                watchers: RefCell::new(Vec::new()),
                policy,
                runtime,
            }),
        }
    }

    pub fn as_state(&self) -> State<T> {
        State {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn get(&self) -> T {
        self.value()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Writes `value`, notifying watchers when it differs from the current
    /// value under the cell's mutation policy.
    pub fn set(&self, value: T) {
        self.inner.runtime.assert_ui_thread();
        let changed = {
            let mut current = self.inner.value.borrow_mut();
            if self.inner.policy.equivalent(&current, &value) {
                false
            } else {
                *current = value;
                true
            }
        };
        if changed {
            let snapshot = self.inner.value.borrow().clone();
            self.inner.notify_watchers(&snapshot);
        }
    }

    pub fn set_value(&self, value: T) {
        self.set(value);
    }

    /// Mutates in place; watchers fire when the result differs from the
    /// previous value.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.runtime.assert_ui_thread();
        let (result, changed) = {
            let mut current = self.inner.value.borrow_mut();
            let previous = current.clone();
            let result = f(&mut current);
            let changed = !self.inner.policy.equivalent(&previous, &current);
            (result, changed)
        };
        if changed {
            let snapshot = self.inner.value.borrow().clone();
            self.inner.notify_watchers(&snapshot);
        }
        result
    }

    /// Registers `callback` to run synchronously after each value change.
    ///
    /// The watcher stays registered for as long as the returned
    /// [`Subscription`] is held.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription<T> {
        let entry = Rc::new(WatcherEntry {
            callback: Box::new(callback),
        });
        let mut watchers = self.inner.watchers.borrow_mut();
        watchers.retain(|w| w.strong_count() > 0);
        watchers.push(Rc::downgrade(&entry));
        Subscription { _entry: entry }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.inner.runtime.clone()
    }
}

impl<T: Clone + 'static> State<T> {
    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn get(&self) -> T {
        self.value()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableState")
            .field("value", &self.value())
            .finish()
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State").field("value", &self.value()).finish()
    }
}
