use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use async_button_core::{
    MutableState, RuntimeHandle, Subscription, TaskHandle, TaskScope, TimerRegistration,
};
use log::trace;

use crate::builder::AsyncButtonBuilder;
use crate::environment::Environment;
use crate::options::ActionOptions;
use crate::transition::Transition;
use crate::view::{PointerEventKind, View, ViewFactory};

/// How long an action must run before the placeholder may appear.
/// Shorter actions never show a spinner at all.
pub const PLACEHOLDER_DELAY_MILLIS: u64 = 150;

pub type BoxedAction = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Produces one run's worth of work. Called exactly once per rising edge of
/// the run state.
pub type ActionFn = Rc<dyn Fn(TaskScope) -> BoxedAction>;

/// Snapshot of everything a host renderer needs to draw the control.
#[derive(Clone, Debug)]
pub struct ButtonFrame {
    pub content: View,
    /// 0.0 while the placeholder covers the label, 1.0 otherwise. The hidden
    /// label still occupies its layout space.
    pub content_opacity: f32,
    pub overlay: Option<View>,
    pub enabled: bool,
    pub transition: Transition,
}

/// A button wrapping an asynchronous operation.
///
/// The control owns a running flag and a debounced placeholder flag, and
/// reconciles them with an optional caller-owned run binding:
///
/// * activating the control (or setting the binding to `true`) starts the
///   operation and flips the running flag;
/// * while the operation runs past the debounce window, the label yields to
///   the placeholder view;
/// * on completion or cancellation, running flag, placeholder flag, and
///   binding all reset to `false`, guaranteed by a scope-exit guard rather
///   than the happy path.
///
/// Construct instances through [`AsyncButton::builder`].
pub struct AsyncButton {
    inner: Rc<ButtonInner>,
}

struct ButtonInner {
    runtime: RuntimeHandle,
    options: ActionOptions,
    action: ActionFn,
    label: ViewFactory,
    placeholder: ViewFactory,
    environment: Environment,
    run_state: MutableState<bool>,
    placeholder_visible: MutableState<bool>,
    external_run: Option<MutableState<bool>>,
    active_cycle: RefCell<Option<TaskHandle>>,
    pressed: Cell<bool>,
    subscriptions: RefCell<Vec<Subscription<bool>>>,
}

/// Scope-exit cleanup for one run cycle.
///
/// Owned by the run-cycle future, so it runs when the operation completes,
/// panics, or the cycle is cancelled and the future dropped. Reset order:
/// pending debounce timer, placeholder flag, running flag, external binding.
struct RunCycleGuard {
    debounce: Option<TimerRegistration>,
    placeholder_visible: MutableState<bool>,
    run_state: MutableState<bool>,
    external_run: Option<MutableState<bool>>,
}

impl Drop for RunCycleGuard {
    fn drop(&mut self) {
        if let Some(timer) = self.debounce.take() {
            timer.cancel();
        }
        self.placeholder_visible.set(false);
        self.run_state.set(false);
        if let Some(external) = &self.external_run {
            external.set(false);
        }
        trace!("run cycle ended; control state reset");
    }
}

impl ButtonInner {
    /// External binding changed. The run state's equality gate already
    /// swallows writes that match the current value, so this never loops
    /// back through the mirror write in `on_run_state_changed`.
    fn on_external_changed(&self, value: bool) {
        self.run_state.set(value);
    }

    fn on_run_state_changed(&self, running: bool) {
        if let Some(external) = &self.external_run {
            external.set(running);
        }
        if !running {
            // A falling edge cancels any in-flight cycle; the dropped
            // future's guard finishes the reset. Normal completion lands
            // here too, after the guard already cleared the task.
            let handle = self.active_cycle.borrow_mut().take();
            if let Some(handle) = handle {
                handle.cancel();
            }
            return;
        }
        self.begin_run_cycle();
    }

    fn begin_run_cycle(&self) {
        // Normally cleared by the previous falling edge; a stale handle can
        // survive a failed spawn and is inert to cancel.
        if let Some(previous) = self.active_cycle.borrow_mut().take() {
            previous.cancel();
        }
        trace!("run cycle started");

        let debounce = if self.options.contains(ActionOptions::SHOW_PLACEHOLDER) {
            let placeholder_visible = self.placeholder_visible.clone();
            self.runtime
                .register_timer(PLACEHOLDER_DELAY_MILLIS, move || {
                    placeholder_visible.set(true);
                })
        } else {
            None
        };
        let guard = RunCycleGuard {
            debounce,
            placeholder_visible: self.placeholder_visible.clone(),
            run_state: self.run_state.clone(),
            external_run: self.external_run.clone(),
        };

        let action = Rc::clone(&self.action);
        let handle = self.runtime.spawn_scoped(move |scope| {
            let operation = action(scope);
            async move {
                let _guard = guard;
                operation.await;
            }
        });
        *self.active_cycle.borrow_mut() = Some(handle);
    }

    fn is_enabled(&self) -> bool {
        self.environment.is_enabled()
            && !(self.options.contains(ActionOptions::DISABLE_BUTTON) && self.run_state.value())
    }
}

impl AsyncButton {
    pub fn builder(runtime: &RuntimeHandle) -> AsyncButtonBuilder {
        AsyncButtonBuilder::new(runtime)
    }

    pub(crate) fn from_parts(
        runtime: RuntimeHandle,
        options: ActionOptions,
        action: ActionFn,
        label: ViewFactory,
        placeholder: ViewFactory,
        environment: Environment,
        external_run: Option<MutableState<bool>>,
    ) -> Self {
        let run_state = MutableState::with_runtime(false, runtime.clone());
        let placeholder_visible = MutableState::with_runtime(false, runtime.clone());
        let inner = Rc::new(ButtonInner {
            runtime,
            options,
            action,
            label,
            placeholder,
            environment,
            run_state,
            placeholder_visible,
            external_run,
            active_cycle: RefCell::new(None),
            pressed: Cell::new(false),
            subscriptions: RefCell::new(Vec::new()),
        });

        let mut subscriptions = Vec::new();
        if let Some(external) = &inner.external_run {
            let weak = Rc::downgrade(&inner);
            subscriptions.push(external.subscribe(move |value| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_external_changed(*value);
                }
            }));
        }
        {
            let weak = Rc::downgrade(&inner);
            subscriptions.push(inner.run_state.subscribe(move |running| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_run_state_changed(*running);
                }
            }));
        }
        *inner.subscriptions.borrow_mut() = subscriptions;

        Self { inner }
    }

    /// User activation. Starts a run cycle unless the control is disabled or
    /// already running; re-activating while running is a no-op because the
    /// run state only reacts to actual value changes.
    pub fn activate(&self) {
        if !self.inner.is_enabled() {
            return;
        }
        self.inner.run_state.set(true);
    }

    /// Routes a pointer event; a press completed inside the control
    /// activates it.
    pub fn dispatch_pointer(&self, kind: PointerEventKind) {
        match kind {
            PointerEventKind::Down => self.inner.pressed.set(true),
            PointerEventKind::Up => {
                if self.inner.pressed.replace(false) {
                    self.activate();
                }
            }
            PointerEventKind::Cancel => self.inner.pressed.set(false),
        }
    }

    /// Renders the control's current state.
    pub fn frame(&self) -> ButtonFrame {
        let placeholder_visible = self.inner.placeholder_visible.value();
        let environment = &self.inner.environment;
        ButtonFrame {
            content: (self.inner.label)(environment),
            content_opacity: if placeholder_visible { 0.0 } else { 1.0 },
            overlay: placeholder_visible.then(|| (self.inner.placeholder)(environment)),
            enabled: self.inner.is_enabled(),
            transition: environment.transition(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.run_state.value()
    }

    pub fn is_placeholder_visible(&self) -> bool {
        self.inner.placeholder_visible.value()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    pub fn options(&self) -> ActionOptions {
        self.inner.options
    }

    pub fn environment(&self) -> &Environment {
        &self.inner.environment
    }
}
