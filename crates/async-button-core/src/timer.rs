use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use crate::runtime::{RuntimeHandle, TimerId};

/// Keeps a one-shot timer armed for as long as it is held.
///
/// Dropping the registration cancels the timer if it has not fired yet;
/// cancelling after the callback ran is a no-op.
pub struct TimerRegistration {
    runtime: RuntimeHandle,
    id: Option<TimerId>,
}

impl TimerRegistration {
    pub(crate) fn new(runtime: RuntimeHandle, id: TimerId) -> Self {
        Self {
            runtime,
            id: Some(id),
        }
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_timer(id);
        }
    }
}

impl Drop for TimerRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_timer(id);
        }
    }
}

struct SleepShared {
    fired: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

/// Future that completes once the runtime's clock passes a deadline.
///
/// The timer is armed lazily on first poll, relative to the runtime's last
/// pumped time. Resolves immediately when the runtime is gone.
pub struct Sleep {
    runtime: RuntimeHandle,
    delay_millis: u64,
    shared: Rc<SleepShared>,
    registration: Option<TimerRegistration>,
    armed: bool,
}

/// Suspends the calling task for `duration`, rounded to milliseconds.
pub fn sleep(runtime: &RuntimeHandle, duration: Duration) -> Sleep {
    Sleep {
        runtime: runtime.clone(),
        delay_millis: duration.as_millis() as u64,
        shared: Rc::new(SleepShared {
            fired: Cell::new(false),
            waker: RefCell::new(None),
        }),
        registration: None,
        armed: false,
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.shared.fired.get() {
            return Poll::Ready(());
        }
        *this.shared.waker.borrow_mut() = Some(cx.waker().clone());
        if !this.armed {
            this.armed = true;
            let shared = Rc::clone(&this.shared);
            this.registration = this.runtime.register_timer(this.delay_millis, move || {
                shared.fired.set(true);
                if let Some(waker) = shared.waker.borrow_mut().take() {
                    waker.wake();
                }
            });
            if this.registration.is_none() {
                return Poll::Ready(());
            }
        }
        Poll::Pending
    }
}
