use std::cell::RefCell;
use std::rc::Rc;

use super::observers::{Observe, ObserverList, Subscription};

struct SignalInner<T> {
    value: RefCell<T>,
    observers: ObserverList<T, ()>,
}

/// A single-threaded observable value.
///
/// Writes notify subscribers synchronously, and only when the value actually
/// changed. Like everything in the engine a signal lives on the UI thread.
pub struct Signal<T: 'static> {
    inner: Rc<SignalInner<T>>,
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                observers: ObserverList::new(),
            }),
        }
    }

    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.value.borrow())
    }

    /// Call `f` with the new value after every change.
    pub fn subscribe<F>(&self, mut f: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        self.inner.observers.subscribe(move |value, ()| {
            f(value);
            Observe::Keep
        })
    }
}

impl<T: Clone + 'static> Signal<T> {
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: PartialEq + Clone + 'static> Signal<T> {
    /// Sets the signal's value, only notifying if the value actually changed.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.inner.value.borrow_mut();
            if *guard == value {
                return;
            }
            *guard = value;
        }
        self.notify();
    }

    /// Updates the signal's value using a closure, only notifying if the value changed.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let changed = {
            let mut guard = self.inner.value.borrow_mut();
            let old_value = guard.clone();
            f(&mut *guard);
            *guard != old_value
        };
        if changed {
            self.notify();
        }
    }

    // Observers get a copy so they may write back into the signal.
    fn notify(&self) {
        let value = self.get();
        self.inner.observers.notify(&value, ());
    }
}

pub fn create_signal<T: 'static>(value: T) -> Signal<T> {
    Signal::new(value)
}
