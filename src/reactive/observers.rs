//! Synchronous observer lists.
//!
//! Every notification runs its observers immediately, in subscription order,
//! with no buffering or batching. Observers may mutate the observed object
//! from inside their callback; the resulting nested notification skips the
//! observer that is still running.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

pub type ObserverId = u64;

/// What an observer wants after handling a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observe {
    Keep,
    /// Unsubscribe; used for one-shot observers.
    Remove,
}

type Callback<S, E> = Box<dyn FnMut(&S, E) -> Observe>;

enum Slot<S, E> {
    Idle(Callback<S, E>),
    Running,
    /// Cancelled while its callback was running
    Cancelled,
}

struct ListInner<S, E> {
    slots: BTreeMap<ObserverId, Slot<S, E>>,
    next_id: ObserverId,
}

/// Observers of a source `S` receiving events of type `E`.
pub struct ObserverList<S, E> {
    inner: Rc<RefCell<ListInner<S, E>>>,
}

impl<S: 'static, E: Copy + 'static> ObserverList<S, E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner {
                slots: BTreeMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Register `callback`; it stays registered until it returns
    /// [`Observe::Remove`] or the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&S, E) -> Observe + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.slots.insert(id, Slot::Idle(Box::new(callback)));

        let weak: Weak<RefCell<ListInner<S, E>>> = Rc::downgrade(&self.inner);
        let list: Weak<dyn Detach> = weak;
        Subscription {
            list: Some(list),
            id,
        }
    }

    /// Run every registered observer with `event`.
    pub fn notify(&self, source: &S, event: E) {
        let ids: Vec<ObserverId> = self.inner.borrow().slots.keys().copied().collect();
        for id in ids {
            let callback = {
                let mut inner = self.inner.borrow_mut();
                let Some(slot) = inner.slots.get_mut(&id) else {
                    continue;
                };
                if !matches!(slot, Slot::Idle(_)) {
                    continue;
                }
                let Slot::Idle(callback) = std::mem::replace(slot, Slot::Running) else {
                    continue;
                };
                callback
            };

            let mut callback = callback;
            let flow = callback(source, event);

            let mut inner = self.inner.borrow_mut();
            let still_registered = match inner.slots.get(&id) {
                Some(Slot::Running) => true,
                Some(Slot::Cancelled) => false,
                _ => continue,
            };
            if still_registered && flow == Observe::Keep {
                inner.slots.insert(id, Slot::Idle(callback));
            } else {
                inner.slots.remove(&id);
            }
        }
    }

    /// Number of live observers.
    pub fn len(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .values()
            .filter(|slot| !matches!(slot, Slot::Cancelled))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: 'static, E: Copy + 'static> Default for ObserverList<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

trait Detach {
    fn detach(&self, id: ObserverId);
}

impl<S, E> Detach for RefCell<ListInner<S, E>> {
    fn detach(&self, id: ObserverId) {
        let removed = {
            let mut inner = self.borrow_mut();
            if matches!(inner.slots.get(&id), Some(Slot::Running)) {
                inner.slots.insert(id, Slot::Cancelled)
            } else {
                inner.slots.remove(&id)
            }
        };
        // Callbacks may own subscriptions to this same list
        drop(removed);
    }
}

/// Handle to a registered observer. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    list: Option<Weak<dyn Detach>>,
    id: ObserverId,
}

impl Subscription {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Unsubscribe now.
    pub fn cancel(mut self) {
        self.detach();
    }

    /// Keep the observer registered for as long as the list lives.
    pub fn leak(mut self) {
        self.list = None;
    }

    fn detach(&mut self) {
        if let Some(list) = self.list.take().and_then(|weak| weak.upgrade()) {
            list.detach(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.list.is_some())
            .finish()
    }
}
