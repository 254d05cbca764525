//! Reactive Cells
//!
//! A `ReactiveCell` is a single observable value slot. Each cell owns its own
//! observer list; `watch` pushes a subscription and hands back a [`Disposer`]
//! that removes exactly that subscription again.
//!
//! Cells are shared handles (`Rc`), so cloning a cell yields the same slot.
//! Everything here is single-threaded: reactions run synchronously inside
//! `set`, after the slot borrow has been released, so a reaction may freely
//! read or write other cells (or the same one).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Callback<T> = Rc<dyn Fn(&T, &T)>;

struct Subscription<T> {
    id: u64,
    callback: Callback<T>,
}

struct Slot<T> {
    value: T,
    next_id: u64,
    subscriptions: Vec<Subscription<T>>,
}

/// Observable single-value holder
pub struct ReactiveCell<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for ReactiveCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveCell<T> {
    /// Create a cell holding `value`
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                value,
                next_id: 0,
                subscriptions: Vec::new(),
            })),
        }
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.slot.borrow().value.clone()
    }

    /// Borrow the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.borrow().value)
    }

    /// Write a value, notifying watchers when it differs from the old one.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        let (old, callbacks) = {
            let mut slot = self.slot.borrow_mut();
            if slot.value == value {
                return false;
            }
            let old = std::mem::replace(&mut slot.value, value);
            let callbacks: Vec<Callback<T>> = slot
                .subscriptions
                .iter()
                .map(|s| Rc::clone(&s.callback))
                .collect();
            (old, callbacks)
        };

        if !callbacks.is_empty() {
            let current = self.get();
            for callback in callbacks {
                callback(&current, &old);
            }
        }
        true
    }

    /// Modify the value in place through a closure
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.get();
        f(&mut next);
        self.set(next)
    }

    /// Subscribe to changes. The callback receives `(new, old)`.
    pub fn watch(&self, callback: impl Fn(&T, &T) + 'static) -> Disposer {
        let id = {
            let mut slot = self.slot.borrow_mut();
            let id = slot.next_id;
            slot.next_id += 1;
            slot.subscriptions.push(Subscription {
                id,
                callback: Rc::new(callback),
            });
            id
        };

        let weak = Rc::downgrade(&self.slot);
        Disposer::new(move || {
            if let Some(slot) = weak.upgrade() {
                slot.borrow_mut().subscriptions.retain(|s| s.id != id);
            }
        })
    }

    /// Number of live subscriptions on this cell
    pub fn watcher_count(&self) -> usize {
        self.slot.borrow().subscriptions.len()
    }

    /// Whether two handles point at the same slot
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("ReactiveCell")
            .field("value", &slot.value)
            .field("watchers", &slot.subscriptions.len())
            .finish()
    }
}

/// Handle that tears down one or more subscriptions.
///
/// Disposing is idempotent; clones share the same teardown.
#[derive(Clone)]
#[must_use = "dropping a Disposer leaves the subscription installed"]
pub struct Disposer {
    detach: Rc<dyn Fn()>,
}

impl Disposer {
    /// Wrap a teardown closure
    pub fn new(detach: impl Fn() + 'static) -> Self {
        Self {
            detach: Rc::new(detach),
        }
    }

    /// Disposer that does nothing
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Combine several disposers into one
    pub fn combine(disposers: Vec<Disposer>) -> Self {
        Self::new(move || {
            for disposer in &disposers {
                disposer.dispose();
            }
        })
    }

    /// Remove the subscription(s)
    pub fn dispose(&self) {
        (self.detach)();
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Disposer")
    }
}
