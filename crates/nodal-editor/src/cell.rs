//! Observable state cells.
//!
//! A [`StateCell`] is a shared, single-threaded value that notifies its
//! subscribers on every write. Subscriptions are released explicitly: a
//! dropped [`Subscription`] keeps its callback registered.
//!
//! Subscribers must not write to, or subscribe to, the cell that is currently
//! notifying them. Reading it is fine.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Box<dyn FnMut(&T)>;

struct Inner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(u64, Callback<T>)>>,
    next_id: Cell<u64>,
}

trait Unsubscribe {
    fn remove(&self, id: u64);
}

impl<T> Unsubscribe for Inner<T> {
    fn remove(&self, id: u64) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
    }
}

/// Shared observable value. Clones are handles to the same cell.
pub struct StateCell<T>(Rc<Inner<T>>);

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &*self.0.value.borrow())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T: 'static> StateCell<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Inner {
            value: RefCell::new(value),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }))
    }

    /// Runs `f` with a borrow of the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.value.borrow())
    }

    /// Stores `value` and notifies every subscriber.
    pub fn set(&self, value: T) {
        *self.0.value.borrow_mut() = value;
        self.notify();
    }

    /// Mutates the value in place, then notifies.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.0.value.borrow_mut());
        self.notify();
        out
    }

    /// Registers `callback`; it runs after every subsequent write.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.0.next_id.get();
        self.0.next_id.set(id + 1);
        self.0.subscribers.borrow_mut().push((id, Box::new(callback)));

        let strong: Rc<dyn Unsubscribe> = self.0.clone();
        Subscription { cell: Some(Rc::downgrade(&strong)), id }
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.borrow().len()
    }

    /// Whether both handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn notify(&self) {
        let value = self.0.value.borrow();
        let mut subs = self.0.subscribers.borrow_mut();
        for (_, cb) in subs.iter_mut() {
            cb(&value);
        }
    }
}

impl<T: Clone + 'static> StateCell<T> {
    pub fn get(&self) -> T {
        self.0.value.borrow().clone()
    }
}

impl<T: PartialEq + 'static> StateCell<T> {
    /// Stores `value` and notifies only when it differs from the current one.
    ///
    /// Returns whether a notification was sent.
    pub fn set_if_changed(&self, value: T) -> bool {
        if *self.0.value.borrow() == value {
            return false;
        }
        self.set(value);
        true
    }
}

/// Handle to a registered cell callback.
///
/// The callback stays registered until [`Subscription::unsubscribe`] is called,
/// even if this handle is dropped.
#[must_use = "a subscription is only released by calling `unsubscribe`"]
pub struct Subscription {
    cell: Option<Weak<dyn Unsubscribe>>,
    id: u64,
}

impl Subscription {
    /// Removes the callback. Calling it again is a no-op, as is calling it
    /// after the cell itself is gone.
    pub fn unsubscribe(&mut self) {
        if let Some(cell) = self.cell.take().and_then(|w| w.upgrade()) {
            cell.remove(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.cell.as_ref().is_some_and(|w| w.strong_count() > 0)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Subscriptions owned by one object, released together.
#[derive(Debug, Default)]
pub struct SubscriptionSet(Vec<Subscription>);

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sub: Subscription) {
        self.0.push(sub);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn unsubscribe_all(&mut self) {
        for mut sub in self.0.drain(..) {
            sub.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut(&i32) + 'static) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move |_: &i32| h.set(h.get() + 1))
    }

    // ── writes ────────────────────────────────────────────────────────────

    #[test]
    fn set_notifies_with_new_value() {
        let cell = StateCell::new(1);
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let _sub = cell.subscribe(move |v| s.set(*v));

        cell.set(7);
        assert_eq!(seen.get(), 7);
        assert_eq!(cell.get(), 7);
    }

    #[test]
    fn set_always_emits_but_set_if_changed_does_not() {
        let cell = StateCell::new(3);
        let (hits, cb) = counter();
        let _sub = cell.subscribe(cb);

        cell.set(3);
        assert_eq!(hits.get(), 1);
        assert!(!cell.set_if_changed(3));
        assert_eq!(hits.get(), 1);
        assert!(cell.set_if_changed(4));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn update_mutates_then_emits() {
        let cell = StateCell::new(vec![1, 2]);
        let len = Rc::new(Cell::new(0));
        let l = len.clone();
        let _sub = cell.subscribe(move |v: &Vec<i32>| l.set(v.len()));

        cell.update(|v| v.push(3));
        assert_eq!(len.get(), 3);
    }

    #[test]
    fn clones_share_the_value() {
        let a = StateCell::new(0);
        let b = a.clone();
        b.set(5);
        assert_eq!(a.get(), 5);
        assert!(a.ptr_eq(&b));
    }

    // ── subscriptions ─────────────────────────────────────────────────────

    #[test]
    fn unsubscribe_is_explicit_and_idempotent() {
        let cell = StateCell::new(0);
        let (hits, cb) = counter();
        let mut sub = cell.subscribe(cb);
        assert_eq!(cell.subscriber_count(), 1);

        sub.unsubscribe();
        sub.unsubscribe();
        cell.set(1);
        assert_eq!(hits.get(), 0);
        assert_eq!(cell.subscriber_count(), 0);
        assert!(!sub.is_active());
    }

    #[test]
    fn dropping_a_subscription_keeps_the_callback() {
        let cell = StateCell::new(0);
        let (hits, cb) = counter();
        drop(cell.subscribe(cb));

        cell.set(1);
        assert_eq!(hits.get(), 1);
        assert_eq!(cell.subscriber_count(), 1);
    }

    #[test]
    fn unsubscribe_after_cell_dropped_is_noop() {
        let cell = StateCell::new(0);
        let mut sub = cell.subscribe(|_| {});
        drop(cell);
        assert!(!sub.is_active());
        sub.unsubscribe();
    }

    #[test]
    fn set_releases_every_member() {
        let a = StateCell::new(0);
        let b = StateCell::new(0);
        let mut set = SubscriptionSet::new();
        set.push(a.subscribe(|_| {}));
        set.push(b.subscribe(|_| {}));
        set.push(b.subscribe(|_| {}));
        assert_eq!(set.len(), 3);

        set.unsubscribe_all();
        assert!(set.is_empty());
        assert_eq!(a.subscriber_count(), 0);
        assert_eq!(b.subscriber_count(), 0);
    }
}
