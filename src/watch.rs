//! Synchronous change-notification bus
//!
//! The bus is the only channel through which value and flag changes travel:
//! the parameter set pushes events, bindings and the dependency engine
//! subscribe. Dispatch is synchronous, single-threaded and runs in
//! subscription order. Reentrancy is handled by queueing: a watcher that
//! triggers further changes enqueues their events, and the outermost flush
//! drains the queue until it is empty.

use crate::error::Result;
use crate::schema::FlagKind;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// What changed about a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The stored value changed.
    Value,
    /// A derived flag changed.
    Flag(FlagKind),
}

/// A change notification delivered to watchers.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Name of the parameter that changed.
    pub name: String,
    /// What changed about it.
    pub kind: ChangeKind,
}

/// Watcher callback type. A watcher may fail; the failure aborts the
/// current flush and surfaces to the caller that triggered it.
pub type WatchCallback = dyn FnMut(&ChangeEvent) -> Result<()>;

/// Identifier of one registered watcher, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchId(u64);

struct Watcher {
    id: u64,
    name: String,
    kind: ChangeKind,
    callback: Rc<RefCell<WatchCallback>>,
}

/// Synchronous notification channel for one parameter set
///
/// Events pushed while a flush is already running are drained by that outer
/// flush; nested `flush` calls return immediately. On a watcher failure the
/// remaining queue is dropped: delivery is best-effort once a watcher has
/// failed, and the caller is told so through the returned error.
#[derive(Default)]
pub struct WatchBus {
    watchers: RefCell<Vec<Watcher>>,
    pending: RefCell<VecDeque<ChangeEvent>>,
    next_id: Cell<u64>,
    flushing: Cell<bool>,
}

impl WatchBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a callback to changes of `kind` on parameter `name`.
    ///
    /// # Returns
    ///
    /// A [`WatchId`] that can be passed to [`WatchBus::unwatch`].
    pub fn watch(
        &self,
        name: &str,
        kind: ChangeKind,
        callback: impl FnMut(&ChangeEvent) -> Result<()> + 'static,
    ) -> WatchId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let callback: Rc<RefCell<WatchCallback>> = Rc::new(RefCell::new(callback));
        self.watchers.borrow_mut().push(Watcher {
            id,
            name: name.to_string(),
            kind,
            callback,
        });
        WatchId(id)
    }

    /// Remove a watcher. Unknown ids are ignored. A watcher removed during
    /// a flush may still receive the event currently being dispatched.
    pub fn unwatch(&self, id: WatchId) {
        self.watchers.borrow_mut().retain(|w| w.id != id.0);
    }

    /// Queue a notification without dispatching it.
    pub fn push(&self, event: ChangeEvent) {
        self.pending.borrow_mut().push_back(event);
    }

    /// Whether queued notifications are waiting for a flush.
    pub fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    /// Dispatch queued notifications in subscription order until the queue
    /// drains.
    ///
    /// Reentrant calls while a flush is in progress return `Ok(())`
    /// immediately; their events are handled by the outer flush. On a
    /// watcher failure the queue is cleared and the error returned.
    pub fn flush(&self) -> Result<()> {
        if self.flushing.get() {
            return Ok(());
        }
        self.flushing.set(true);
        let result = self.drain();
        self.flushing.set(false);
        if result.is_err() {
            self.pending.borrow_mut().clear();
        }
        result
    }

    /// Queue an event and flush in one step.
    pub fn notify(&self, event: ChangeEvent) -> Result<()> {
        self.push(event);
        self.flush()
    }

    fn drain(&self) -> Result<()> {
        loop {
            let event = match self.pending.borrow_mut().pop_front() {
                Some(event) => event,
                None => return Ok(()),
            };
            tracing::trace!(name = %event.name, kind = ?event.kind, "dispatching change");

            // Snapshot matching callbacks so watchers may subscribe or
            // unsubscribe while we call them.
            let targets: Vec<Rc<RefCell<WatchCallback>>> = self
                .watchers
                .borrow()
                .iter()
                .filter(|w| w.name == event.name && w.kind == event.kind)
                .map(|w| Rc::clone(&w.callback))
                .collect();

            for callback in targets {
                let mut callback = callback.borrow_mut();
                (&mut *callback)(&event)?;
            }
        }
    }
}
