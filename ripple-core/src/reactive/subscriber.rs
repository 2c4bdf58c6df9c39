//! Subscriber types for the reactive system.
//!
//! A Subscriber is the effect-handle stored in the dependency registry: a
//! zero-argument procedure plus the bookkeeping needed to re-run it. Set
//! membership is by [`SubscriberId`], so registering the same subscriber
//! twice under one key contributes only once.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::context::ReactiveContext;
use super::key::{PropertyKey, TargetId};
use super::runtime::Runtime;

/// Unique identifier for a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// A `(target, key)` pair an effect has read.
pub(crate) type Dependency = (TargetId, PropertyKey);

struct SubscriberInner {
    id: SubscriberId,
    run: Box<dyn Fn()>,
    /// Every pair this subscriber is registered under. Used to unregister
    /// on disposal and, when pruning is enabled, before each run.
    dependencies: RefCell<HashSet<Dependency>>,
    disposed: Cell<bool>,
    run_count: Cell<usize>,
}

/// A registered effect procedure.
///
/// Cloning is cheap and yields the same subscriber.
#[derive(Clone)]
pub struct Subscriber {
    inner: Rc<SubscriberInner>,
}

impl Subscriber {
    /// Wrap `run` as a subscriber. It does not run until [`Subscriber::run`].
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            inner: Rc::new(SubscriberInner {
                id: SubscriberId::new(),
                run: Box::new(run),
                dependencies: RefCell::new(HashSet::new()),
                disposed: Cell::new(false),
                run_count: Cell::new(0),
            }),
        }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// Run the procedure as the active effect.
    ///
    /// The previous active effect is restored afterwards, including when the
    /// procedure panics. Disposed subscribers do nothing.
    pub fn run(&self) {
        if self.is_disposed() {
            return;
        }
        self.run_with(|| (self.inner.run)());
    }

    /// Run `f` as this subscriber's run, in place of the stored procedure.
    ///
    /// Reads inside `f` are tracked against this subscriber and the run is
    /// counted. Used for a first run that has to hand a value back.
    pub(crate) fn run_with<R>(&self, f: impl FnOnce() -> R) -> R {
        if crate::config::prune_stale_dependencies() {
            Runtime::clear_dependencies(self);
        }

        let _ctx = ReactiveContext::enter(self.clone());
        self.inner.run_count.set(self.inner.run_count.get() + 1);
        f()
    }

    /// Stop future runs and leave every dependency set.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        Runtime::clear_dependencies(self);
        tracing::debug!(effect = %self.id(), "effect disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Number of times the procedure has started running.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    /// Number of `(target, key)` pairs this subscriber is registered under.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.borrow().len()
    }

    pub(crate) fn record_dependency(&self, dependency: Dependency) {
        self.inner.dependencies.borrow_mut().insert(dependency);
    }

    pub(crate) fn take_dependencies(&self) -> HashSet<Dependency> {
        self.inner.dependencies.take()
    }

    pub(crate) fn forget_target(&self, target: TargetId) {
        self.inner
            .dependencies
            .borrow_mut()
            .retain(|(id, _)| *id != target);
    }
}

impl PartialEq for Subscriber {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Subscriber {}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
