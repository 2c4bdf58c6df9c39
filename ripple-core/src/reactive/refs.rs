//! Ref Implementation
//!
//! A Ref is a single-slot reactive cell. It has its own identity in the
//! dependency registry and exposes one virtual property, `"value"`.
//!
//! # How Refs Work
//!
//! 1. Reading the value inside an effect tracks `(ref, "value")`.
//!
//! 2. Writing the value stores it first, then triggers `(ref, "value")`.
//!    Every write triggers, including writes of an equal value.
//!
//! Clones share the value and the identity. Two refs made separately never
//! share dependants, even when they hold equal values.

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use super::key::{PropertyKey, Target, TargetId};
use super::runtime::Runtime;

struct RefInner<T> {
    target: Target,
    value: RefCell<T>,
}

/// A reactive cell holding a value of type `T`.
///
/// # Example
///
/// ```rust
/// use ripple_core::reactive::make_ref;
///
/// let count = make_ref(0);
/// count.set(5);
/// count.update(|n| *n += 1);
/// assert_eq!(count.get(), 6);
/// ```
pub struct Ref<T> {
    inner: Rc<RefInner<T>>,
}

impl<T: 'static> Ref<T> {
    /// Create a new ref with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefInner {
                target: Target::new(),
                value: RefCell::new(value),
            }),
        }
    }

    /// The ref's identity in the dependency registry.
    pub fn target(&self) -> TargetId {
        self.inner.target.id()
    }

    /// Read the value through `f`, tracking the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let result = f(&self.inner.value.borrow());
        Runtime::track(self.target(), &PropertyKey::VALUE);
        result
    }

    /// Read the value through `f` without tracking.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Store a new value and notify dependants.
    pub fn set(&self, value: T) {
        // Release the borrow before dependants read the value
        *self.inner.value.borrow_mut() = value;
        Runtime::trigger(self.target(), &PropertyKey::VALUE);
    }

    /// Modify the value in place and notify dependants.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        Runtime::trigger(self.target(), &PropertyKey::VALUE);
    }
}

impl<T: Clone + 'static> Ref<T> {
    /// Get the current value, tracking the read.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Get the current value without tracking.
    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Debug> Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("target", &self.inner.target.id())
            .field("value", &self.inner.value.borrow())
            .finish()
    }
}

/// Create a reactive cell holding `value`.
pub fn make_ref<T: 'static>(value: T) -> Ref<T> {
    Ref::new(value)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
