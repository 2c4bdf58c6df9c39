//! Computed Implementation
//!
//! A Computed is a read-only ref whose value is kept current by an internal
//! effect: `run_effect(|| inner.set(derive()))`.
//!
//! The derivation runs eagerly, once at creation and again synchronously
//! every time something it read is written. Reading a computed inside an
//! effect tracks the internal ref, so dependants re-run when the derived
//! value is rewritten. There is no setter.

use std::cell::OnceCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use super::effect::Effect;
use super::key::TargetId;
use super::refs::Ref;
use super::subscriber::Subscriber;

/// A derived, read-only reactive value.
///
/// # Example
///
/// ```rust
/// use ripple_core::reactive::{computed, make_ref};
///
/// let base = make_ref(5);
/// let doubled = computed({
///     let base = base.clone();
///     move || base.get() * 2
/// });
/// assert_eq!(doubled.get(), 10);
///
/// base.set(7);
/// assert_eq!(doubled.get(), 14);
/// ```
pub struct Computed<T> {
    value: Ref<T>,
    effect: Effect,
}

impl<T: 'static> Computed<T> {
    /// Create a computed value, running `derive` immediately.
    pub fn new<F>(derive: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let derive = Rc::new(derive);
        let slot: Rc<OnceCell<Ref<T>>> = Rc::new(OnceCell::new());

        let subscriber = Subscriber::new({
            let (derive, slot) = (Rc::clone(&derive), Rc::clone(&slot));
            move || {
                let derived = derive();
                if let Some(value) = slot.get() {
                    value.set(derived);
                }
            }
        });

        // The first derivation is tracked against the subscriber. The ref is
        // created from its result, so nothing depends on it yet.
        let initial = subscriber.run_with(|| derive());
        let value = slot.get_or_init(|| Ref::new(initial)).clone();
        let effect = Effect::from_subscriber(subscriber);

        Self { value, effect }
    }

    /// Read the value through `f`, tracking the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.value.with(f)
    }

    /// The identity dependants are tracked against.
    pub fn target(&self) -> TargetId {
        self.value.target()
    }

    /// Number of times the derivation has run.
    pub fn run_count(&self) -> usize {
        self.effect.run_count()
    }
}

impl<T: Clone + 'static> Computed<T> {
    /// Get the current derived value, tracking the read.
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Get the current derived value without tracking.
    pub fn get_untracked(&self) -> T {
        self.value.get_untracked()
    }
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            effect: self.effect.clone(),
        }
    }
}

impl<T: Debug> Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("value", &self.value)
            .field("run_count", &self.effect.run_count())
            .finish()
    }
}

/// Create a computed value from `derive`.
pub fn computed<T, F>(derive: F) -> Computed<T>
where
    T: 'static,
    F: Fn() -> T + 'static,
{
    Computed::new(derive)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::key::PropertyKey;
    use crate::reactive::context::ReactiveContext;
    use crate::reactive::runtime::Runtime;
    use crate::reactive::{make_ref, run_effect};
    use std::cell::Cell;

    #[test]
    fn computed_derives_eagerly() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let answer = computed(move || {
            calls_clone.set(calls_clone.get() + 1);
            42
        });

        // Derived at creation, before any read
        assert_eq!(calls.get(), 1);
        assert_eq!(answer.get(), 42);
        assert_eq!(answer.get(), 42);
        assert_eq!(calls.get(), 1);
        assert_eq!(answer.run_count(), 1);
    }

    #[test]
    fn creation_tracks_sources_without_dependants() {
        let base = make_ref(2);
        let tripled = computed({
            let base = base.clone();
            move || base.get() * 3
        });

        assert_eq!(Runtime::dependant_count(base.target(), &PropertyKey::VALUE), 1);
        assert_eq!(Runtime::dependant_count(tripled.target(), &PropertyKey::VALUE), 0);
        assert!(!ReactiveContext::is_active());

        base.set(4);
        assert_eq!(tripled.get_untracked(), 12);
        assert_eq!(tripled.run_count(), 2);
    }

    #[test]
    fn computed_stays_fresh() {
        let base = make_ref(5);
        let doubled = computed({
            let base = base.clone();
            move || base.get() * 2
        });
        assert_eq!(doubled.get(), 10);

        base.set(7);
        assert_eq!(doubled.get(), 14);
        assert_eq!(doubled.run_count(), 2);
    }

    #[test]
    fn computed_depends_on_computed() {
        let base = make_ref(5);
        let doubled = computed({
            let base = base.clone();
            move || base.get() * 2
        });
        let plus_ten = computed({
            let doubled = doubled.clone();
            move || doubled.get() + 10
        });
        assert_eq!(plus_ten.get(), 20);

        base.set(10);
        assert_eq!(doubled.get(), 20);
        assert_eq!(plus_ten.get(), 30);
    }

    #[test]
    fn effects_rerun_when_computed_changes() {
        let base = make_ref(1);
        let squared = computed({
            let base = base.clone();
            move || base.get() * base.get()
        });
        let seen = Rc::new(Cell::new(0));

        run_effect({
            let (squared, seen) = (squared.clone(), seen.clone());
            move || seen.set(squared.get())
        });
        assert_eq!(seen.get(), 1);

        base.set(3);
        assert_eq!(seen.get(), 9);
    }

    #[test]
    fn computed_has_its_own_identity() {
        let base = make_ref(1);
        let same = computed({
            let base = base.clone();
            move || base.get()
        });
        assert_ne!(same.target(), base.target());
    }
}
