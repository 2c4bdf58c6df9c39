//! Effect Implementation
//!
//! An Effect is a side-effecting procedure that re-runs whenever state it
//! read changes.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs immediately as the active effect, so
//!    every reactive read it performs is tracked against it.
//!
//! 2. When any tracked `(target, key)` is written, the runtime runs the
//!    effect again, synchronously, inside the write call.
//!
//! 3. Each re-run tracks again. Keys read on an earlier run but not on the
//!    latest one stay registered unless stale-dependency pruning is enabled
//!    in [`EngineConfig`](crate::config::EngineConfig).
//!
//! # Lifetime
//!
//! The registry holds the effect for as long as it has dependencies, so the
//! returned [`Effect`] can be dropped without stopping it. Call
//! [`Effect::dispose`] to stop it.

use std::fmt;

use super::subscriber::{Subscriber, SubscriberId};

/// Handle to a registered effect.
///
/// # Example
///
/// ```rust
/// use ripple_core::reactive::{make_ref, run_effect};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let count = make_ref(1);
/// let seen = Rc::new(Cell::new(0));
///
/// let effect = run_effect({
///     let (count, seen) = (count.clone(), seen.clone());
///     move || seen.set(count.get())
/// });
/// assert_eq!(seen.get(), 1);
///
/// count.set(5);
/// assert_eq!(seen.get(), 5);
///
/// effect.dispose();
/// count.set(9);
/// assert_eq!(seen.get(), 5);
/// ```
#[derive(Clone)]
pub struct Effect {
    subscriber: Subscriber,
}

impl Effect {
    /// Register `run` and execute it once immediately.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        let effect = Self {
            subscriber: Subscriber::new(run),
        };
        tracing::debug!(effect = %effect.id(), "effect created");

        effect.execute();
        effect
    }

    /// Wrap a subscriber that has already had its first run.
    pub(crate) fn from_subscriber(subscriber: Subscriber) -> Self {
        let effect = Self { subscriber };
        tracing::debug!(effect = %effect.id(), "effect created");
        effect
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.subscriber.id()
    }

    /// Run the effect again as the active effect.
    ///
    /// Does nothing once the effect has been disposed.
    pub fn execute(&self) {
        self.subscriber.run();
    }

    /// Stop the effect and unregister it from every dependency set.
    pub fn dispose(&self) {
        self.subscriber.dispose();
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.subscriber.is_disposed()
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.subscriber.run_count()
    }

    /// Get the number of `(target, key)` pairs the effect is registered under.
    pub fn dependency_count(&self) -> usize {
        self.subscriber.dependency_count()
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Register `run` as an effect and execute it once.
///
/// If `run` panics the panic propagates to the caller, and the previously
/// active effect (if any) is restored first.
pub fn run_effect<F>(run: F) -> Effect
where
    F: Fn() + 'static,
{
    Effect::new(run)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::context::ReactiveContext;
    use crate::reactive::key::PropertyKey;
    use crate::reactive::make_ref;
    use crate::reactive::runtime::Runtime;
    use std::cell::{Cell, RefCell};
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    #[test]
    fn effect_runs_on_creation() {
        let run_count = Rc::new(Cell::new(0));
        let run_count_clone = run_count.clone();

        let effect = Effect::new(move || {
            run_count_clone.set(run_count_clone.get() + 1);
        });

        // Effect should have run once on creation
        assert_eq!(run_count.get(), 1);
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn effect_reruns_when_dependency_changes() {
        let source = make_ref(0);
        let observed = Rc::new(Cell::new(-1));

        let effect = run_effect({
            let (source, observed) = (source.clone(), observed.clone());
            move || observed.set(source.get())
        });
        assert_eq!(observed.get(), 0);

        source.set(42);
        assert_eq!(observed.get(), 42);
        assert_eq!(effect.run_count(), 2);
    }

    #[test]
    fn effect_does_not_run_after_disposal() {
        let source = make_ref(0);
        let effect = run_effect({
            let source = source.clone();
            move || {
                source.get();
            }
        });
        assert_eq!(effect.dependency_count(), 1);

        effect.dispose();
        assert!(effect.is_disposed());
        assert_eq!(effect.dependency_count(), 0);

        source.set(1);
        effect.execute();
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn effect_disposed_mid_run_stops_tracking() {
        let first = make_ref(0);
        let second = make_ref(0);
        let handle: Rc<RefCell<Option<Effect>>> = Rc::new(RefCell::new(None));

        let effect = run_effect({
            let (first, second, handle) = (first.clone(), second.clone(), handle.clone());
            move || {
                first.get();
                if let Some(effect) = handle.borrow().as_ref() {
                    effect.dispose();
                }
                second.get();
            }
        });
        *handle.borrow_mut() = Some(effect.clone());
        assert_eq!(effect.dependency_count(), 2);

        first.set(1);
        assert!(effect.is_disposed());
        assert_eq!(effect.dependency_count(), 0);
        assert_eq!(Runtime::dependant_count(second.target(), &PropertyKey::VALUE), 0);

        second.set(1);
        assert_eq!(effect.run_count(), 2);

        // Break the handle cycle
        handle.borrow_mut().take();
    }

    #[test]
    fn dropped_handle_keeps_effect_alive() {
        let source = make_ref(0);
        let observed = Rc::new(Cell::new(0));

        drop(run_effect({
            let (source, observed) = (source.clone(), observed.clone());
            move || observed.set(source.get())
        }));

        source.set(3);
        assert_eq!(observed.get(), 3);
    }

    #[test]
    fn nested_effects_restore_outer() {
        let outer_source = make_ref(0);
        let inner_source = make_ref(0);
        let outer_runs = Rc::new(Cell::new(0));

        let _outer = run_effect({
            let (outer_source, inner_source, outer_runs) =
                (outer_source.clone(), inner_source.clone(), outer_runs.clone());
            move || {
                outer_runs.set(outer_runs.get() + 1);
                let inner_source = inner_source.clone();
                run_effect(move || {
                    inner_source.get();
                });
                // Read after the inner effect finished: tracked against the outer one
                outer_source.get();
            }
        });
        assert_eq!(outer_runs.get(), 1);

        outer_source.set(1);
        assert_eq!(outer_runs.get(), 2);

        // Only inner effects depend on this
        inner_source.set(1);
        assert_eq!(outer_runs.get(), 2);
    }

    #[test]
    fn panicking_effect_clears_context() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            run_effect(|| panic!("effect body failed"));
        }));

        assert!(outcome.is_err());
        assert!(!ReactiveContext::is_active());
    }

    #[test]
    fn effect_clone_shares_state() {
        let effect1 = Effect::new(|| {});
        let effect2 = effect1.clone();

        assert_eq!(effect1.id(), effect2.id());

        effect1.execute();
        assert_eq!(effect2.run_count(), 2);

        effect1.dispose();
        assert!(effect2.is_disposed());
    }
}
