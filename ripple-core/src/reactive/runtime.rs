//! Reactive Runtime
//!
//! The runtime owns the dependency registry: target → property key → the
//! set of subscribers that read that property. It implements the two halves
//! of the tracking protocol.
//!
//! # How It Works
//!
//! 1. When reactive state is read inside an effect, [`Runtime::track`] adds
//!    the active subscriber to the set for `(target, key)`. Outside an effect
//!    tracking is a no-op.
//!
//! 2. When reactive state is written, [`Runtime::trigger`] runs every
//!    subscriber in the set for `(target, key)`, synchronously and in
//!    registration order. Untracked pairs are silently ignored.
//!
//! 3. Subscribers re-track while they re-run, so their dependency sets are
//!    refreshed on every pass.
//!
//! # Entry Lifetime
//!
//! Entries are keyed by [`TargetId`], never by a reference to the state. The
//! entry for a target is created on first track and removed when the state's
//! [`Target`](super::Target) token is dropped.
//!
//! The registry does hold its subscribers strongly. An effect whose closure
//! captures a clone of the state therefore keeps that state, and its entry,
//! alive until the effect is disposed and the last [`Effect`](super::Effect)
//! handle is dropped. Dropping every user handle to the state is not enough
//! on its own.
//!
//! # Re-entrancy
//!
//! A trigger pass iterates over a snapshot of the set taken before the first
//! subscriber runs. Subscribers re-added or added during the pass are seen by
//! the next trigger, not this one. No registry borrow is held while user code
//! runs, and subscribers removed from the registry are dropped only after the
//! borrow is released, since dropping one can drop a `Target` in turn.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::config::{self, FailurePolicy};

use super::context::ReactiveContext;
use super::key::{PropertyKey, TargetId};
use super::subscriber::{Subscriber, SubscriberId};

/// Subscribers registered under one key, in registration order.
type EffectSet = IndexMap<SubscriberId, Subscriber>;

/// Snapshot of an effect set taken at trigger time.
type TriggerBatch = SmallVec<[Subscriber; 4]>;

thread_local! {
    static TARGETS: RefCell<HashMap<TargetId, HashMap<PropertyKey, EffectSet>>> =
        RefCell::new(HashMap::new());
}

/// The thread-local dependency registry.
pub struct Runtime;

impl Runtime {
    /// Record that the active effect read `(target, key)`.
    ///
    /// Does nothing when no effect is running.
    pub fn track(target: TargetId, key: &PropertyKey) {
        let Some(subscriber) = ReactiveContext::current() else {
            return;
        };
        // Disposed mid-run; reads after dispose() must not re-register
        if subscriber.is_disposed() {
            return;
        }

        let inserted = TARGETS.with(|targets| {
            let mut targets = targets.borrow_mut();
            let set = targets
                .entry(target)
                .or_default()
                .entry(key.clone())
                .or_default();

            if set.contains_key(&subscriber.id()) {
                false
            } else {
                set.insert(subscriber.id(), subscriber.clone());
                true
            }
        });

        if inserted {
            subscriber.record_dependency((target, key.clone()));
            tracing::trace!(%target, %key, effect = %subscriber.id(), "tracked");
        }
    }

    /// Run every subscriber registered under `(target, key)`.
    ///
    /// Panics raised by subscribers are handled per the thread's
    /// [`FailurePolicy`].
    pub fn trigger(target: TargetId, key: &PropertyKey) {
        let batch: TriggerBatch = TARGETS.with(|targets| {
            targets
                .borrow()
                .get(&target)
                .and_then(|keys| keys.get(key))
                .map(|set| set.values().cloned().collect())
                .unwrap_or_default()
        });

        if batch.is_empty() {
            return;
        }

        tracing::trace!(%target, %key, effects = batch.len(), "triggering");

        match config::failure_policy() {
            FailurePolicy::Propagate => {
                for subscriber in &batch {
                    subscriber.run();
                }
            }
            FailurePolicy::Isolate => {
                for subscriber in &batch {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| subscriber.run()));
                    if let Err(payload) = outcome {
                        tracing::error!(
                            %target,
                            %key,
                            effect = %subscriber.id(),
                            panic = panic_message(payload.as_ref()),
                            "effect panicked during trigger; continuing"
                        );
                    }
                }
            }
        }
    }

    /// Remove `subscriber` from every set it is registered in.
    pub fn clear_dependencies(subscriber: &Subscriber) {
        let dependencies = subscriber.take_dependencies();
        if dependencies.is_empty() {
            return;
        }

        let removed: Vec<Subscriber> = TARGETS.with(|targets| {
            let mut targets = targets.borrow_mut();
            dependencies
                .iter()
                .filter_map(|(target, key)| {
                    targets
                        .get_mut(target)
                        .and_then(|keys| keys.get_mut(key))
                        .and_then(|set| set.shift_remove(&subscriber.id()))
                })
                .collect()
        });

        drop(removed);
    }

    /// Drop the registry entry for `target`.
    pub(crate) fn forget_target(target: TargetId) {
        // The registry may already be gone during thread teardown.
        let Ok(Some(keys)) = TARGETS.try_with(|targets| targets.borrow_mut().remove(&target))
        else {
            return;
        };

        for set in keys.values() {
            for subscriber in set.values() {
                subscriber.forget_target(target);
            }
        }

        tracing::debug!(%target, keys = keys.len(), "registry entry removed");
        drop(keys);
    }

    /// Number of subscribers registered under `(target, key)`.
    pub fn dependant_count(target: TargetId, key: &PropertyKey) -> usize {
        TARGETS.with(|targets| {
            targets
                .borrow()
                .get(&target)
                .and_then(|keys| keys.get(key))
                .map_or(0, IndexMap::len)
        })
    }

    /// Whether the registry holds an entry for `target`.
    pub fn is_tracked(target: TargetId) -> bool {
        TARGETS.with(|targets| targets.borrow().contains_key(&target))
    }

    /// Check if we're inside an effect.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
