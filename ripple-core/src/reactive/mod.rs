//! Reactive Primitives
//!
//! This module implements the dependency-tracking engine: reactive objects,
//! refs, computed values, and effects.
//!
//! # Concepts
//!
//! ## Track and Trigger
//!
//! Every piece of reactive state has a [`TargetId`]. Reading a property of
//! it inside an effect records the effect under `(target, key)` in the
//! [`Runtime`] registry; writing the property re-runs everything recorded
//! there.
//!
//! ## Reactive Objects
//!
//! [`Reactive`] wraps a plain state object. Reads and writes go through
//! accessors that track and trigger per property.
//!
//! ## Refs and Computed Values
//!
//! A [`Ref`] is a reactive cell with one property, `"value"`. A [`Computed`]
//! is a read-only ref kept current by an internal effect.
//!
//! ## Effects
//!
//! An [`Effect`] runs immediately and then again, synchronously, every time
//! state it read is written.
//!
//! # Implementation Notes
//!
//! Everything is thread-local and single-threaded: the registry, the stack
//! of running effects, and the engine config. Handles are `Rc`-based and
//! cannot leave their thread.

mod key;
mod context;
mod subscriber;
mod runtime;
mod effect;
mod object;
mod refs;
mod computed;

pub use key::{PropertyKey, Target, TargetId};
pub use context::{untracked, ReactiveContext};
pub use subscriber::{Subscriber, SubscriberId};
pub use runtime::Runtime;
pub use effect::{run_effect, Effect};
pub use object::{reactive, Observable, Reactive, Record};
pub use refs::{make_ref, Ref};
pub use computed::{computed, Computed};
