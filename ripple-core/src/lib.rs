//! Ripple Core
//!
//! This crate provides a fine-grained reactive dependency-tracking engine.
//! Effects re-run automatically whenever the specific state they read
//! changes, without manual subscriptions.
//!
//! It implements:
//!
//! - A dependency registry mapping `(state, property)` pairs to effects
//! - Observable wrappers over plain state objects
//! - An effect runner that attributes reads to the running effect
//! - Derived primitives: refs and computed values
//!
//! # Architecture
//!
//! - `reactive`: the registry, the execution context, and the primitives
//! - `config`: thread-local engine settings (panic policy, pruning)
//! - `error`: the error type returned by usage mistakes
//!
//! # Example
//!
//! ```rust
//! use ripple_core::reactive::{run_effect, Reactive};
//! use serde_json::json;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let state = Reactive::from_json(json!({ "price": 15, "quantity": 2 }))?;
//! let total = Rc::new(Cell::new(0));
//!
//! run_effect({
//!     let (state, total) = (state.clone(), total.clone());
//!     move || {
//!         let price: i64 = state.get_as("price").unwrap_or_default();
//!         let quantity: i64 = state.get_as("quantity").unwrap_or_default();
//!         total.set(price * quantity);
//!     }
//! });
//! assert_eq!(total.get(), 30);
//!
//! state.set("quantity", 10)?;
//! assert_eq!(total.get(), 150);
//! # Ok::<(), ripple_core::ReactiveError>(())
//! ```

pub mod config;
pub mod error;
pub mod reactive;

pub use config::{EngineConfig, FailurePolicy};
pub use error::{ReactiveError, Result};
pub use reactive::{computed, make_ref, reactive, run_effect, Computed, Effect, Reactive, Ref};
