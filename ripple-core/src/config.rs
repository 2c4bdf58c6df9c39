//! Engine Configuration
//!
//! The configuration is thread-local, like the rest of the engine state. It is
//! read on every effect run and every trigger pass, so a newly installed
//! config takes effect immediately.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::error::Result;

thread_local! {
    static CONFIG: RefCell<EngineConfig> = RefCell::new(EngineConfig::default());
}

/// What a trigger pass does when one of its effects panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Let the panic unwind out of the write that triggered it. Effects later
    /// in the same pass are skipped.
    #[default]
    Propagate,

    /// Catch the panic, log it, and continue with the next effect.
    Isolate,
}

/// Tunables for the reactive engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Panic handling inside trigger passes.
    pub failure_policy: FailurePolicy,

    /// Drop an effect's previous dependencies before each run, so only the
    /// keys read by the latest run can trigger it.
    pub prune_stale_dependencies: bool,
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Install `config` for the current thread, returning the previous one.
pub fn install(config: EngineConfig) -> EngineConfig {
    tracing::debug!(?config, "installing engine config");
    CONFIG.with(|current| current.replace(config))
}

/// The configuration active on the current thread.
pub fn current() -> EngineConfig {
    CONFIG.with(|current| current.borrow().clone())
}

pub(crate) fn failure_policy() -> FailurePolicy {
    CONFIG.with(|current| current.borrow().failure_policy)
}

pub(crate) fn prune_stale_dependencies() -> bool {
    CONFIG.with(|current| current.borrow().prune_stale_dependencies)
}
