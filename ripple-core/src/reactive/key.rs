//! Property keys and target identities.
//!
//! Every piece of reactive state owns a [`Target`]. The target's id is the
//! key of its entry in the dependency registry, so two structurally equal
//! objects never share dependants. Dropping the target removes the entry.
//!
//! The target is dropped with the last owner of the state. Effects that
//! capture the state in their closure are owners too, and the registry keeps
//! them until they are disposed, so their state outlives every other handle
//! until then.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ReactiveError, Result};

use super::runtime::Runtime;

/// Name of a property on a piece of reactive state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey(Cow<'static, str>);

impl PropertyKey {
    /// The single key every [`Ref`](super::Ref) is tracked under.
    pub const VALUE: PropertyKey = PropertyKey(Cow::Borrowed("value"));

    /// Build a key, rejecting empty names.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ReactiveError::InvalidKey(name.into_owned()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&'static str> for PropertyKey {
    type Error = ReactiveError;

    fn try_from(name: &'static str) -> Result<Self> {
        Self::new(name)
    }
}

impl TryFrom<String> for PropertyKey {
    type Error = ReactiveError;

    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl TryFrom<&PropertyKey> for PropertyKey {
    type Error = ReactiveError;

    fn try_from(key: &PropertyKey) -> Result<Self> {
        Ok(key.clone())
    }
}

/// Identity of a piece of reactive state in the dependency registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(u64);

impl TargetId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Identity token owned by a piece of reactive state.
///
/// Not `Clone`: there is exactly one token per state object, and the
/// registry entry for it is removed when the token is dropped.
#[derive(Debug)]
pub struct Target {
    id: TargetId,
}

impl Target {
    pub fn new() -> Self {
        Self { id: TargetId::next() }
    }

    pub fn id(&self) -> TargetId {
        self.id
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Target {
    fn drop(&mut self) {
        Runtime::forget_target(self.id);
    }
}
