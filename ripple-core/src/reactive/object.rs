//! Reactive Objects
//!
//! [`Reactive`] wraps a plain state object so reads are tracked and writes
//! trigger. Rust has no property traps, so access goes through accessors:
//!
//! - [`Observable`] is the per-shape field interface. [`Reactive::get`] and
//!   [`Reactive::set`] use it to read and write one named property.
//! - [`Reactive::with`] and [`Reactive::update`] work for any wrapped type;
//!   the caller names the property the closure touches.
//!
//! Reads always perform the real read before tracking, and writes always
//! perform the real write before triggering. Wrapping is shallow: nested
//! values come back as plain values.

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ReactiveError, Result};

use super::key::{PropertyKey, Target, TargetId};
use super::runtime::Runtime;

/// A record with named properties that can be read and written by key.
///
/// Unknown keys should be reported as [`ReactiveError::UnknownKey`].
pub trait Observable {
    type Value;

    fn read_field(&self, key: &PropertyKey) -> Result<Self::Value>;

    fn write_field(&mut self, key: &PropertyKey, value: Self::Value) -> Result<()>;
}

struct ReactiveInner<T> {
    target: Target,
    state: RefCell<T>,
}

/// Observable view over a state object.
///
/// Clones share the state and the identity, so a write through any clone
/// reaches effects that read through any other.
pub struct Reactive<T> {
    inner: Rc<ReactiveInner<T>>,
}

impl<T: 'static> Reactive<T> {
    /// Wrap `state`. The wrapper gets a fresh identity.
    pub fn new(state: T) -> Self {
        Self {
            inner: Rc::new(ReactiveInner {
                target: Target::new(),
                state: RefCell::new(state),
            }),
        }
    }

    /// The state's identity in the dependency registry.
    pub fn target(&self) -> TargetId {
        self.inner.target.id()
    }

    /// Read through `f`, tracking `key`.
    pub fn with<K, R>(&self, key: K, f: impl FnOnce(&T) -> R) -> Result<R>
    where
        K: TryInto<PropertyKey, Error = ReactiveError>,
    {
        let key = key.try_into()?;
        let result = f(&self.inner.state.borrow());
        Runtime::track(self.target(), &key);
        Ok(result)
    }

    /// Write through `f`, then trigger `key`.
    pub fn update<K>(&self, key: K, f: impl FnOnce(&mut T)) -> Result<()>
    where
        K: TryInto<PropertyKey, Error = ReactiveError>,
    {
        let key = key.try_into()?;
        f(&mut self.inner.state.borrow_mut());
        Runtime::trigger(self.target(), &key);
        Ok(())
    }

    /// Read the whole state without tracking.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.state.borrow())
    }
}

impl<T: Clone + 'static> Reactive<T> {
    /// Copy of the whole state, untracked.
    pub fn snapshot(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T: Observable + 'static> Reactive<T> {
    /// Read the property `key`, tracking it.
    pub fn get<K>(&self, key: K) -> Result<T::Value>
    where
        K: TryInto<PropertyKey, Error = ReactiveError>,
    {
        let key = key.try_into()?;
        let value = self.inner.state.borrow().read_field(&key)?;
        Runtime::track(self.target(), &key);
        Ok(value)
    }

    /// Write the property `key`, then trigger it.
    ///
    /// A rejected write does not trigger.
    pub fn set<K>(&self, key: K, value: impl Into<T::Value>) -> Result<()>
    where
        K: TryInto<PropertyKey, Error = ReactiveError>,
    {
        let key = key.try_into()?;
        self.inner
            .state
            .borrow_mut()
            .write_field(&key, value.into())?;
        Runtime::trigger(self.target(), &key);
        Ok(())
    }
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Debug> Debug for Reactive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactive")
            .field("target", &self.inner.target.id())
            .field("state", &self.inner.state.borrow())
            .finish()
    }
}

/// Make `state` reactive.
pub fn reactive<T: 'static>(state: T) -> Reactive<T> {
    Reactive::new(state)
}

// ----------------------------------------------------------------------------
// Dynamic records
// ----------------------------------------------------------------------------

/// A JSON object with arbitrary properties.
///
/// Reading a missing property yields `null` and is still tracked, so an
/// effect re-runs once the property is added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for Record {
    type Error = ReactiveError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ReactiveError::NotAnObject(kind(&other))),
        }
    }
}

impl Observable for Record {
    type Value = Value;

    fn read_field(&self, key: &PropertyKey) -> Result<Value> {
        Ok(self.0.get(key.as_str()).cloned().unwrap_or(Value::Null))
    }

    fn write_field(&mut self, key: &PropertyKey, value: Value) -> Result<()> {
        self.0.insert(key.as_str().to_owned(), value);
        Ok(())
    }
}

impl Reactive<Record> {
    /// Wrap a JSON object.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(Self::new(Record::try_from(value)?))
    }

    /// Read the property `key` as `V`, tracking it.
    pub fn get_as<K, V>(&self, key: K) -> Result<V>
    where
        K: TryInto<PropertyKey, Error = ReactiveError>,
        V: DeserializeOwned,
    {
        let key = key.try_into()?;
        let value = self.get(&key)?;
        serde_json::from_value(value).map_err(|source| ReactiveError::ValueType {
            key: key.to_string(),
            source,
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
