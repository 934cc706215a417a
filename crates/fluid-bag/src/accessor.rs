//! The per-key getter/setter registration table.
//!
//! Accessors override the default read/write behavior for a single key. In
//! the dynamic-language ancestry of this container they were discovered by
//! synthesizing method names at runtime; here they are an explicit table
//! populated at construction and consulted before the raw map.
//!
//! A getter receives the raw attribute map and produces the externally
//! visible value for its key, ignoring whatever is stored there. A setter
//! receives the raw map and the incoming value and is itself responsible
//! for storing (possibly transformed) state.

use std::collections::HashMap;
use std::fmt;

use crate::value::{AttributeMap, Value};

/// A registered getter accessor.
pub type Getter = Box<dyn Fn(&AttributeMap) -> Value>;

/// A registered setter accessor.
pub type Setter = Box<dyn Fn(&mut AttributeMap, Value)>;

/// Registration table mapping attribute keys to their accessors.
#[derive(Default)]
pub struct AccessorTable {
    getters: HashMap<String, Getter>,
    setters: HashMap<String, Setter>,
}

impl AccessorTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a getter for `key`, replacing any previous one.
    pub fn register_getter<F>(&mut self, key: impl Into<String>, getter: F)
    where
        F: Fn(&AttributeMap) -> Value + 'static,
    {
        self.getters.insert(key.into(), Box::new(getter));
    }

    /// Register a setter for `key`, replacing any previous one.
    pub fn register_setter<F>(&mut self, key: impl Into<String>, setter: F)
    where
        F: Fn(&mut AttributeMap, Value) + 'static,
    {
        self.setters.insert(key.into(), Box::new(setter));
    }

    /// Look up the getter registered for `key`, if any.
    pub fn getter(&self, key: &str) -> Option<&Getter> {
        self.getters.get(key)
    }

    /// Look up the setter registered for `key`, if any.
    pub fn setter(&self, key: &str) -> Option<&Setter> {
        self.setters.get(key)
    }

    /// Returns `true` if no accessors are registered.
    pub fn is_empty(&self) -> bool {
        self.getters.is_empty() && self.setters.is_empty()
    }
}

impl fmt::Debug for AccessorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorTable")
            .field("getters", &self.getters.keys().collect::<Vec<_>>())
            .field("setters", &self.setters.keys().collect::<Vec<_>>())
            .finish()
    }
}
