//! The [`FillableBag`] implementation.

use std::fmt;
use std::ops;

use serde::{Serialize, Serializer};
use tracing::debug;

use fluid_bag::{
    object_from_json, AbsencePolicy, AttributeMap, Bag, BagError, FluidBag, Result, Value,
};

/// An attribute bag that only accepts a fixed whitelist of keys.
///
/// Wraps a core [`FluidBag`] and validates every `set`/`fill` key against
/// the fillable list before delegating. The raw bulk operations
/// (`set_attributes`, [`create_raw`](FillableBag::create_raw)) bypass both
/// setter accessors and whitelist validation, matching the open bag's
/// contract that raw accessors skip interception entirely.
///
/// ```
/// use fluid_fillable::{Bag, BagError, FillableBag};
/// use serde_json::json;
///
/// let mut bag = FillableBag::new(["name", "email"]);
/// bag.set("name", json!("ada"))?;
/// assert!(matches!(
///     bag.set("admin", json!(true)),
///     Err(BagError::AttributeNotAllowed { .. })
/// ));
/// # Ok::<(), fluid_fillable::BagError>(())
/// ```
pub struct FillableBag {
    inner: FluidBag,
    fillable: Vec<String>,
}

impl FillableBag {
    /// Create an empty bag accepting only the given keys.
    pub fn new<I, S>(fillable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: FluidBag::new(),
            fillable: fillable.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a bag and fill it with `attributes`, validating every key
    /// against the whitelist and running setter accessors.
    pub fn create<I, S>(fillable: I, attributes: AttributeMap) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut bag = Self::new(fillable);
        bag.fill(attributes)?;
        Ok(bag)
    }

    /// Create a bag with `attributes` installed wholesale.
    ///
    /// Raw installation bypasses setter accessors and whitelist validation
    /// alike; later `set`/`fill` calls still enforce the whitelist.
    pub fn create_raw<I, S>(fillable: I, attributes: AttributeMap) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut bag = Self::new(fillable);
        bag.set_attributes(attributes);
        bag
    }

    /// Parse a JSON object string and [`create`](FillableBag::create) a bag
    /// from it.
    pub fn from_json<I, S>(fillable: I, json: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::create(fillable, object_from_json(json)?)
    }

    /// The keys this bag accepts.
    pub fn fillable(&self) -> &[String] {
        &self.fillable
    }

    /// Replace the whitelist. Attributes already stored are unaffected.
    pub fn set_fillable<I, S>(&mut self, fillable: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fillable = fillable.into_iter().map(Into::into).collect();
    }

    /// Register a getter accessor for `key` (builder style).
    pub fn with_getter<F>(mut self, key: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&AttributeMap) -> Value + 'static,
    {
        self.inner = self.inner.with_getter(key, getter);
        self
    }

    /// Register a setter accessor for `key` (builder style).
    pub fn with_setter<F>(mut self, key: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut AttributeMap, Value) + 'static,
    {
        self.inner = self.inner.with_setter(key, setter);
        self
    }

    /// Set the absence policy (builder style).
    pub fn with_policy(mut self, policy: AbsencePolicy) -> Self {
        self.inner = self.inner.with_policy(policy);
        self
    }

    /// Set the hidden-key list (builder style).
    pub fn with_hidden<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner = self.inner.with_hidden(keys);
        self
    }

    /// Keys suppressed from serialized output while hiding is on.
    pub fn hidden(&self) -> &[String] {
        self.inner.hidden()
    }

    /// Replace the hidden-key list.
    pub fn set_hidden<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.set_hidden(keys);
    }

    /// Returns `true` if hidden keys are currently suppressed from
    /// serialized output.
    pub fn is_hiding(&self) -> bool {
        self.inner.is_hiding()
    }

    /// Suppress hidden keys from `to_map`/`to_json` output.
    pub fn hide(&mut self) {
        self.inner.hide();
    }

    /// Stop suppressing hidden keys.
    pub fn show(&mut self) {
        self.inner.show();
    }

    /// Iterate over the raw entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.iter()
    }

    fn ensure_fillable(&self, key: &str) -> Result<()> {
        if self.fillable.iter().any(|allowed| allowed == key) {
            return Ok(());
        }
        debug!(key = %key, "rejected non-fillable attribute");
        Err(BagError::AttributeNotAllowed {
            key: key.to_string(),
            bag: self.bag_name(),
        })
    }
}

/// A default bag has an empty whitelist: every `set`/`fill` fails until
/// [`set_fillable`](FillableBag::set_fillable) supplies one.
impl Default for FillableBag {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl Bag for FillableBag {
    fn bag_name(&self) -> &'static str {
        "FillableBag"
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.ensure_fillable(key)?;
        self.inner.set(key, value)
    }

    /// All-or-nothing batch write: the whole batch is validated against the
    /// whitelist before any entry is applied.
    fn fill(&mut self, map: AttributeMap) -> Result<()> {
        for key in map.keys() {
            self.ensure_fillable(key)?;
        }
        for (key, value) in map {
            self.inner.set(&key, value)?;
        }
        Ok(())
    }

    fn attributes(&self) -> &AttributeMap {
        self.inner.attributes()
    }

    fn set_attributes(&mut self, map: AttributeMap) {
        self.inner.set_attributes(map);
    }

    fn to_map(&self) -> AttributeMap {
        self.inner.to_map()
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        self.inner.remove(key)
    }
}

/// Read sugar over the raw attributes; missing keys yield JSON `null`.
impl ops::Index<&str> for FillableBag {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.inner[key]
    }
}

impl Serialize for FillableBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

/// Displays as the JSON representation, identical to `to_json`.
impl fmt::Display for FillableBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for FillableBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillableBag")
            .field("inner", &self.inner)
            .field("fillable", &self.fillable)
            .finish()
    }
}
