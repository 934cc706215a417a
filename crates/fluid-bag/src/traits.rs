//! The [`Bag`] trait defining the shared attribute-bag contract.
//!
//! Both the open [`FluidBag`](crate::FluidBag) and the whitelist-restricted
//! bag in the `fluid-fillable` crate implement this trait. Write operations
//! return [`Result`] so restricted implementations can reject keys; the open
//! implementation never fails them.

use crate::error::{BagError, Result};
use crate::value::{AttributeMap, Value};

/// The attribute-bag contract.
///
/// Reads go through registered getter accessors before the raw map; writes
/// go through registered setter accessors. The raw bulk operations
/// ([`attributes`](Bag::attributes), [`set_attributes`](Bag::set_attributes))
/// and [`remove`](Bag::remove) bypass accessors entirely.
pub trait Bag {
    /// Short name of the concrete bag type, used in error messages.
    fn bag_name(&self) -> &'static str;

    /// Read an attribute.
    ///
    /// A registered getter for `key` wins and its result is returned, even
    /// when a raw value is stored. Otherwise the stored value is returned
    /// unless the bag's absence policy treats it as absent. Missing keys are
    /// never an error; they yield `None`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Read an attribute, falling back to `default` when absent.
    fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Read an attribute, lazily computing the default when absent.
    fn get_or_else<F>(&self, key: &str, default: F) -> Value
    where
        F: FnOnce() -> Value,
        Self: Sized,
    {
        self.get(key).unwrap_or_else(default)
    }

    /// Write an attribute.
    ///
    /// A registered setter for `key` wins and is handed the value; otherwise
    /// the value is stored directly, overwriting any prior one. Restricted
    /// bags fail with [`BagError::AttributeNotAllowed`] for keys outside
    /// their whitelist, leaving prior state untouched.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Write every entry of `map` through [`set`](Bag::set), in iteration
    /// order.
    fn fill(&mut self, map: AttributeMap) -> Result<()> {
        for (key, value) in map {
            self.set(&key, value)?;
        }
        Ok(())
    }

    /// The raw backing map. Getter accessors are not consulted.
    fn attributes(&self) -> &AttributeMap;

    /// Replace the backing map wholesale. Setter accessors are bypassed,
    /// and restricted bags do not validate the incoming keys.
    fn set_attributes(&mut self, map: AttributeMap);

    /// Project the raw entries whose keys appear in `keys`, preserving
    /// insertion order. Getter accessors are not consulted.
    fn only(&self, keys: &[&str]) -> AttributeMap {
        self.attributes()
            .iter()
            .filter(|(k, _)| keys.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Project the raw entries whose keys do *not* appear in `keys`,
    /// preserving insertion order. Getter accessors are not consulted.
    fn except(&self, keys: &[&str]) -> AttributeMap {
        self.attributes()
            .iter()
            .filter(|(k, _)| !keys.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Build the externally visible representation: the raw map minus
    /// hidden keys while hiding is on, with every remaining value replaced
    /// by its getter's result where one is registered.
    fn to_map(&self) -> AttributeMap;

    /// Serialize [`to_map`](Bag::to_map) to a JSON string.
    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_map())?)
    }

    /// Returns `true` if `key` is present in the raw backing map.
    fn has(&self, key: &str) -> bool {
        self.attributes().contains_key(key)
    }

    /// Remove `key` from the backing map directly, bypassing setter
    /// accessors. Returns the removed value, if any.
    fn remove(&mut self, key: &str) -> Option<Value>;

    /// Number of entries in the backing map.
    fn len(&self) -> usize {
        self.attributes().len()
    }

    /// Returns `true` if the backing map is empty.
    fn is_empty(&self) -> bool {
        self.attributes().is_empty()
    }

    /// Fluent call-style mutation.
    ///
    /// Exactly one argument sets the attribute named `name` and returns the
    /// bag for chaining. Any other argument count fails with
    /// [`BagError::UnsupportedOperation`] naming the attempted key.
    fn call(&mut self, name: &str, mut args: Vec<Value>) -> Result<&mut Self>
    where
        Self: Sized,
    {
        if args.len() == 1 {
            let value = args.remove(0);
            self.set(name, value)?;
            return Ok(self);
        }
        Err(BagError::UnsupportedOperation {
            key: name.to_string(),
            arity: args.len(),
            bag: self.bag_name(),
        })
    }
}
