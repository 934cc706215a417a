//! The core [`FluidBag`] implementation.

use std::fmt;
use std::ops;

use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::accessor::AccessorTable;
use crate::error::Result;
use crate::traits::Bag;
use crate::value::{object_from_json, AbsencePolicy, AttributeMap, Value};

static NULL: Value = Value::Null;

/// A dynamically-typed attribute bag.
///
/// Attributes are stored in insertion order and read/written through the
/// [`Bag`] trait. Per-key accessors and the absence policy are configured at
/// construction with the `with_*` builders:
///
/// ```
/// use fluid_bag::{Bag, FluidBag};
/// use serde_json::json;
///
/// let mut bag = FluidBag::new()
///     .with_setter("name", |attrs, value| {
///         let name = value.as_str().unwrap_or_default().to_uppercase();
///         attrs.insert("name".to_string(), json!(name));
///     });
/// bag.set("name", json!("ada"))?;
/// assert_eq!(bag.get("name"), Some(json!("ADA")));
/// # Ok::<(), fluid_bag::BagError>(())
/// ```
///
/// Hiding suppresses keys from `to_map`/`to_json` only; hidden attributes
/// stay in the bag and remain readable through `get`.
#[derive(Default)]
pub struct FluidBag {
    attributes: AttributeMap,
    accessors: AccessorTable,
    hidden: Vec<String>,
    hiding: bool,
    policy: AbsencePolicy,
}

impl FluidBag {
    /// Create an empty bag with the default absence policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bag and fill it with `attributes`, running setter accessors.
    ///
    /// A fresh bag has no accessors registered, so this is equivalent to
    /// [`create_raw`](FluidBag::create_raw) unless setters are registered
    /// first and the bag is filled afterwards.
    pub fn create(attributes: AttributeMap) -> Self {
        let mut bag = Self::new();
        for (key, value) in attributes {
            bag.store(&key, value);
        }
        bag
    }

    /// Create a bag with `attributes` installed wholesale, bypassing setter
    /// accessors.
    pub fn create_raw(attributes: AttributeMap) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    /// Parse a JSON object string and [`create`](FluidBag::create) a bag
    /// from it.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::create(object_from_json(json)?))
    }

    /// Register a getter accessor for `key` (builder style).
    pub fn with_getter<F>(mut self, key: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&AttributeMap) -> Value + 'static,
    {
        self.accessors.register_getter(key, getter);
        self
    }

    /// Register a setter accessor for `key` (builder style).
    pub fn with_setter<F>(mut self, key: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut AttributeMap, Value) + 'static,
    {
        self.accessors.register_setter(key, setter);
        self
    }

    /// Set the absence policy (builder style).
    pub fn with_policy(mut self, policy: AbsencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the hidden-key list (builder style). Hiding itself stays off
    /// until [`hide`](FluidBag::hide) is called.
    pub fn with_hidden<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_hidden(keys);
        self
    }

    /// Register a getter accessor for `key`, replacing any previous one.
    pub fn register_getter<F>(&mut self, key: impl Into<String>, getter: F)
    where
        F: Fn(&AttributeMap) -> Value + 'static,
    {
        self.accessors.register_getter(key, getter);
    }

    /// Register a setter accessor for `key`, replacing any previous one.
    pub fn register_setter<F>(&mut self, key: impl Into<String>, setter: F)
    where
        F: Fn(&mut AttributeMap, Value) + 'static,
    {
        self.accessors.register_setter(key, setter);
    }

    /// The absence policy in effect for this bag.
    pub fn policy(&self) -> AbsencePolicy {
        self.policy
    }

    /// Keys suppressed from serialized output while hiding is on.
    ///
    /// The list may name keys not present in the bag; that is not an error.
    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    /// Replace the hidden-key list.
    pub fn set_hidden<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden = keys.into_iter().map(Into::into).collect();
    }

    /// Returns `true` if hidden keys are currently suppressed from
    /// serialized output.
    pub fn is_hiding(&self) -> bool {
        self.hiding
    }

    /// Suppress hidden keys from `to_map`/`to_json` output.
    pub fn hide(&mut self) {
        self.hiding = true;
    }

    /// Stop suppressing hidden keys; all attributes serialize again.
    pub fn show(&mut self) {
        self.hiding = false;
    }

    /// Iterate over the raw entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.attributes.iter()
    }

    /// Setter-aware write: a registered setter stores state itself,
    /// otherwise the value lands in the map directly.
    fn store(&mut self, key: &str, value: Value) {
        if let Some(setter) = self.accessors.setter(key) {
            trace!(key = %key, "attribute set via accessor");
            setter(&mut self.attributes, value);
            return;
        }
        trace!(key = %key, "attribute set");
        self.attributes.insert(key.to_string(), value);
    }
}

impl Bag for FluidBag {
    fn bag_name(&self) -> &'static str {
        "FluidBag"
    }

    fn get(&self, key: &str) -> Option<Value> {
        if let Some(getter) = self.accessors.getter(key) {
            return Some(getter(&self.attributes));
        }
        match self.attributes.get(key) {
            Some(value) if !self.policy.treats_as_absent(value) => Some(value.clone()),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.store(key, value);
        Ok(())
    }

    fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    fn set_attributes(&mut self, map: AttributeMap) {
        debug!(count = map.len(), "raw attributes replaced");
        self.attributes = map;
    }

    fn to_map(&self) -> AttributeMap {
        let mut map = if self.hiding && !self.hidden.is_empty() {
            let hidden: Vec<&str> = self.hidden.iter().map(String::as_str).collect();
            self.except(&hidden)
        } else {
            self.attributes.clone()
        };
        for (key, value) in map.iter_mut() {
            if let Some(getter) = self.accessors.getter(key) {
                *value = getter(&self.attributes);
            }
        }
        map
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        trace!(key = %key, "attribute removed");
        self.attributes.shift_remove(key)
    }
}

/// Read sugar over the raw attributes. Missing keys yield JSON `null`,
/// mirroring `get`'s no-error-on-missing contract; getter accessors are not
/// consulted.
impl ops::Index<&str> for FluidBag {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.attributes.get(key).unwrap_or(&NULL)
    }
}

impl Serialize for FluidBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

/// Displays as the JSON representation, identical to `to_json`.
impl fmt::Display for FluidBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.to_map()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl fmt::Debug for FluidBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluidBag")
            .field("attributes", &self.attributes)
            .field("accessors", &self.accessors)
            .field("hidden", &self.hidden)
            .field("hiding", &self.hiding)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<'a> IntoIterator for &'a FluidBag {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<AttributeMap> for FluidBag {
    fn from(attributes: AttributeMap) -> Self {
        Self::create(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BagError;
    use serde_json::json;

    /// Helper to build an attribute map from key/value pairs.
    fn attrs(pairs: &[(&str, Value)]) -> AttributeMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn create_then_to_map_returns_the_same_attributes() {
        let map = attrs(&[("foo", json!("bar")), ("baz", json!(9))]);
        let bag = FluidBag::create(map.clone());
        assert_eq!(bag.to_map(), map);
    }

    #[test]
    fn get_returns_stored_values_and_defaults() {
        let bag = FluidBag::create(attrs(&[("foo", json!("bar"))]));
        assert_eq!(bag.get("foo"), Some(json!("bar")));
        assert_eq!(bag.get("missing"), None);
        assert_eq!(bag.get_or("missing", json!("fallback")), json!("fallback"));
        assert_eq!(bag.get_or_else("missing", || json!(42)), json!(42));
    }

    #[test]
    fn lazy_default_is_not_evaluated_when_present() {
        let bag = FluidBag::create(attrs(&[("foo", json!(1))]));
        let value = bag.get_or_else("foo", || unreachable!("default must stay lazy"));
        assert_eq!(value, json!(1));
    }

    #[test]
    fn getter_accessor_wins_over_stored_value() {
        let mut bag = FluidBag::new().with_getter("name", |attrs| {
            let raw = attrs.get("name").and_then(Value::as_str).unwrap_or("");
            json!(format!("Dr. {raw}"))
        });
        bag.set("name", json!("Who")).unwrap();

        assert_eq!(bag.get("name"), Some(json!("Dr. Who")));
        // Raw access still sees the stored value.
        assert_eq!(bag.attributes().get("name"), Some(&json!("Who")));
    }

    #[test]
    fn setter_accessor_controls_what_is_stored() {
        let mut bag = FluidBag::new().with_setter("age", |attrs, value| {
            let n = value.as_i64().unwrap_or(0).max(0);
            attrs.insert("age".to_string(), json!(n));
        });
        bag.set("age", json!(-5)).unwrap();
        assert_eq!(bag.get("age"), Some(json!(0)));
    }

    #[test]
    fn fill_runs_setters_but_set_attributes_bypasses_them() {
        let make_bag = || {
            FluidBag::new().with_setter("tag", |attrs, value| {
                let text = value.as_str().unwrap_or_default().to_uppercase();
                attrs.insert("tag".to_string(), json!(text));
            })
        };

        let mut filled = make_bag();
        filled.fill(attrs(&[("tag", json!("low"))])).unwrap();
        assert_eq!(filled.get("tag"), Some(json!("LOW")));

        let mut raw = make_bag();
        raw.set_attributes(attrs(&[("tag", json!("low"))]));
        assert_eq!(raw.get("tag"), Some(json!("low")));
    }

    #[test]
    fn hidden_keys_drop_from_output_but_stay_readable() {
        let mut bag = FluidBag::create(attrs(&[
            ("visible", json!(1)),
            ("secret", json!("hunter2")),
        ]));
        bag.set_hidden(["secret"]);
        bag.hide();

        let map = bag.to_map();
        assert!(map.contains_key("visible"));
        assert!(!map.contains_key("secret"));
        assert!(!bag.to_json().unwrap().contains("hunter2"));

        // Hidden is a serialization concern only.
        assert_eq!(bag.get("secret"), Some(json!("hunter2")));
        assert!(bag.has("secret"));
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn hiding_off_serializes_everything() {
        let mut bag = FluidBag::create(attrs(&[("secret", json!("x"))]));
        bag.set_hidden(["secret"]);
        assert!(!bag.is_hiding());
        assert!(bag.to_map().contains_key("secret"));

        bag.hide();
        assert!(!bag.to_map().contains_key("secret"));
        bag.show();
        assert!(bag.to_map().contains_key("secret"));
    }

    #[test]
    fn hidden_list_may_name_absent_keys() {
        let mut bag = FluidBag::create(attrs(&[("a", json!(1))]));
        bag.set_hidden(["never-stored"]);
        bag.hide();
        assert_eq!(bag.to_map(), attrs(&[("a", json!(1))]));
    }

    #[test]
    fn getters_apply_to_serialized_output() {
        let mut bag = FluidBag::new().with_getter("count", |_| json!(99));
        bag.set("count", json!(1)).unwrap();
        assert_eq!(bag.to_map().get("count"), Some(&json!(99)));
    }

    #[test]
    fn only_and_except_project_raw_values() {
        let bag = FluidBag::create(attrs(&[("foo", json!("bar")), ("baz", json!("qux"))]));
        assert_eq!(bag.only(&["foo"]), attrs(&[("foo", json!("bar"))]));
        assert_eq!(bag.except(&["baz"]), attrs(&[("foo", json!("bar"))]));
        assert_eq!(bag.only(&["nope"]), AttributeMap::new());
    }

    #[test]
    fn remove_bypasses_setters_and_updates_len() {
        let mut bag = FluidBag::new().with_setter("k", |_, _| {
            unreachable!("remove must not invoke setters");
        });
        bag.set_attributes(attrs(&[("k", json!(1)), ("other", json!(2))]));

        assert_eq!(bag.remove("k"), Some(json!(1)));
        assert_eq!(bag.remove("k"), None);
        assert_eq!(bag.len(), 1);
        assert!(!bag.has("k"));
    }

    #[test]
    fn fluent_calls_chain_and_reject_bad_arity() {
        let mut bag = FluidBag::new();
        bag.call("foo", vec![json!("bar")])
            .unwrap()
            .call("baz", vec![json!("qux")])
            .unwrap();
        assert_eq!(bag.get("foo"), Some(json!("bar")));
        assert_eq!(bag.get("baz"), Some(json!("qux")));

        let err = bag.call("foo", vec![json!(1), json!(2)]).unwrap_err();
        match err {
            BagError::UnsupportedOperation { key, arity, bag } => {
                assert_eq!(key, "foo");
                assert_eq!(arity, 2);
                assert_eq!(bag, "FluidBag");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(bag.call("foo", vec![]).is_err());
    }

    #[test]
    fn json_round_trip_preserves_the_visible_map() {
        let bag = FluidBag::create(attrs(&[
            ("name", json!("fluid")),
            ("tags", json!(["a", "b"])),
            ("nested", json!({"z": 1, "a": 2})),
        ]));
        let restored = FluidBag::from_json(&bag.to_json().unwrap()).unwrap();
        assert_eq!(restored.to_map(), bag.to_map());
    }

    #[test]
    fn from_json_propagates_parse_errors() {
        assert!(matches!(
            FluidBag::from_json("{oops").unwrap_err(),
            BagError::Parse(_)
        ));
        assert!(matches!(
            FluidBag::from_json("\"scalar\"").unwrap_err(),
            BagError::NotAnObject { found: "string" }
        ));
    }

    #[test]
    fn display_matches_to_json() {
        let bag = FluidBag::create(attrs(&[("a", json!(1))]));
        assert_eq!(bag.to_string(), bag.to_json().unwrap());
    }

    #[test]
    fn index_sugar_reads_raw_values_and_nulls_missing_keys() {
        let bag = FluidBag::create(attrs(&[("a", json!("x"))]));
        assert_eq!(bag["a"], json!("x"));
        assert_eq!(bag["missing"], Value::Null);
    }

    #[test]
    fn null_only_policy_falls_through_on_stored_null() {
        let mut bag = FluidBag::new();
        bag.set("k", Value::Null).unwrap();
        assert_eq!(bag.get("k"), None);
        assert_eq!(bag.get_or("k", json!("d")), json!("d"));
        // The entry itself is still there.
        assert!(bag.has("k"));
        assert!(bag.to_map().contains_key("k"));
    }

    #[test]
    fn falsy_policy_falls_through_on_empty_values() {
        let mut bag = FluidBag::new().with_policy(AbsencePolicy::Falsy);
        bag.set("flag", json!(false)).unwrap();
        bag.set("count", json!(0)).unwrap();
        bag.set("name", json!("")).unwrap();
        bag.set("real", json!("here")).unwrap();

        assert_eq!(bag.get("flag"), None);
        assert_eq!(bag.get("count"), None);
        assert_eq!(bag.get("name"), None);
        assert_eq!(bag.get("real"), Some(json!("here")));
    }

    #[test]
    fn insertion_order_survives_set_and_serialization() {
        let mut bag = FluidBag::new();
        bag.set("z", json!(1)).unwrap();
        bag.set("a", json!(2)).unwrap();
        bag.set("m", json!(3)).unwrap();
        bag.set("a", json!(20)).unwrap();

        let map = bag.to_map();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(bag.to_json().unwrap(), r#"{"z":1,"a":20,"m":3}"#);
    }

    #[test]
    fn len_tracks_the_backing_map() {
        let mut bag = FluidBag::new();
        assert!(bag.is_empty());
        bag.set("a", json!(1)).unwrap();
        bag.set("b", json!(2)).unwrap();
        assert_eq!(bag.len(), 2);
        bag.set("a", json!(3)).unwrap();
        assert_eq!(bag.len(), 2);
        bag.remove("a");
        assert_eq!(bag.len(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn scalar_value() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(|n| json!(n)),
                "[a-z]{0,8}".prop_map(Value::from),
            ]
        }

        fn scalar_map() -> impl Strategy<Value = AttributeMap> {
            proptest::collection::vec(("[a-z]{1,8}", scalar_value()), 0..8)
                .prop_map(|pairs| pairs.into_iter().collect())
        }

        proptest! {
            #[test]
            fn accessor_free_bags_round_trip_through_to_map(map in scalar_map()) {
                let bag = FluidBag::create(map.clone());
                prop_assert_eq!(bag.to_map(), map);
            }

            #[test]
            fn only_and_except_partition_the_attributes(map in scalar_map()) {
                let bag = FluidBag::create(map.clone());
                let keys: Vec<String> = map.keys().take(map.len() / 2).cloned().collect();
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();

                let mut merged = bag.only(&keys);
                merged.extend(bag.except(&keys));
                prop_assert_eq!(merged.len(), map.len());
                for (key, value) in &map {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }

            #[test]
            fn json_round_trip_is_stable(map in scalar_map()) {
                let bag = FluidBag::create(map);
                let restored = FluidBag::from_json(&bag.to_json().unwrap()).unwrap();
                prop_assert_eq!(restored.to_map(), bag.to_map());
            }

            #[test]
            fn len_equals_backing_map_size(map in scalar_map()) {
                let bag = FluidBag::create(map.clone());
                prop_assert_eq!(bag.len(), map.len());
            }
        }
    }
}
