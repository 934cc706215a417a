//! Value aliases, the stored-value absence policy, and JSON object parsing.
//!
//! Attribute values are open-typed: any JSON-representable scalar, array, or
//! nested structure. A single bag instance holds heterogeneous value kinds
//! simultaneously, so values are modeled as [`serde_json::Value`] rather
//! than a generic type parameter.

use crate::error::{BagError, Result};

pub use serde_json::Value;

/// The insertion-ordered backing map of an attribute bag.
///
/// Keys are unique; iteration and serialization follow insertion order.
pub type AttributeMap = indexmap::IndexMap<String, Value>;

/// Policy for when a *stored* value is treated as absent by `get`.
///
/// The two upstream variants of this container disagreed on whether a stored
/// `false`, `0`, or `""` counts as "set": one checked key presence modulo
/// null, the other checked truthiness. Rather than silently picking one,
/// the policy is explicit per bag. [`AbsencePolicy::NullOnly`] is the
/// default.
///
/// The policy only affects the default fallback of `get`; `has`, `to_map`,
/// and the raw accessors always see every stored entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AbsencePolicy {
    /// A stored `null` falls through to the default; any other stored value
    /// is returned as-is.
    #[default]
    NullOnly,

    /// Falsy stored values fall through to the default: `null`, `false`,
    /// numeric zero, `""`, `[]`, and `{}`.
    Falsy,
}

impl AbsencePolicy {
    /// Returns `true` if a stored `value` should yield to the default under
    /// this policy.
    pub fn treats_as_absent(&self, value: &Value) -> bool {
        match self {
            AbsencePolicy::NullOnly => value.is_null(),
            AbsencePolicy::Falsy => match value {
                Value::Null => true,
                Value::Bool(b) => !b,
                Value::Number(n) => {
                    n.as_i64() == Some(0)
                        || n.as_u64() == Some(0)
                        || n.as_f64() == Some(0.0)
                }
                Value::String(s) => s.is_empty(),
                Value::Array(a) => a.is_empty(),
                Value::Object(o) => o.is_empty(),
            },
        }
    }
}

/// Parse a JSON string into an [`AttributeMap`].
///
/// Fails with [`BagError::Parse`] on malformed input and
/// [`BagError::NotAnObject`] when the payload is valid JSON whose top level
/// is not an object.
pub fn object_from_json(json: &str) -> Result<AttributeMap> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(BagError::NotAnObject {
            found: kind_name(&other),
        }),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_only_policy_yields_on_null_alone() {
        let policy = AbsencePolicy::NullOnly;
        assert!(policy.treats_as_absent(&Value::Null));
        assert!(!policy.treats_as_absent(&json!(false)));
        assert!(!policy.treats_as_absent(&json!(0)));
        assert!(!policy.treats_as_absent(&json!("")));
    }

    #[test]
    fn falsy_policy_yields_on_empty_and_zero_values() {
        let policy = AbsencePolicy::Falsy;
        assert!(policy.treats_as_absent(&Value::Null));
        assert!(policy.treats_as_absent(&json!(false)));
        assert!(policy.treats_as_absent(&json!(0)));
        assert!(policy.treats_as_absent(&json!(0.0)));
        assert!(policy.treats_as_absent(&json!("")));
        assert!(policy.treats_as_absent(&json!([])));
        assert!(policy.treats_as_absent(&json!({})));
        assert!(!policy.treats_as_absent(&json!(true)));
        assert!(!policy.treats_as_absent(&json!(1)));
        assert!(!policy.treats_as_absent(&json!("0")));
    }

    #[test]
    fn object_from_json_preserves_key_order() {
        let map = object_from_json(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn object_from_json_rejects_malformed_input() {
        let err = object_from_json("{not json").unwrap_err();
        assert!(matches!(err, BagError::Parse(_)));
    }

    #[test]
    fn object_from_json_rejects_non_object_top_level() {
        let err = object_from_json("[1,2,3]").unwrap_err();
        assert!(matches!(err, BagError::NotAnObject { found: "array" }));
    }
}
