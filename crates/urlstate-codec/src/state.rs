//! The `UrlState` mapping.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CodecError, Result, kind_of};

/// Ordered mapping of query parameters to values.
///
/// Any key may be absent, meaning "use the default". A `null` value is
/// treated as absent by the encoder, so merging `{"key": null}` into a state
/// removes `key` from the address bar.
///
/// Equality for synchronization purposes is [`canonical_eq`](Self::canonical_eq),
/// which compares encoded forms. The derived `PartialEq` is structural and
/// distinguishes `"2"` from `2`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlState(Map<String, Value>);

impl UrlState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap an existing JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Unwrap into the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get the value under `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Insert a value, returning the previous one.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a key, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Number of keys, including keys holding `null`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the state has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> serde_json::map::Keys<'_> {
        self.0.keys()
    }

    /// Shallow-merge `other` into `self`; keys in `other` win.
    pub fn merge(&mut self, other: &UrlState) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Return a shallow merge of `self` and `other`; keys in `other` win.
    #[must_use]
    pub fn merged(&self, other: &UrlState) -> UrlState {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Canonical query-string encoding of this state.
    pub fn encode(&self) -> String {
        crate::encode(self)
    }

    /// Compare two states by their canonical encoding.
    pub fn canonical_eq(&self, other: &UrlState) -> bool {
        crate::canonical_eq(self, other)
    }

    /// Build a state from any serializable value that serializes to an object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value =
            serde_json::to_value(value).map_err(|source| CodecError::Serialize { source })?;
        Self::try_from(value)
    }

    /// Deserialize this state into an application type.
    ///
    /// Decoded query parameters are strings, so target fields should be
    /// strings (or string collections) unless the state was built in memory.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|source| CodecError::Deserialize { source })
    }
}

impl From<Map<String, Value>> for UrlState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<UrlState> for Value {
    fn from(state: UrlState) -> Self {
        Value::Object(state.0)
    }
}

impl TryFrom<Value> for UrlState {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CodecError::NotAnObject {
                found: kind_of(&other),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for UrlState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a UrlState {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for UrlState {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(crate::decode(s))
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: Value) -> UrlState {
        UrlState::try_from(value).unwrap()
    }

    #[test]
    fn test_merge_overrides_and_appends() {
        let base = state(json!({"a": "1", "b": "2"}));
        let merged = base.merged(&state(json!({"b": "3", "c": "4"})));

        assert_eq!(merged, state(json!({"a": "1", "b": "3", "c": "4"})));
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_keeps_existing_key_position() {
        let base = state(json!({"foo": "bar", "page": "1"}));
        let merged = base.merged(&state(json!({"foo": "baz"})));

        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["foo", "page"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut s = state(json!({"a": "1", "b": "2", "c": "3"}));
        assert_eq!(s.remove("a"), Some(json!("1")));

        let keys: Vec<&str> = s.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_null_merge_clears_key_in_encoding() {
        let base = state(json!({"q": "rust", "page": "2"}));
        let cleared = base.merged(&state(json!({"page": null})));

        assert_eq!(cleared.encode(), "q=rust");
    }

    #[test]
    fn test_numeric_keys_are_stringified() {
        let s: UrlState = [(1.to_string(), "one")].into_iter().collect();
        assert_eq!(s.get_str("1"), Some("one"));
    }

    #[test]
    fn test_try_from_rejects_non_object() {
        let err = UrlState::try_from(json!(["a"])).unwrap_err();
        assert!(matches!(err, CodecError::NotAnObject { found: "array" }));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_typed_roundtrip_through_serde() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Filters {
            search: String,
            tags: Vec<String>,
        }

        let filters = Filters {
            search: "hello world".into(),
            tags: vec!["a".into(), "b".into()],
        };
        let s = UrlState::from_serialize(&filters).unwrap();
        assert_eq!(s.encode(), "search=hello%20world&tags[0]=a&tags[1]=b");

        let decoded: UrlState = s.encode().parse().unwrap();
        assert_eq!(decoded.deserialize_into::<Filters>().unwrap(), filters);
    }

    #[test]
    fn test_deserialize_into_reports_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Paging {
            page: u32,
        }

        let decoded: UrlState = "page=2".parse().unwrap();
        let err = decoded.deserialize_into::<Paging>().unwrap_err();
        assert!(matches!(err, CodecError::Deserialize { .. }));
    }

    #[test]
    fn test_display_is_canonical_encoding() {
        let s = state(json!({"foo": "a b", "skip": null}));
        assert_eq!(s.to_string(), "foo=a%20b");
    }
}
