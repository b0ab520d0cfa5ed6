//! Mapping to query string.

use serde_json::Value;

use crate::state::UrlState;

/// Encode a state into `key=value` pairs joined by `&`.
///
/// - Top-level keys appear in insertion order.
/// - Objects nest as `key[child]`, arrays as `key[0]`, `key[1]`, ...
/// - `null` values and empty containers produce no pair.
/// - Values are percent-encoded (RFC 3986 unreserved characters are kept);
///   keys are written verbatim so bracket notation survives.
///
/// No leading `?` is added.
pub fn encode(state: &UrlState) -> String {
    let mut pairs = Vec::with_capacity(state.len());
    for (key, value) in state {
        push_pairs(&mut pairs, key.clone(), value);
    }
    pairs.join("&")
}

/// Canonical equality: two states are equal iff their encodings are equal.
pub fn canonical_eq(a: &UrlState, b: &UrlState) -> bool {
    encode(a) == encode(b)
}

fn push_pairs(pairs: &mut Vec<String>, prefix: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => pairs.push(format!("{prefix}={flag}")),
        Value::Number(number) => {
            pairs.push(format!("{prefix}={}", encode_component(&number.to_string())));
        }
        Value::String(text) => pairs.push(format!("{prefix}={}", encode_component(text))),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pairs(pairs, format!("{prefix}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                push_pairs(pairs, format!("{prefix}[{key}]"), item);
            }
        }
    }
}

fn encode_component(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enc(value: Value) -> String {
        encode(&UrlState::try_from(value).unwrap())
    }

    #[test]
    fn test_flat_pairs_in_insertion_order() {
        assert_eq!(enc(json!({"foo": "bar", "bar": "foo"})), "foo=bar&bar=foo");
    }

    #[test]
    fn test_empty_state_encodes_to_empty_string() {
        assert_eq!(enc(json!({})), "");
    }

    #[test]
    fn test_skips_nulls() {
        assert_eq!(enc(json!({"a": null, "b": "x"})), "b=x");
        assert_eq!(enc(json!({"list": ["a", null, "c"]})), "list[0]=a&list[2]=c");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            enc(json!({"n": 42, "f": 1.5, "neg": -3, "t": true, "e": ""})),
            "n=42&f=1.5&neg=-3&t=true&e="
        );
    }

    #[test]
    fn test_values_are_percent_encoded() {
        assert_eq!(enc(json!({"q": "a b&c=d"})), "q=a%20b%26c%3Dd");
        assert_eq!(enc(json!({"q": "~._-"})), "q=~._-");
        assert_eq!(enc(json!({"q": "ü+"})), "q=%C3%BC%2B");
    }

    #[test]
    fn test_keys_are_not_encoded() {
        assert_eq!(enc(json!({"a b": "c"})), "a b=c");
    }

    #[test]
    fn test_nested_bracket_notation() {
        assert_eq!(
            enc(json!({"filter": {"status": "open", "tags": ["x", "y"]}})),
            "filter[status]=open&filter[tags][0]=x&filter[tags][1]=y"
        );
    }

    #[test]
    fn test_empty_containers_vanish() {
        assert_eq!(enc(json!({"a": [], "b": {}, "c": "1"})), "c=1");
    }

    #[test]
    fn test_canonical_eq_ignores_null_and_number_type() {
        let a = UrlState::try_from(json!({"page": 2, "gone": null})).unwrap();
        let b = UrlState::try_from(json!({"page": "2"})).unwrap();
        assert!(canonical_eq(&a, &b));
        assert_ne!(a, b);
    }
}
