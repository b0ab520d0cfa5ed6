//! Property tests for the codec round-trip law.
//!
//! For every state without null values, decoding its encoding yields a state
//! with the same canonical encoding.

use proptest::prelude::*;
use serde_json::{Map, Value};

use urlstate_codec::{UrlState, canonical_eq, decode, encode};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<String>().prop_map(Value::String),
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
    ]
}

/// Non-empty containers only: an empty container encodes to nothing and
/// would shift the indices of its siblings.
fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 1..4)
                .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn url_state() -> impl Strategy<Value = UrlState> {
    prop::collection::vec(("[a-z][a-z0-9_]{0,7}", value()), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn decode_encode_is_encoding_equal(state in url_state()) {
        let decoded = decode(&encode(&state));
        prop_assert!(canonical_eq(&decoded, &state));
    }

    #[test]
    fn encoding_is_stable_after_one_roundtrip(state in url_state()) {
        let once = encode(&decode(&encode(&state)));
        let twice = encode(&decode(&once));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn decode_never_panics(text in "[a-z%\\[\\]=&+?0-9]{0,40}") {
        let _ = decode(&text);
    }
}
