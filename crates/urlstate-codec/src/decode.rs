//! Query string to mapping.
//!
//! Decoding is lenient: it never fails, and malformed input produces the
//! best mapping that can be recovered from it.

use serde_json::{Map, Value};

use crate::state::UrlState;

/// Maximum number of bracket segments parsed per key.
///
/// Segments beyond this depth are kept as one literal key.
pub const MAX_DEPTH: usize = 5;

/// Largest bracket index treated as an array position.
///
/// Larger indices are kept as object keys.
pub const ARRAY_INDEX_LIMIT: usize = 20;

/// One step of a bracketed key path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `[]` - append to a list.
    Push,
    /// `[n]` with `n <= ARRAY_INDEX_LIMIT`.
    Index(usize),
    /// Any other segment.
    Key(String),
}

impl Segment {
    fn classify(inner: &str) -> Self {
        if inner.is_empty() {
            return Self::Push;
        }
        match inner.parse::<usize>() {
            Ok(index) if index <= ARRAY_INDEX_LIMIT && index.to_string() == inner => {
                Self::Index(index)
            }
            _ => Self::Key(inner.to_string()),
        }
    }

    fn into_key(self) -> String {
        match self {
            Self::Push => "0".to_string(),
            Self::Index(index) => index.to_string(),
            Self::Key(key) => key,
        }
    }
}

/// Decode a query string into a state.
///
/// A leading `?` is ignored. Empty or absent text decodes to an empty state.
pub fn decode(text: &str) -> UrlState {
    let text = text.strip_prefix('?').unwrap_or(text);
    let mut root = Map::new();

    for part in text.split('&').filter(|part| !part.is_empty()) {
        let (raw_key, raw_value) = split_pair(part);
        let key = decode_component(raw_key);
        if key.is_empty() {
            continue;
        }
        let value = raw_value.map(decode_component).unwrap_or_default();

        let mut segments = parse_key(&key).into_iter();
        let Some(root_key) = segments.next() else {
            continue;
        };
        let rest: Vec<Segment> = segments.collect();
        insert(&mut root, root_key.into_key(), &rest, value);
    }

    for value in root.values_mut() {
        finalize(value);
    }
    UrlState::from_map(root)
}

/// Split `key=value`, preferring a `]=` boundary so bracketed keys stay intact.
fn split_pair(part: &str) -> (&str, Option<&str>) {
    let position = match part.find("]=") {
        Some(index) => Some(index + 1),
        None => part.find('='),
    };
    match position {
        Some(index) => (&part[..index], Some(&part[index + 1..])),
        None => (part, None),
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Find the next `[...]` group (without nested brackets) at or after `from`.
fn next_group(key: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = key.as_bytes();
    let mut open = None;
    for (index, &byte) in bytes.iter().enumerate().skip(from) {
        match byte {
            b'[' => open = Some(index),
            b']' => {
                if let Some(start) = open {
                    return Some((start, index + 1));
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_key(key: &str) -> Vec<Segment> {
    let first = next_group(key, 0);
    let parent = match first {
        Some((start, _)) => &key[..start],
        None => key,
    };

    let mut segments = Vec::new();
    if !parent.is_empty() {
        segments.push(Segment::Key(parent.to_string()));
    }

    let mut cursor = first;
    let mut depth = 0;
    while let Some((start, end)) = cursor {
        if depth == MAX_DEPTH {
            segments.push(Segment::Key(key[start..].to_string()));
            break;
        }
        segments.push(Segment::classify(&key[start + 1..end - 1]));
        depth += 1;
        cursor = next_group(key, end);
    }
    segments
}

fn insert(map: &mut Map<String, Value>, key: String, rest: &[Segment], value: String) {
    let Some(next) = rest.first() else {
        match map.get_mut(&key) {
            Some(existing) => combine(existing, Value::String(value)),
            None => {
                map.insert(key, Value::String(value));
            }
        }
        return;
    };
    let slot = map.entry(key).or_insert_with(|| container_for(next));
    descend(slot, rest, value);
}

fn descend(slot: &mut Value, segments: &[Segment], value: String) {
    let Some((head, tail)) = segments.split_first() else {
        return;
    };
    match head {
        Segment::Push => {
            if let Value::Array(items) = slot {
                match tail.first() {
                    None => items.push(Value::String(value)),
                    Some(next) => {
                        let mut child = container_for(next);
                        descend(&mut child, tail, value);
                        items.push(child);
                    }
                }
            } else {
                let map = as_object(slot);
                let key = next_free_index(map);
                insert(map, key, tail, value);
            }
        }
        Segment::Index(index) => insert(as_object(slot), index.to_string(), tail, value),
        Segment::Key(key) => insert(as_object(slot), key.clone(), tail, value),
    }
}

fn container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Push => Value::Array(Vec::new()),
        Segment::Index(_) | Segment::Key(_) => Value::Object(Map::new()),
    }
}

/// A repeated key turns the slot into a list.
fn combine(existing: &mut Value, value: Value) {
    match existing {
        Value::Array(items) => items.push(value),
        Value::Object(map) => {
            let key = next_free_index(map);
            map.insert(key, value);
        }
        other => {
            let first = std::mem::take(other);
            *other = Value::Array(vec![first, value]);
        }
    }
}

/// One past the highest numeric key, so appends never collide.
fn next_free_index(map: &Map<String, Value>) -> String {
    map.keys()
        .filter_map(|key| key.parse::<usize>().ok())
        .max()
        .map_or(0, |index| index + 1)
        .to_string()
}

/// Coerce a slot into an object, keeping whatever it held under index keys.
fn as_object(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        let map = match std::mem::take(slot) {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
            Value::Null => Map::new(),
            leaf => std::iter::once(("0".to_string(), leaf)).collect(),
        };
        *slot = Value::Object(map);
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was coerced to an object above"),
    }
}

/// Turn objects keyed only by array indices into arrays ordered by index.
fn finalize(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(finalize),
        Value::Object(map) => {
            map.values_mut().for_each(finalize);
            if map.is_empty() {
                return;
            }
            let mut indexed = Vec::with_capacity(map.len());
            for key in map.keys() {
                match Segment::classify(key) {
                    Segment::Index(index) => indexed.push(index),
                    _ => return,
                }
            }
            let mut entries: Vec<(usize, Value)> = indexed
                .into_iter()
                .zip(std::mem::take(map).into_iter().map(|(_, item)| item))
                .collect();
            entries.sort_by_key(|(index, _)| *index);
            *value = Value::Array(entries.into_iter().map(|(_, item)| item).collect());
        }
        _ => {}
    }
}
