//! Query-string state model and codec.
//!
//! This crate provides the data side of address-bar state synchronization:
//! the [`UrlState`] mapping and the bidirectional codec between a mapping and
//! the text that lives after the `?` in a URL.
//!
//! # Features
//!
//! - **Ordered state**: keys keep insertion order, so encoded output is stable
//! - **Nested values**: objects and arrays use bracket notation (`a[b]=c`, `a[0]=x`)
//! - **Values-only encoding**: keys are written verbatim, values are percent-encoded
//! - **Null skipping**: null values vanish from the encoded form
//! - **Lenient decoding**: malformed input degrades to a best-effort mapping
//!
//! # Canonical Equality
//!
//! Two states are considered equal when their encoded forms are equal. This is
//! the only equality used for dirty-checking:
//!
//! ```
//! use urlstate_codec::{UrlState, canonical_eq};
//!
//! let a: UrlState = [("page", "2")].into_iter().collect();
//! let b: UrlState = [("page", 2)].into_iter().collect();
//! assert!(canonical_eq(&a, &b));
//! ```
//!
//! # Architecture
//!
//! - `state.rs` - The `UrlState` mapping and conversions
//! - `encode.rs` - Mapping to query string
//! - `decode.rs` - Query string to mapping
//! - `error.rs` - Error types for typed conversions

mod decode;
mod encode;
mod error;
mod state;

pub use decode::{ARRAY_INDEX_LIMIT, MAX_DEPTH, decode};
pub use encode::{canonical_eq, encode};
pub use error::{CodecError, Result};
pub use state::UrlState;

// Values are plain JSON values; re-exported so callers need no direct dependency.
pub use serde_json::{Map, Value};
