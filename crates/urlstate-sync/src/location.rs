//! Navigable-location adapter.
//!
//! The synchronization engine never touches a host's navigation primitives
//! directly. Everything goes through [`Location`], so tests and headless hosts
//! can supply [`MemoryLocation`](crate::MemoryLocation).

use std::fmt;
use std::rc::Rc;

/// Callback invoked on back/forward navigation.
pub type NavigationListener = Rc<dyn Fn()>;

/// Host navigation interface.
///
/// Implementations model a browser-like history: a list of entries, each with
/// a path and an optional query, and a cursor pointing at the current entry.
pub trait Location {
    /// Path of the current entry (no query).
    fn pathname(&self) -> String;

    /// Query of the current entry without the leading `?`.
    ///
    /// Returns an empty string when the entry has no query.
    fn search(&self) -> String;

    /// Overwrite the current entry in place.
    ///
    /// `None` (or an empty query) leaves the address without a `?`.
    /// Must not notify navigation listeners.
    fn replace_entry(&self, path: &str, query: Option<&str>);

    /// Add a new entry after the current one and move to it.
    ///
    /// Forward entries are discarded. Must not notify navigation listeners.
    fn push_entry(&self, path: &str, query: Option<&str>);

    /// Register a listener for back/forward navigation.
    ///
    /// The listener stays registered until the returned guard is dropped.
    fn subscribe(&self, listener: NavigationListener) -> NavigationSubscription;
}

/// Guard for a navigation listener registration.
///
/// Dropping the guard unsubscribes the listener.
#[must_use = "dropping the subscription unsubscribes the listener immediately"]
pub struct NavigationSubscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl NavigationSubscription {
    /// Create a guard that runs `unsubscribe` once, on drop or explicit call.
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A guard with nothing to undo.
    pub fn noop() -> Self {
        Self { unsubscribe: None }
    }

    /// Unsubscribe now.
    pub fn unsubscribe(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for NavigationSubscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for NavigationSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationSubscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Format a path and optional query as an address.
pub fn format_href(path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_string(),
    }
}

/// Split an address into path and query (without `?`).
///
/// A missing path defaults to `/`; a `#fragment` is dropped.
pub fn split_href(href: &str) -> (String, Option<String>) {
    let href = href.split_once('#').map_or(href, |(before, _)| before);
    let (path, query) = match href.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (href, None),
    };
    let path = if path.is_empty() { "/" } else { path };
    let query = query.filter(|query| !query.is_empty()).map(str::to_string);
    (path.to_string(), query)
}
