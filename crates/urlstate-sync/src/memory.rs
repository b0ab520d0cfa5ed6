//! In-memory browser history.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::location::{
    Location, NavigationListener, NavigationSubscription, format_href, split_href,
};

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Path without query.
    pub path: String,
    /// Query without `?`, if any.
    pub query: Option<String>,
}

impl HistoryEntry {
    /// Parse an address such as `/search?q=rust`.
    pub fn parse(href: &str) -> Self {
        let (path, query) = split_href(href);
        Self { path, query }
    }

    /// Full address of this entry.
    pub fn href(&self) -> String {
        format_href(&self.path, self.query.as_deref())
    }
}

struct Inner {
    entries: Vec<HistoryEntry>,
    index: usize,
    listeners: Vec<(u64, NavigationListener)>,
    next_listener_id: u64,
}

/// Browser-like history kept in memory.
///
/// Clones share the same history. Only [`back`](Self::back),
/// [`forward`](Self::forward) and [`go`](Self::go) notify listeners, matching
/// how a browser fires navigation events for traversal but not for
/// programmatic history writes.
#[derive(Clone)]
pub struct MemoryLocation {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryLocation {
    /// Create a history with a single entry.
    pub fn new(href: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                entries: vec![HistoryEntry::parse(href)],
                index: 0,
                listeners: Vec::new(),
                next_listener_id: 1,
            })),
        }
    }

    /// Full address of the current entry.
    pub fn href(&self) -> String {
        self.current().href()
    }

    /// The current entry.
    pub fn current(&self) -> HistoryEntry {
        let inner = self.inner.borrow();
        inner.entries[inner.index].clone()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.inner.borrow().entries.clone()
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.inner.borrow().index
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Always false; a history has at least one entry.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Number of registered navigation listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Push a new entry without notifying listeners.
    ///
    /// This is what application code does when it writes the address directly,
    /// for example by following a link built with `merge_params`.
    pub fn navigate(&self, href: &str) {
        let entry = HistoryEntry::parse(href);
        self.push_entry(&entry.path, entry.query.as_deref());
    }

    /// Go back one entry. Returns false at the start of history.
    pub fn back(&self) -> bool {
        self.go(-1)
    }

    /// Go forward one entry. Returns false at the end of history.
    pub fn forward(&self) -> bool {
        self.go(1)
    }

    /// Move the cursor by `delta` entries and notify listeners.
    ///
    /// Out-of-range moves are ignored and notify nobody.
    pub fn go(&self, delta: isize) -> bool {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            let Some(target) = inner.index.checked_add_signed(delta) else {
                return false;
            };
            if delta == 0 || target >= inner.entries.len() {
                return false;
            }
            inner.index = target;
            tracing::debug!(
                href = %inner.entries[target].href(),
                index = target,
                "history traversal"
            );
            inner
                .listeners
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect::<Vec<_>>()
        };
        // Listeners read the location, so the borrow must be released first.
        for listener in listeners {
            listener();
        }
        true
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("/")
    }
}

impl std::fmt::Debug for MemoryLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemoryLocation")
            .field("entries", &inner.entries)
            .field("index", &inner.index)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl Location for MemoryLocation {
    fn pathname(&self) -> String {
        self.current().path
    }

    fn search(&self) -> String {
        self.current().query.unwrap_or_default()
    }

    fn replace_entry(&self, path: &str, query: Option<&str>) {
        let mut inner = self.inner.borrow_mut();
        let index = inner.index;
        inner.entries[index] = HistoryEntry {
            path: path.to_string(),
            query: query.filter(|q| !q.is_empty()).map(str::to_string),
        };
        tracing::debug!(href = %inner.entries[index].href(), "history replace");
    }

    fn push_entry(&self, path: &str, query: Option<&str>) {
        let mut inner = self.inner.borrow_mut();
        let keep = inner.index + 1;
        inner.entries.truncate(keep);
        inner.entries.push(HistoryEntry {
            path: path.to_string(),
            query: query.filter(|q| !q.is_empty()).map(str::to_string),
        });
        inner.index = keep;
        tracing::debug!(href = %inner.entries[keep].href(), index = keep, "history push");
    }

    fn subscribe(&self, listener: NavigationListener) -> NavigationSubscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((id, listener));
            id
        };
        let weak: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
        NavigationSubscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .borrow_mut()
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }
}
