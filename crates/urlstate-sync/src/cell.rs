//! Shared state cell.
//!
//! One cell exists per provider. Every hook created from that provider reads
//! and writes the same cell; the provider owns it and hooks only hold weak
//! references, so dropping the provider unmounts the cell.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use urlstate_codec::{UrlState, decode, encode};

type RerenderCallback = Rc<dyn Fn(u64)>;

/// Provider-scoped state shared by all consumers.
pub(crate) struct SharedCell {
    /// Defaults contributed by every consumer, merged in mount order.
    default_state: RefCell<UrlState>,
    /// Current state in canonical encoded form.
    encoded_state: RefCell<String>,
    /// Last requested debounce; last writer wins.
    debounce: Cell<Duration>,
    /// Incremented once per `rerender()`.
    render_count: Cell<u64>,
    /// Debounced history writes that are scheduled but have not run.
    pending_writes: Cell<usize>,
    /// Query the engine last wrote to or read from the location.
    synced_query: RefCell<Option<String>>,
    on_rerender: RefCell<Option<RerenderCallback>>,
}

impl SharedCell {
    pub(crate) fn new() -> Self {
        Self {
            default_state: RefCell::new(UrlState::new()),
            encoded_state: RefCell::new(String::new()),
            debounce: Cell::new(Duration::ZERO),
            render_count: Cell::new(0),
            pending_writes: Cell::new(0),
            synced_query: RefCell::new(None),
            on_rerender: RefCell::new(None),
        }
    }

    pub(crate) fn default_state(&self) -> UrlState {
        self.default_state.borrow().clone()
    }

    pub(crate) fn merge_defaults(&self, defaults: &UrlState) {
        self.default_state.borrow_mut().merge(defaults);
    }

    /// Defaults merged with the state observed in a query string.
    pub(crate) fn state_from_query(&self, query: &str) -> UrlState {
        self.default_state.borrow().merged(&decode(query))
    }

    pub(crate) fn encoded(&self) -> String {
        self.encoded_state.borrow().clone()
    }

    pub(crate) fn decoded(&self) -> UrlState {
        decode(&self.encoded_state.borrow())
    }

    pub(crate) fn store(&self, state: &UrlState) {
        *self.encoded_state.borrow_mut() = encode(state);
    }

    pub(crate) fn store_encoded(&self, encoded: String) {
        *self.encoded_state.borrow_mut() = encoded;
    }

    pub(crate) fn debounce(&self) -> Duration {
        self.debounce.get()
    }

    pub(crate) fn set_debounce(&self, debounce: Duration) {
        self.debounce.set(debounce);
    }

    pub(crate) fn render_count(&self) -> u64 {
        self.render_count.get()
    }

    /// Request a re-render of every consumer.
    pub(crate) fn rerender(&self) {
        let count = self.render_count.get() + 1;
        self.render_count.set(count);
        tracing::trace!(render_count = count, "rerender requested");
        // Released before the call so the callback may replace itself.
        let callback = self.on_rerender.borrow().clone();
        if let Some(callback) = callback {
            callback(count);
        }
    }

    pub(crate) fn set_on_rerender(&self, callback: RerenderCallback) {
        *self.on_rerender.borrow_mut() = Some(callback);
    }

    /// Record the query last seen at, or written to, the location.
    pub(crate) fn record_query(&self, query: String) {
        *self.synced_query.borrow_mut() = Some(query);
    }

    /// True if `query` differs from the last recorded one.
    pub(crate) fn query_changed(&self, query: &str) -> bool {
        self.synced_query.borrow().as_deref() != Some(query)
    }

    /// True while a debounced history write is pending.
    pub(crate) fn is_updating(&self) -> bool {
        self.pending_writes.get() > 0
    }

    pub(crate) fn begin_write(&self) {
        self.pending_writes.set(self.pending_writes.get() + 1);
    }

    pub(crate) fn end_write(&self) {
        self.pending_writes.set(self.pending_writes.get().saturating_sub(1));
    }
}

impl fmt::Debug for SharedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCell")
            .field("default_state", &self.default_state.borrow())
            .field("encoded_state", &self.encoded_state.borrow())
            .field("debounce", &self.debounce.get())
            .field("render_count", &self.render_count.get())
            .field("pending_writes", &self.pending_writes.get())
            .field("synced_query", &self.synced_query.borrow())
            .finish_non_exhaustive()
    }
}
