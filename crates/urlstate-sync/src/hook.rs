//! Synchronization engine.
//!
//! A [`UrlStateHook`] is one consumer of a provider's cell. The host calls
//! [`render`](UrlStateHook::render) once per render cycle; each call
//!
//! 1. activates the consumer on first use (merge defaults, read the address,
//!    subscribe to back/forward navigation),
//! 2. schedules a debounced history write when the cell's encoded state
//!    changed since this consumer's previous render, restarting any pending
//!    write (trailing-edge debounce),
//! 3. reconciles the cell with the address when the query differs from the
//!    one the engine last wrote or read and no write is pending.
//!
//! Back/forward navigation is handled by the listener registered in step 1,
//! independently of rendering.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;
use urlstate_codec::{UrlState, decode, encode};

use crate::cell::SharedCell;
use crate::error::{Result, UrlStateError};
use crate::location::{Location, NavigationSubscription};
use crate::options::{HistoryMode, SetUrlStateOptions, UrlStateUpdate, UseUrlStateOptions};
use crate::scheduler::{Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Active,
}

/// One consumer of a provider's URL state.
///
/// Created by [`UrlStateProvider::use_url_state`](crate::UrlStateProvider::use_url_state).
/// Dropping the hook unsubscribes its navigation listener and cancels its
/// pending history write.
pub struct UrlStateHook {
    cell: Weak<SharedCell>,
    location: Rc<dyn Location>,
    scheduler: Rc<dyn Scheduler>,
    defaults: UrlState,
    options: UseUrlStateOptions,
    phase: Phase,
    /// Encoded state the write effect last ran for.
    last_rendered: Option<String>,
    /// Pending write; cleared by the write itself when it runs.
    timer: Rc<Cell<Option<TimerId>>>,
    subscription: Option<NavigationSubscription>,
}

impl UrlStateHook {
    pub(crate) fn new(
        cell: Weak<SharedCell>,
        location: Rc<dyn Location>,
        scheduler: Rc<dyn Scheduler>,
        defaults: UrlState,
        options: UseUrlStateOptions,
    ) -> Self {
        Self {
            cell,
            location,
            scheduler,
            defaults,
            options,
            phase: Phase::Uninitialized,
            last_rendered: None,
            timer: Rc::new(Cell::new(None)),
            subscription: None,
        }
    }

    /// Run one render cycle and return the current state and its setter.
    pub fn render(&mut self) -> Result<(UrlState, SetUrlState)> {
        let cell = self.upgrade()?;
        if self.phase == Phase::Uninitialized {
            self.activate(&cell);
        }

        tracing::trace!(render_count = cell.render_count(), "url state render");

        self.schedule_write_if_changed(&cell);
        if !cell.is_updating() && cell.query_changed(&self.location.search()) {
            sync_from_location(&cell, self.location.as_ref());
        }

        Ok((cell.decoded(), self.setter()))
    }

    /// Setter bound to this consumer's options.
    pub fn setter(&self) -> SetUrlState {
        SetUrlState {
            cell: Weak::clone(&self.cell),
            options: self.options,
        }
    }

    /// Options this consumer was created with.
    pub fn options(&self) -> UseUrlStateOptions {
        self.options
    }

    /// True once the first render has run.
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// True while this consumer has a history write scheduled.
    pub fn has_pending_write(&self) -> bool {
        self.timer.get().is_some()
    }

    fn upgrade(&self) -> Result<Rc<SharedCell>> {
        self.cell.upgrade().ok_or(UrlStateError::ProviderUnmounted)
    }

    fn activate(&mut self, cell: &Rc<SharedCell>) {
        cell.merge_defaults(&self.defaults);
        let search = self.location.search();
        let initial = cell.state_from_query(&search);
        cell.store(&initial);
        cell.record_query(search);
        cell.set_debounce(self.options.debounce());

        let listener_cell = Rc::downgrade(cell);
        let listener_location = Rc::downgrade(&self.location);
        self.subscription = Some(self.location.subscribe(Rc::new(move || {
            let (Some(cell), Some(location)) = (listener_cell.upgrade(), listener_location.upgrade())
            else {
                return;
            };
            sync_from_location(&cell, location.as_ref());
        })));

        self.phase = Phase::Active;
        tracing::debug!(state = %initial, "url state consumer activated");
    }

    fn schedule_write_if_changed(&mut self, cell: &Rc<SharedCell>) {
        let encoded = cell.encoded();
        if self.last_rendered.as_deref() == Some(encoded.as_str()) {
            return;
        }
        self.last_rendered = Some(encoded);
        self.cancel_write(cell);

        let delay = cell.debounce();
        let slot = Rc::clone(&self.timer);
        let write = HistoryWrite {
            cell: Rc::downgrade(cell),
            location: Rc::clone(&self.location),
            history: self.options.history,
        };
        cell.begin_write();
        let id = self.scheduler.schedule(
            delay,
            Box::new(move || {
                slot.set(None);
                write.run();
            }),
        );
        tracing::trace!(timer = ?id, ?delay, "history write scheduled");
        self.timer.set(Some(id));
    }

    fn cancel_write(&mut self, cell: &SharedCell) {
        if let Some(id) = self.timer.take()
            && self.scheduler.cancel(id)
        {
            cell.end_write();
            tracing::trace!(timer = ?id, "history write superseded");
        }
    }
}

impl Drop for UrlStateHook {
    fn drop(&mut self) {
        if let Some(cell) = self.cell.upgrade() {
            self.cancel_write(&cell);
        } else if let Some(id) = self.timer.take() {
            self.scheduler.cancel(id);
        }
        drop(self.subscription.take());
    }
}

impl fmt::Debug for UrlStateHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlStateHook")
            .field("defaults", &self.defaults)
            .field("options", &self.options)
            .field("phase", &self.phase)
            .field("timer", &self.timer.get())
            .finish_non_exhaustive()
    }
}

/// Pull the address into the cell, requesting a re-render if it differs.
fn sync_from_location(cell: &SharedCell, location: &dyn Location) {
    let search = location.search();
    let observed = encode(&cell.state_from_query(&search));
    cell.record_query(search);
    if observed == cell.encoded() {
        return;
    }
    tracing::debug!(from = %cell.encoded(), to = %observed, "state synced from location");
    cell.store_encoded(observed);
    cell.rerender();
}

/// Deferred push of the cell's state into the history.
struct HistoryWrite {
    cell: Weak<SharedCell>,
    location: Rc<dyn Location>,
    history: HistoryMode,
}

impl HistoryWrite {
    fn run(self) {
        let Some(cell) = self.cell.upgrade() else {
            return;
        };
        cell.end_write();

        let current = cell.encoded();
        let search = self.location.search();
        let observed = encode(&cell.state_from_query(&search));
        if current == observed {
            cell.record_query(search);
            return;
        }

        let is_default = current == encode(&cell.default_state());
        let query = (!is_default).then_some(current.as_str());
        let path = self.location.pathname();
        match self.history {
            HistoryMode::Push => self.location.push_entry(&path, query),
            HistoryMode::Replace => self.location.replace_entry(&path, query),
        }
        cell.record_query(self.location.search());
        tracing::debug!(
            %path,
            query = query.unwrap_or(""),
            history = %self.history,
            "state written to history"
        );
    }
}

/// Setter returned by [`UrlStateHook::render`].
///
/// Cheap to clone. Every call records its debounce in the shared cell, even
/// when the state itself does not change.
#[derive(Clone)]
pub struct SetUrlState {
    cell: Weak<SharedCell>,
    options: UseUrlStateOptions,
}

impl SetUrlState {
    /// Apply an update.
    ///
    /// A [`UrlStateUpdate::Merge`] is shallow-merged into the current state;
    /// a [`UrlStateUpdate::Replace`] receives the current decoded state and
    /// returns the complete new one. A re-render is requested only if the
    /// canonical encoding changed.
    pub fn set(
        &self,
        update: impl Into<UrlStateUpdate>,
        options: SetUrlStateOptions,
    ) -> Result<()> {
        let cell = self.cell.upgrade().ok_or(UrlStateError::ProviderUnmounted)?;
        cell.set_debounce(options.resolve(&self.options));

        let update: UrlStateUpdate = update.into();
        let previous = cell.encoded();
        let next = encode(&update.apply(&decode(&previous)));
        if next == previous {
            tracing::trace!(state = %previous, "url state unchanged");
            return Ok(());
        }

        cell.store_encoded(next);
        cell.rerender();
        Ok(())
    }

    /// Shallow-merge `partial` with the consumer's default debounce.
    pub fn merge(&self, partial: UrlState) -> Result<()> {
        self.set(partial, SetUrlStateOptions::default())
    }

    /// Replace the state with `updater`'s result, using the default debounce.
    pub fn replace_with(&self, updater: impl FnOnce(&UrlState) -> UrlState + 'static) -> Result<()> {
        self.set(
            UrlStateUpdate::replace_with(updater),
            SetUrlStateOptions::default(),
        )
    }

    /// Shallow-merge a serializable value.
    pub fn merge_typed<T: Serialize + ?Sized>(
        &self,
        value: &T,
        options: SetUrlStateOptions,
    ) -> Result<()> {
        let partial = UrlState::from_serialize(value)?;
        self.set(partial, options)
    }
}

impl fmt::Debug for SetUrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetUrlState")
            .field("mounted", &(self.cell.strong_count() > 0))
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::{ManualScheduler, MemoryLocation, UrlStateProvider};

    fn state(value: serde_json::Value) -> UrlState {
        UrlState::try_from(value).unwrap()
    }

    fn mount(href: &str) -> (MemoryLocation, ManualScheduler, UrlStateProvider) {
        let location = MemoryLocation::new(href);
        let scheduler = ManualScheduler::new();
        let provider = UrlStateProvider::new(location.clone(), scheduler.clone());
        (location, scheduler, provider)
    }

    #[test]
    fn test_first_render_reads_defaults_and_address() {
        let (_location, _scheduler, provider) = mount("/?foo=test");
        let mut hook = provider.use_url_state(
            state(json!({"foo": "", "page": "1"})),
            UseUrlStateOptions::default(),
        );
        assert!(!hook.is_active());

        let (current, _) = hook.render().unwrap();
        assert!(hook.is_active());
        assert_eq!(current, state(json!({"foo": "test", "page": "1"})));
    }

    #[test]
    fn test_merge_and_replace_semantics() {
        let (location, scheduler, provider) = mount("/");
        let mut hook =
            provider.use_url_state(state(json!({"a": "1", "b": "2"})), UseUrlStateOptions::default());
        let (_, set) = hook.render().unwrap();

        set.merge(state(json!({"b": "3"}))).unwrap();
        assert_eq!(hook.render().unwrap().0, state(json!({"a": "1", "b": "3"})));

        set.replace_with(|_| state(json!({"c": "4"}))).unwrap();
        assert_eq!(hook.render().unwrap().0, state(json!({"c": "4"})));

        // Writing the replaced state must not pull the defaults back in.
        scheduler.run_until_idle();
        assert_eq!(location.href(), "/?c=4");
        let before = provider.render_count();
        assert_eq!(hook.render().unwrap().0, state(json!({"c": "4"})));
        assert_eq!(provider.render_count(), before);
    }

    #[test]
    fn test_identical_updates_rerender_once() {
        let (_location, _scheduler, provider) = mount("/");
        let mut hook = provider.use_url_state(UrlState::new(), UseUrlStateOptions::default());
        let (_, set) = hook.render().unwrap();

        set.merge(state(json!({"q": "x"}))).unwrap();
        set.merge(state(json!({"q": "x"}))).unwrap();
        assert_eq!(provider.render_count(), 1);
    }

    #[test]
    fn test_unchanged_update_still_records_debounce() {
        let (_location, scheduler, provider) = mount("/");
        let mut hook = provider.use_url_state(UrlState::new(), UseUrlStateOptions::default());
        let (_, set) = hook.render().unwrap();
        scheduler.run_until_idle();

        set.set(UrlState::new(), SetUrlStateOptions::debounce(300)).unwrap();
        set.merge(state(json!({"q": "x"}))).unwrap();
        // The merge used the consumer default (0ms), last writer wins.
        hook.render().unwrap();
        assert_eq!(scheduler.run_due(), 1);
    }

    #[test]
    fn test_updater_receives_decoded_state() {
        let (_location, _scheduler, provider) = mount("/?n=1");
        let mut hook = provider.use_url_state(UrlState::new(), UseUrlStateOptions::default());
        let (_, set) = hook.render().unwrap();

        set.replace_with(|current| {
            let n: u32 = current.get_str("n").and_then(|n| n.parse().ok()).unwrap_or(0);
            UrlState::new().with("n", n + 1)
        })
        .unwrap();
        assert_eq!(hook.render().unwrap().0.get_str("n"), Some("2"));
    }

    #[test]
    fn test_merge_typed() {
        #[derive(Serialize)]
        struct Search<'a> {
            q: &'a str,
        }

        let (_location, _scheduler, provider) = mount("/");
        let mut hook = provider.use_url_state(UrlState::new(), UseUrlStateOptions::default());
        let (_, set) = hook.render().unwrap();

        set.merge_typed(&Search { q: "rust" }, SetUrlStateOptions::default())
            .unwrap();
        assert_eq!(hook.render().unwrap().0.get_str("q"), Some("rust"));

        let err = set
            .merge_typed(&"not an object", SetUrlStateOptions::default())
            .unwrap_err();
        assert!(matches!(err, UrlStateError::Codec(_)));
    }

    #[test]
    fn test_write_is_debounced_and_restarted() {
        let (location, scheduler, provider) = mount("/");
        let mut hook = provider.use_url_state(UrlState::new(), UseUrlStateOptions::debounced(100));
        let (_, set) = hook.render().unwrap();
        scheduler.run_until_idle();

        set.merge(state(json!({"q": "a"}))).unwrap();
        hook.render().unwrap();
        scheduler.advance(Duration::from_millis(60));

        set.merge(state(json!({"q": "ab"}))).unwrap();
        hook.render().unwrap();
        scheduler.advance(Duration::from_millis(60));
        assert_eq!(location.href(), "/");
        assert!(hook.has_pending_write());

        scheduler.advance(Duration::from_millis(40));
        assert_eq!(location.href(), "/?q=ab");
        assert_eq!(location.len(), 2);
        assert!(!hook.has_pending_write());
    }

    #[test]
    fn test_pending_write_clears_once_run() {
        let (location, scheduler, provider) = mount("/");
        let mut hook = provider.use_url_state(UrlState::new(), UseUrlStateOptions::debounced(10));
        let (_, set) = hook.render().unwrap();

        set.merge(state(json!({"q": "x"}))).unwrap();
        hook.render().unwrap();
        assert!(hook.has_pending_write());

        scheduler.run_until_idle();
        assert_eq!(location.href(), "/?q=x");
        assert_eq!(scheduler.pending(), 0);
        assert!(!provider.is_updating());
        assert!(!hook.has_pending_write());
    }

    #[test]
    fn test_render_skips_reconcile_while_write_pending() {
        let (location, scheduler, provider) = mount("/");
        let mut hook = provider.use_url_state(UrlState::new(), UseUrlStateOptions::debounced(50));
        let (_, set) = hook.render().unwrap();
        scheduler.run_until_idle();

        set.merge(state(json!({"q": "typed"}))).unwrap();
        let (current, _) = hook.render().unwrap();
        // The address still has no query, but the pending write wins.
        let (again, _) = hook.render().unwrap();
        assert_eq!(current.get_str("q"), Some("typed"));
        assert_eq!(again.get_str("q"), Some("typed"));
        assert_eq!(location.href(), "/");
    }

    #[test]
    fn test_render_picks_up_silent_address_change() {
        let (location, scheduler, provider) = mount("/");
        let mut hook =
            provider.use_url_state(state(json!({"q": ""})), UseUrlStateOptions::default());
        hook.render().unwrap();
        scheduler.run_until_idle();

        location.navigate("/?q=linked");
        let before = provider.render_count();
        let (current, _) = hook.render().unwrap();
        assert_eq!(current.get_str("q"), Some("linked"));
        assert_eq!(provider.render_count(), before + 1);
    }

    #[test]
    fn test_setter_after_unmount_fails_loudly() {
        let (_location, _scheduler, provider) = mount("/");
        let mut hook = provider.use_url_state(UrlState::new(), UseUrlStateOptions::default());
        let (_, set) = hook.render().unwrap();

        drop(provider);
        assert!(matches!(
            set.merge(state(json!({"q": "x"}))),
            Err(UrlStateError::ProviderUnmounted)
        ));
        assert!(matches!(hook.render(), Err(UrlStateError::ProviderUnmounted)));
    }

    #[test]
    fn test_drop_cancels_write_and_unsubscribes() {
        let (location, scheduler, provider) = mount("/");
        let mut hook = provider.use_url_state(UrlState::new(), UseUrlStateOptions::debounced(100));
        let (_, set) = hook.render().unwrap();
        scheduler.run_until_idle();
        assert_eq!(location.listener_count(), 1);

        set.merge(state(json!({"q": "x"}))).unwrap();
        hook.render().unwrap();
        assert!(provider.is_updating());

        drop(hook);
        assert_eq!(location.listener_count(), 0);
        assert!(!provider.is_updating());
        assert_eq!(scheduler.pending(), 0);
    }
}
