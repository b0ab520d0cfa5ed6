//! Provider: owner of the shared cell.

use std::fmt;
use std::rc::Rc;

use urlstate_codec::UrlState;

use crate::cell::SharedCell;
use crate::hook::UrlStateHook;
use crate::location::Location;
use crate::options::UseUrlStateOptions;
use crate::scheduler::Scheduler;

/// Scope for a group of URL state consumers.
///
/// All hooks created by one provider share one cell: the same current state,
/// the same merged defaults and the same render counter. Independent
/// providers never share state, even over the same location.
///
/// Dropping the provider unmounts the cell. Hooks and setters that outlive
/// it return [`UrlStateError::ProviderUnmounted`](crate::UrlStateError::ProviderUnmounted).
pub struct UrlStateProvider {
    cell: Rc<SharedCell>,
    location: Rc<dyn Location>,
    scheduler: Rc<dyn Scheduler>,
}

impl UrlStateProvider {
    /// Mount a provider over a location and a scheduler.
    pub fn new(location: impl Location + 'static, scheduler: impl Scheduler + 'static) -> Self {
        Self::from_shared(Rc::new(location), Rc::new(scheduler))
    }

    /// Mount a provider over already shared collaborators.
    pub fn from_shared(location: Rc<dyn Location>, scheduler: Rc<dyn Scheduler>) -> Self {
        tracing::debug!(path = %location.pathname(), "url state provider mounted");
        Self {
            cell: Rc::new(SharedCell::new()),
            location,
            scheduler,
        }
    }

    /// Create a consumer with its own defaults and options.
    ///
    /// The consumer does nothing until its first [`render`](UrlStateHook::render).
    pub fn use_url_state(&self, defaults: UrlState, options: UseUrlStateOptions) -> UrlStateHook {
        UrlStateHook::new(
            Rc::downgrade(&self.cell),
            Rc::clone(&self.location),
            Rc::clone(&self.scheduler),
            defaults,
            options,
        )
    }

    /// Number of re-renders requested so far.
    ///
    /// Hosts compare this against the count they last rendered at to decide
    /// whether consumers need to render again.
    pub fn render_count(&self) -> u64 {
        self.cell.render_count()
    }

    /// Register the host's re-render hook.
    ///
    /// Called with the new render count each time a consumer requests a
    /// re-render. Replaces any previous callback.
    pub fn on_rerender(&self, callback: impl Fn(u64) + 'static) {
        self.cell.set_on_rerender(Rc::new(callback));
    }

    /// Current decoded state.
    pub fn state(&self) -> UrlState {
        self.cell.decoded()
    }

    /// Defaults merged from every consumer that has rendered.
    pub fn default_state(&self) -> UrlState {
        self.cell.default_state()
    }

    /// True while a debounced history write is pending.
    pub fn is_updating(&self) -> bool {
        self.cell.is_updating()
    }

    /// The location this provider synchronizes with.
    pub fn location(&self) -> &Rc<dyn Location> {
        &self.location
    }
}

impl Drop for UrlStateProvider {
    fn drop(&mut self) {
        tracing::debug!(
            render_count = self.cell.render_count(),
            "url state provider unmounted"
        );
    }
}

impl fmt::Debug for UrlStateProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlStateProvider")
            .field("cell", &self.cell)
            .finish_non_exhaustive()
    }
}
