//! Bidirectional synchronization of component state with the URL query string.
//!
//! A [`UrlStateProvider`] owns one shared cell. Each consumer created with
//! [`UrlStateProvider::use_url_state`] reads and writes that cell, and the
//! engine keeps it in sync with a [`Location`]:
//!
//! - **State to address**: changes are written to the history after a
//!   debounce, as a new entry or in place depending on [`HistoryMode`]
//! - **Address to state**: back/forward navigation and out-of-band address
//!   changes are pulled into the cell
//! - **Clean defaults**: a state equal to the merged defaults leaves no query
//!
//! The model is single-threaded. Hosts drive it by calling
//! [`UrlStateHook::render`] whenever [`UrlStateProvider::render_count`]
//! advances, and by running a [`Scheduler`].
//!
//! ```
//! use std::time::Duration;
//! use urlstate_sync::{
//!     ManualScheduler, MemoryLocation, UrlState, UrlStateProvider, UseUrlStateOptions,
//! };
//!
//! let location = MemoryLocation::new("/search");
//! let scheduler = ManualScheduler::new();
//! let provider = UrlStateProvider::new(location.clone(), scheduler.clone());
//!
//! let mut hook = provider.use_url_state(
//!     UrlState::new().with("q", ""),
//!     UseUrlStateOptions::debounced(300),
//! );
//! let (_, set) = hook.render()?;
//! set.merge(UrlState::new().with("q", "rust"))?;
//! hook.render()?;
//!
//! scheduler.advance(Duration::from_millis(300));
//! assert_eq!(location.href(), "/search?q=rust");
//! # Ok::<(), urlstate_sync::UrlStateError>(())
//! ```
//!
//! # Architecture
//!
//! - `provider.rs` - Provider and shared cell ownership
//! - `hook.rs` - Per-consumer engine and setter
//! - `location.rs` / `memory.rs` - Location adapter and in-memory history
//! - `scheduler.rs` / `runtime.rs` - Virtual-clock and tokio schedulers
//! - `params.rs` - Stateless query helpers

mod cell;
mod error;
mod hook;
mod location;
mod memory;
mod options;
mod params;
mod provider;
mod runtime;
mod scheduler;

pub use error::{Result, UrlStateError};
pub use hook::{SetUrlState, UrlStateHook};
pub use location::{
    Location, NavigationListener, NavigationSubscription, format_href, split_href,
};
pub use memory::{HistoryEntry, MemoryLocation};
pub use options::{HistoryMode, SetUrlStateOptions, Updater, UrlStateUpdate, UseUrlStateOptions};
pub use params::{get_url_params, merge_params, replace_params};
pub use provider::UrlStateProvider;
pub use runtime::TokioScheduler;
pub use scheduler::{ManualScheduler, Scheduler, Task, TimerId};

pub use urlstate_codec::{UrlState, canonical_eq, decode, encode};
