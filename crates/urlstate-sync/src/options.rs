//! Hook options and update payloads.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use urlstate_codec::UrlState;

/// How a debounced write lands in the navigation history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Add a new entry per committed state, so back-navigation returns to the
    /// state before the last committed change.
    #[default]
    Push,
    /// Overwrite the current entry in place.
    Replace,
}

impl HistoryMode {
    /// Lowercase name, as used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-consumer defaults, fixed when the hook is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UseUrlStateOptions {
    /// Debounce delay in milliseconds.
    ///
    /// After a change, the address bar is updated once this many milliseconds
    /// pass without further changes. Zero commits on the next scheduler turn.
    pub debounce_ms: u64,

    /// History write strategy.
    pub history: HistoryMode,
}

impl UseUrlStateOptions {
    /// Options with the given debounce.
    pub fn debounced(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            ..Self::default()
        }
    }

    /// Set the history mode.
    #[must_use]
    pub fn with_history(mut self, history: HistoryMode) -> Self {
        self.history = history;
        self
    }

    /// Debounce as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Per-call overrides for a state update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetUrlStateOptions {
    /// Debounce for this update; the consumer default when `None`.
    pub debounce_ms: Option<u64>,
}

impl SetUrlStateOptions {
    /// Override the debounce for one update.
    pub fn debounce(debounce_ms: u64) -> Self {
        Self {
            debounce_ms: Some(debounce_ms),
        }
    }

    /// Resolve against the consumer's defaults.
    pub(crate) fn resolve(self, defaults: &UseUrlStateOptions) -> Duration {
        Duration::from_millis(self.debounce_ms.unwrap_or(defaults.debounce_ms))
    }
}

/// Replacement function: receives the current decoded state, returns the
/// complete new state.
pub type Updater = Box<dyn FnOnce(&UrlState) -> UrlState>;

/// A state update.
pub enum UrlStateUpdate {
    /// Shallow-merge into the current state.
    Merge(UrlState),
    /// Replace the current state with the function's result.
    Replace(Updater),
}

impl UrlStateUpdate {
    /// Merge update.
    pub fn merge(partial: UrlState) -> Self {
        Self::Merge(partial)
    }

    /// Replacement update.
    pub fn replace_with(updater: impl FnOnce(&UrlState) -> UrlState + 'static) -> Self {
        Self::Replace(Box::new(updater))
    }

    /// Apply to `current`.
    pub(crate) fn apply(self, current: &UrlState) -> UrlState {
        match self {
            Self::Merge(partial) => current.merged(&partial),
            Self::Replace(updater) => updater(current),
        }
    }
}

impl From<UrlState> for UrlStateUpdate {
    fn from(partial: UrlState) -> Self {
        Self::Merge(partial)
    }
}

impl fmt::Debug for UrlStateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge(partial) => f.debug_tuple("Merge").field(partial).finish(),
            Self::Replace(_) => f.write_str("Replace(..)"),
        }
    }
}
