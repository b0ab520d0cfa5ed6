//! Scripted demo session.
//!
//! Plays the classic search-box demo without a browser: one consumer with a
//! debounced search field, a button that sets an arbitrary key, and a reset
//! button. The host loop renders whenever the provider requests it and runs
//! zero-delay timers after each step, the way a browser event loop would.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde::Serialize;
use urlstate_codec::UrlState;
use urlstate_sync::{
    ManualScheduler, MemoryLocation, SetUrlStateOptions, UrlStateHook, UrlStateProvider,
    UseUrlStateOptions,
};

use crate::config::DemoConfig;

/// Key the `type=` step writes to.
pub const SEARCH_KEY: &str = "search";

/// One scripted user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoAction {
    /// Type into the search box (debounced).
    Type(String),
    /// Set one key (consumer default debounce).
    Set { key: String, value: String },
    /// Replace the state with the defaults.
    Reset,
    /// Let time pass.
    Wait(u64),
    /// Browser back button.
    Back,
    /// Browser forward button.
    Forward,
    /// Navigate to an address out of band, like following a link.
    Visit(String),
}

impl FromStr for DemoAction {
    type Err = anyhow::Error;

    fn from_str(step: &str) -> Result<Self> {
        let (name, arg) = match step.split_once('=') {
            Some((name, arg)) => (name, Some(arg)),
            None => (step, None),
        };
        let action = match (name, arg) {
            ("type", Some(text)) => Self::Type(text.to_string()),
            ("set", Some(assignment)) => {
                let (key, value) = assignment
                    .split_once('=')
                    .ok_or_else(|| anyhow!("expected set=<key>=<value>, got {step:?}"))?;
                if key.is_empty() {
                    bail!("set step needs a key: {step:?}");
                }
                Self::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            ("wait", Some(ms)) => Self::Wait(
                ms.parse()
                    .map_err(|_| anyhow!("wait expects milliseconds, got {ms:?}"))?,
            ),
            ("visit", Some(url)) => Self::Visit(url.to_string()),
            ("reset", None) => Self::Reset,
            ("back", None) => Self::Back,
            ("forward", None) => Self::Forward,
            _ => bail!(
                "unknown step {step:?} (expected type=, set=, wait=, visit=, reset, back or forward)"
            ),
        };
        Ok(action)
    }
}

impl fmt::Display for DemoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(text) => write!(f, "type={text}"),
            Self::Set { key, value } => write!(f, "set={key}={value}"),
            Self::Reset => f.write_str("reset"),
            Self::Wait(ms) => write!(f, "wait={ms}"),
            Self::Back => f.write_str("back"),
            Self::Forward => f.write_str("forward"),
            Self::Visit(url) => write!(f, "visit={url}"),
        }
    }
}

/// What the page shows after a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoFrame {
    pub step: String,
    pub state: UrlState,
    pub url: String,
    pub renders: u64,
}

impl fmt::Display for DemoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = serde_json::to_string(&self.state).map_err(|_| fmt::Error)?;
        write!(
            f,
            "{:<16} state={state} url={} renders={}",
            self.step, self.url, self.renders
        )
    }
}

/// A mounted demo page.
pub struct DemoSession {
    config: DemoConfig,
    location: MemoryLocation,
    scheduler: ManualScheduler,
    hook: UrlStateHook,
    // Declared last so the hook is dropped before the provider.
    provider: UrlStateProvider,
    rendered_at: u64,
    renders: u64,
}

impl DemoSession {
    /// Mount the page and run its first render.
    pub fn mount(config: DemoConfig) -> Result<Self> {
        let location = MemoryLocation::new(&config.start_url);
        let scheduler = ManualScheduler::new();
        let provider = UrlStateProvider::new(location.clone(), scheduler.clone());
        let options = UseUrlStateOptions::default().with_history(config.history);
        let hook = provider.use_url_state(config.defaults.clone(), options);

        let mut session = Self {
            config,
            location,
            scheduler,
            hook,
            provider,
            rendered_at: 0,
            renders: 0,
        };
        session.render()?;
        session.settle()?;
        Ok(session)
    }

    /// Current page contents.
    pub fn frame(&self, step: impl Into<String>) -> DemoFrame {
        DemoFrame {
            step: step.into(),
            state: self.provider.state(),
            url: self.location.href(),
            renders: self.renders,
        }
    }

    /// Perform one action and let the page settle.
    pub fn apply(&mut self, action: &DemoAction) -> Result<DemoFrame> {
        tracing::info!(%action, "demo step");
        let set = self.hook.setter();
        match action {
            DemoAction::Type(text) => set.set(
                UrlState::new().with(SEARCH_KEY, text.as_str()),
                SetUrlStateOptions::debounce(self.config.search_debounce_ms),
            )?,
            DemoAction::Set { key, value } => {
                set.merge(UrlState::new().with(key.as_str(), value.as_str()))?;
            }
            DemoAction::Reset => {
                let defaults = self.config.defaults.clone();
                set.replace_with(move |_| defaults)?;
            }
            DemoAction::Wait(ms) => {
                self.scheduler.advance(Duration::from_millis(*ms));
            }
            DemoAction::Back => {
                self.location.back();
            }
            DemoAction::Forward => {
                self.location.forward();
            }
            DemoAction::Visit(url) => {
                self.location.navigate(url);
                // A router re-renders the page on navigation.
                self.render()?;
            }
        }
        self.settle()?;
        Ok(self.frame(action.to_string()))
    }

    /// Run a whole script, starting with the mounted page.
    pub fn run(&mut self, actions: &[DemoAction]) -> Result<Vec<DemoFrame>> {
        let mut frames = vec![self.frame("mount")];
        for action in actions {
            frames.push(self.apply(action)?);
        }
        Ok(frames)
    }

    fn render(&mut self) -> Result<()> {
        self.rendered_at = self.provider.render_count();
        self.hook.render()?;
        self.renders += 1;
        Ok(())
    }

    /// Render until nothing is requested, running zero-delay timers in
    /// between.
    fn settle(&mut self) -> Result<()> {
        loop {
            while self.provider.render_count() != self.rendered_at {
                self.render()?;
            }
            if self.scheduler.run_due() == 0 && self.provider.render_count() == self.rendered_at {
                return Ok(());
            }
        }
    }
}

impl fmt::Debug for DemoSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoSession")
            .field("location", &self.location)
            .field("scheduler", &self.scheduler)
            .field("renders", &self.renders)
            .finish_non_exhaustive()
    }
}
