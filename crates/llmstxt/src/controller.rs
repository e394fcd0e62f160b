//! Fetch lifecycle controller
//!
//! Design: the controller owns one [`LifecycleState`] published through a
//! `tokio::sync::watch` channel, so a front end only ever renders snapshots.
//! Each attempt runs as a single task that races the fetch against the
//! status-message ticker and, for route-embedded URLs, waits out the
//! redirect delay after a failure.
//!
//! Every `Loading` entry bumps a sequence number. Tasks apply updates only
//! while their sequence is still current, so a late response from a
//! superseded attempt can never overwrite newer state.

use crate::address::{is_valid_url, normalize_url, reconstruct_url, RouteParam};
use crate::client::{FetchResult, MarkdownSource};
use crate::error::InputError;
use crate::LOADING_MESSAGES;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

/// Where the controller is in the fetch cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot rendered by the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleState {
    pub phase: Phase,
    /// Target URL, normalized once a submission is accepted
    pub url: String,
    pub markdown: Option<String>,
    pub error: Option<String>,
    /// Index into [`LOADING_MESSAGES`]
    pub loading_message_index: usize,
    /// True when the target came from the app's own path
    pub is_dynamic_page: bool,
    sequence: u64,
}

impl LifecycleState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Status line to show while loading
    pub fn loading_message(&self) -> Option<&'static str> {
        if self.is_loading() {
            LOADING_MESSAGES.get(self.loading_message_index).copied()
        } else {
            None
        }
    }

    /// Sequence number of the most recent `Loading` entry
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// State of a freshly opened input screen
    fn home(sequence: u64) -> Self {
        Self {
            sequence,
            ..Default::default()
        }
    }
}

/// Timer settings of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerTimings {
    /// Time between status-message advances while loading
    pub message_interval: Duration,
    /// Delay before a failed route-embedded fetch returns to the input screen
    pub redirect_delay: Duration,
}

impl Default for ControllerTimings {
    fn default() -> Self {
        Self {
            message_interval: Duration::from_millis(2000),
            redirect_delay: Duration::from_millis(3000),
        }
    }
}

/// Accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Normalized URL being fetched
    pub url: String,
    /// True when normalization changed what the user typed
    pub normalized: bool,
}

/// Drives `Idle -> Loading -> Success | Error` for one session
///
/// Must be used from within a tokio runtime. Dropping the controller
/// cancels any in-flight attempt and pending timers.
pub struct FetchController {
    source: Arc<dyn MarkdownSource>,
    timings: ControllerTimings,
    state: Arc<watch::Sender<LifecycleState>>,
    task: Option<JoinHandle<()>>,
}

impl FetchController {
    pub fn new(source: Arc<dyn MarkdownSource>) -> Self {
        Self::with_timings(source, ControllerTimings::default())
    }

    pub fn with_timings(source: Arc<dyn MarkdownSource>, timings: ControllerTimings) -> Self {
        let (state, _) = watch::channel(LifecycleState::default());
        Self {
            source,
            timings,
            state: Arc::new(state),
            task: None,
        }
    }

    /// Current snapshot
    pub fn state(&self) -> LifecycleState {
        self.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Update the text in the input box without submitting
    pub fn set_url(&self, url: impl Into<String>) {
        let url = url.into();
        self.state.send_modify(|s| s.url = url);
    }

    /// Submit typed input
    ///
    /// Rejected input sets `error` and starts no network activity; phase,
    /// markdown and any in-flight attempt are left alone.
    pub fn submit(&mut self, input: &str) -> Result<Submission, InputError> {
        // Whitespace-only input is not empty; it fails validation below
        if input.is_empty() {
            return Err(self.reject(InputError::Empty));
        }

        let url = normalize_url(input);
        if !is_valid_url(&url) {
            return Err(self.reject(InputError::InvalidFormat));
        }

        let normalized = url != input;
        let dynamic = self.state.borrow().is_dynamic_page;
        self.start(url.clone(), dynamic);
        Ok(Submission { url, normalized })
    }

    /// Open a URL embedded in the app's own path
    ///
    /// An unreconstructable path is fatal: the error is shown and the session
    /// returns to the input screen after the redirect delay.
    pub fn open_route(&mut self, param: &RouteParam) -> Result<Submission, InputError> {
        match reconstruct_url(param) {
            Some(url) => {
                self.start(url.clone(), true);
                Ok(Submission {
                    url,
                    normalized: false,
                })
            }
            None => {
                self.abort_task();
                let err = InputError::InvalidRoute;
                let mut sequence = 0;
                self.state.send_modify(|s| {
                    s.sequence += 1;
                    sequence = s.sequence;
                    *s = LifecycleState {
                        is_dynamic_page: true,
                        error: Some(err.to_string()),
                        ..LifecycleState::home(sequence)
                    };
                });

                let state = Arc::clone(&self.state);
                let delay = self.timings.redirect_delay;
                self.task = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    redirect_home(&state, sequence);
                }));
                Err(err)
            }
        }
    }

    /// Wait until the current attempt leaves `Loading`
    pub async fn settled(&self) -> LifecycleState {
        let mut rx = self.state.subscribe();
        let result = rx
            .wait_for(|s| !s.is_loading())
            .await
            .map(|s| (*s).clone());
        // The sender lives in `self`, so the channel cannot close here
        result.unwrap_or_else(|_| self.state())
    }

    /// Abandon the in-flight attempt and pending timers
    ///
    /// A `Loading` session falls back to `Idle`.
    pub fn cancel(&mut self) {
        self.abort_task();
        self.state.send_if_modified(|s| {
            if !s.is_loading() {
                return false;
            }
            s.sequence += 1;
            s.phase = Phase::Idle;
            s.loading_message_index = 0;
            true
        });
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn reject(&self, err: InputError) -> InputError {
        let message = err.to_string();
        self.state.send_modify(|s| s.error = Some(message));
        err
    }

    fn start(&mut self, url: String, dynamic: bool) {
        self.abort_task();

        let mut sequence = 0;
        self.state.send_modify(|s| {
            s.sequence += 1;
            sequence = s.sequence;
            s.phase = Phase::Loading;
            s.url = url.clone();
            s.markdown = None;
            s.error = None;
            s.loading_message_index = 0;
            s.is_dynamic_page = dynamic;
        });
        debug!(url = %url, sequence, "Starting fetch");

        let attempt = Attempt {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            timings: self.timings,
            sequence,
            url,
            dynamic,
        };
        self.task = Some(tokio::spawn(attempt.run()));
    }
}

impl Drop for FetchController {
    fn drop(&mut self) {
        self.abort_task();
    }
}

/// One fetch, from `Loading` entry to settlement (and redirect, if any)
struct Attempt {
    source: Arc<dyn MarkdownSource>,
    state: Arc<watch::Sender<LifecycleState>>,
    timings: ControllerTimings,
    sequence: u64,
    url: String,
    dynamic: bool,
}

impl Attempt {
    async fn run(self) {
        let period = self.timings.message_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        let fetch = self.source.fetch_markdown(&self.url);
        tokio::pin!(fetch);

        let result = loop {
            tokio::select! {
                result = &mut fetch => break result,
                _ = ticker.tick() => self.advance_message(),
            }
        };

        let failed = !result.is_data();
        if !self.settle(result) {
            debug!(sequence = self.sequence, "Dropping stale response");
            return;
        }

        if failed && self.dynamic {
            tokio::time::sleep(self.timings.redirect_delay).await;
            redirect_home(&self.state, self.sequence);
        }
    }

    fn advance_message(&self) {
        let last = LOADING_MESSAGES.len().saturating_sub(1);
        self.state.send_if_modified(|s| {
            if s.sequence != self.sequence || !s.is_loading() || s.loading_message_index >= last {
                return false;
            }
            s.loading_message_index += 1;
            true
        });
    }

    /// Apply the result; false if a newer attempt has taken over
    fn settle(&self, result: FetchResult) -> bool {
        self.state.send_if_modified(|s| {
            if s.sequence != self.sequence {
                return false;
            }
            match result {
                FetchResult::Data(text) => {
                    s.phase = Phase::Success;
                    s.markdown = Some(text);
                    s.error = None;
                }
                FetchResult::Error(message) => {
                    s.phase = Phase::Error;
                    s.markdown = None;
                    s.error = Some(message);
                }
            }
            true
        })
    }
}

/// Return to the input screen unless a newer attempt has started
fn redirect_home(state: &watch::Sender<LifecycleState>, sequence: u64) {
    state.send_if_modified(|s| {
        if s.sequence != sequence {
            return false;
        }
        debug!(sequence, "Returning to input screen");
        *s = LifecycleState::home(sequence);
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = LifecycleState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.markdown.is_none());
        assert!(state.error.is_none());
        assert_eq!(state.loading_message_index, 0);
        assert!(!state.is_dynamic_page);
        assert_eq!(state.loading_message(), None);
    }

    #[test]
    fn test_loading_message() {
        let state = LifecycleState {
            phase: Phase::Loading,
            loading_message_index: 2,
            ..Default::default()
        };
        assert_eq!(state.loading_message(), Some("Extracting the good stuff..."));
    }

    #[test]
    fn test_default_timings() {
        let timings = ControllerTimings::default();
        assert_eq!(timings.message_interval, Duration::from_millis(2000));
        assert_eq!(timings.redirect_delay, Duration::from_millis(3000));
    }

    #[test]
    fn test_home_keeps_sequence() {
        let home = LifecycleState::home(7);
        assert_eq!(home.sequence(), 7);
        assert_eq!(home.phase, Phase::Idle);
        assert!(home.url.is_empty());
    }
}
