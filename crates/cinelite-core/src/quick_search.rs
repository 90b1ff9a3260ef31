//! Search-as-you-type preview.
//!
//! [`QuickSearch`] is a plain state machine: it is told about keystrokes and
//! the passage of time, and hands out [`SearchTicket`]s when a search should
//! be issued. [`run_quick_search`] drives it on tokio.

use std::sync::Arc;
use std::time::Duration;

use cinelite_api::tmdb::{FetchError, MovieSummary, ResultPage, TmdbApi};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

/// Quiet period after the last keystroke before a search is issued.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Shortest trimmed query that triggers a search.
pub const MIN_QUERY_CHARS: usize = 2;

/// Number of results kept for the preview.
pub const PREVIEW_LIMIT: usize = 5;

/// Where the preview is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// No query long enough to search.
    #[default]
    Idle,
    /// Waiting for the debounce delay to elapse.
    Pending,
    /// A search is in flight.
    Loading,
    /// Results for the latest query are available.
    Ready,
    /// The latest search failed; results are empty.
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct DebounceTimer {
    generation: u64,
    deadline: Instant,
}

/// Identifies one issued search so that late responses can be recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: String,
}

impl SearchTicket {
    /// Trimmed query to send, always for page 1.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Input generation the ticket was issued for.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Snapshot of the preview for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickSearchView {
    /// Raw input as typed.
    pub input: String,
    /// Current phase.
    pub phase: SearchPhase,
    /// At most [`PREVIEW_LIMIT`] results for the latest query.
    pub results: Vec<MovieSummary>,
}

/// Debounced search controller.
///
/// Every input change bumps a generation counter. At most one timer is
/// armed at a time, and only a response whose ticket carries the current
/// generation is applied.
#[derive(Debug)]
pub struct QuickSearch {
    delay: Duration,
    input: String,
    phase: SearchPhase,
    results: Vec<MovieSummary>,
    timer: Option<DebounceTimer>,
    generation: u64,
}

impl Default for QuickSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl QuickSearch {
    /// Creates a controller using [`DEBOUNCE_DELAY`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_delay(DEBOUNCE_DELAY)
    }

    /// Creates a controller with a custom debounce delay.
    #[must_use]
    pub const fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            input: String::new(),
            phase: SearchPhase::Idle,
            results: Vec::new(),
            timer: None,
            generation: 0,
        }
    }

    /// Records a new input value.
    ///
    /// Short queries cancel any pending timer and clear the preview. Longer
    /// ones re-arm the single timer at `now + delay`.
    pub fn on_input(&mut self, value: &str, now: Instant) {
        self.input = String::from(value);
        self.generation = self.generation.wrapping_add(1);

        if value.trim().chars().count() < MIN_QUERY_CHARS {
            self.timer = None;
            self.phase = SearchPhase::Idle;
            self.results.clear();
            return;
        }

        self.timer = Some(DebounceTimer {
            generation: self.generation,
            deadline: now.checked_add(self.delay).unwrap_or(now),
        });
        self.phase = SearchPhase::Pending;
    }

    /// Consumes the timer if it is due and returns the search to issue.
    pub fn fire(&mut self, now: Instant) -> Option<SearchTicket> {
        let timer = self.timer?;
        if now < timer.deadline {
            return None;
        }
        self.timer = None;
        self.phase = SearchPhase::Loading;
        Some(SearchTicket {
            generation: timer.generation,
            query: String::from(self.input.trim()),
        })
    }

    /// Applies a search response. Returns `false` when the ticket is stale
    /// and the response was dropped.
    pub fn complete(&mut self, ticket: &SearchTicket, result: Result<ResultPage, FetchError>) -> bool {
        if ticket.generation != self.generation {
            debug!(query = %ticket.query, "discarding stale quick search response");
            return false;
        }
        match result {
            Ok(page) => {
                self.results = page.items.into_iter().take(PREVIEW_LIMIT).collect();
                self.phase = SearchPhase::Ready;
            }
            Err(e) => {
                warn!(query = %ticket.query, error = %e, "quick search failed");
                self.results.clear();
                self.phase = SearchPhase::Failed;
            }
        }
        true
    }

    /// Drops the timer and invalidates any search still in flight.
    pub fn cancel(&mut self) {
        self.timer = None;
        self.generation = self.generation.wrapping_add(1);
        self.phase = SearchPhase::Idle;
        self.results.clear();
    }

    /// When the armed timer is due, if one is armed.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.map(|t| t.deadline)
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Preview results for the latest query.
    #[must_use]
    pub fn results(&self) -> &[MovieSummary] {
        &self.results
    }

    /// Raw input as last typed.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> QuickSearchView {
        QuickSearchView {
            input: self.input.clone(),
            phase: self.phase,
            results: self.results.clone(),
        }
    }
}

/// Runs a [`QuickSearch`] until `inputs` is closed.
///
/// Each received string is a new input value. Searches run as detached
/// tasks and are never aborted; their responses are filtered by
/// generation. The latest state is published on `view` after every event.
pub async fn run_quick_search<A>(
    api: Arc<A>,
    mut inputs: mpsc::Receiver<String>,
    view: watch::Sender<QuickSearchView>,
) where
    A: TmdbApi + Sync + 'static,
{
    let mut search = QuickSearch::new();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(SearchTicket, Result<ResultPage, FetchError>)>();

    loop {
        let deadline = search.deadline();
        tokio::select! {
            input = inputs.recv() => {
                let Some(value) = input else {
                    break;
                };
                search.on_input(&value, Instant::now());
            }
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(ticket) = search.fire(Instant::now()) {
                    debug!(query = ticket.query(), "issuing quick search");
                    let api = Arc::clone(&api);
                    let done = done_tx.clone();
                    tokio::spawn(async move {
                        let result = api.search(ticket.query(), 1).await;
                        if done.send((ticket, result)).is_err() {
                            debug!("quick search driver stopped before the response arrived");
                        }
                    });
                }
            }
            Some((ticket, result)) = done_rx.recv() => {
                search.complete(&ticket, result);
            }
        }
        view.send_replace(search.view());
    }

    search.cancel();
    view.send_replace(search.view());
}
