//! Movie browser TUI main loop.

/// Browser state types.
pub mod state;
mod ui;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use cinelite_api::tmdb::TmdbApi;
use cinelite_core::paged_list::{PageMode, PageRequest};
use cinelite_core::quick_search::{QuickSearchView, run_quick_search};
use cinelite_core::theme::{PreferenceStore, ThemeSettings};
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use self::state::{AppEvent, BrowserState, Command};

/// Capacity of the quick search input channel.
const PREVIEW_INPUT_CAPACITY: usize = 32;

/// Background task plumbing shared by the command handlers.
struct Tasks<A> {
    api: Arc<A>,
    events: mpsc::UnboundedSender<AppEvent>,
    preview_input: mpsc::Sender<String>,
}

impl<A: TmdbApi + Sync + 'static> Tasks<A> {
    fn fetch_page(&self, request: PageRequest) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.fetch_page(request.listing(), request.page()).await;
            if events.send(AppEvent::Page(request, result)).is_err() {
                debug!("browser closed before the page arrived");
            }
        });
    }

    fn fetch_details(&self, movie_id: u64) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.details(movie_id).await;
            if events.send(AppEvent::Details(movie_id, result)).is_err() {
                debug!("browser closed before the details arrived");
            }
        });
    }

    fn fetch_genres(&self) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.genres().await;
            if events.send(AppEvent::Genres(result)).is_err() {
                debug!("browser closed before the genres arrived");
            }
        });
    }
}

/// Runs the movie browser TUI until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
pub async fn run_browser<A, S>(api: Arc<A>, mode: PageMode, theme: ThemeSettings<S>) -> Result<()>
where
    A: TmdbApi + Sync + 'static,
    S: PreferenceStore,
{
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, api, mode, theme).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
async fn run_event_loop<A, S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    api: Arc<A>,
    mode: PageMode,
    mut theme: ThemeSettings<S>,
) -> Result<()>
where
    A: TmdbApi + Sync + 'static,
    S: PreferenceStore,
{
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (preview_tx, preview_rx) = mpsc::channel(PREVIEW_INPUT_CAPACITY);
    let (view_tx, mut view_rx) = watch::channel(QuickSearchView::default());
    tokio::spawn(run_quick_search(Arc::clone(&api), preview_rx, view_tx));

    let tasks = Tasks {
        api,
        events: events_tx,
        preview_input: preview_tx,
    };
    let mut state = BrowserState::new(mode, theme.theme());
    tasks.fetch_genres();
    for command in state.start() {
        if execute(command, &tasks, &mut state, &mut theme).await {
            return Ok(());
        }
    }

    let mut input = EventStream::new();
    loop {
        terminal
            .draw(|frame| ui::draw(frame, &mut state))
            .context("failed to draw TUI")?;

        tokio::select! {
            maybe_event = input.next() => {
                let Some(event) = maybe_event else {
                    return Ok(());
                };
                if let Event::Key(key) = event.context("failed to read event")?
                    && key.kind == KeyEventKind::Press
                {
                    state.status = None;
                    for command in state.handle_key(key.code, key.modifiers) {
                        if execute(command, &tasks, &mut state, &mut theme).await {
                            return Ok(());
                        }
                    }
                }
            }
            Some(event) = events_rx.recv() => state.apply(event),
            Ok(()) = view_rx.changed() => {
                let view = view_rx.borrow_and_update().clone();
                state.set_preview(view);
            }
        }
    }
}

/// Performs one command. Returns `true` to exit.
async fn execute<A, S>(
    command: Command,
    tasks: &Tasks<A>,
    state: &mut BrowserState,
    theme: &mut ThemeSettings<S>,
) -> bool
where
    A: TmdbApi + Sync + 'static,
    S: PreferenceStore,
{
    match command {
        Command::Quit => return true,
        Command::Fetch(request) => tasks.fetch_page(request),
        Command::Details(movie_id) => tasks.fetch_details(movie_id),
        Command::Preview(value) => {
            if tasks.preview_input.send(value).await.is_err() {
                warn!("quick search stopped unexpectedly");
            }
        }
        Command::OpenUrl(url) => {
            if let Err(e) = open::that(&url) {
                warn!(url = %url, error = %e, "failed to open browser");
                state.status = Some(format!("Could not open {url}"));
            }
        }
        Command::ToggleTheme => {
            if let Err(e) = theme.toggle() {
                warn!(error = %e, "failed to persist theme");
                state.status = Some(String::from("Theme changed but could not be saved"));
            }
            state.theme = theme.theme();
        }
    }
    false
}
