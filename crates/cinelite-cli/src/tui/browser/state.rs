//! Movie browser TUI state management.

use cinelite_api::tmdb::{FetchError, Genre, MovieDetail, ResultPage};
use cinelite_core::messages::describe_fetch_error;
use cinelite_core::paged_list::{ListFilter, PageMode, PageRequest, PagedList};
use cinelite_core::quick_search::QuickSearchView;
use cinelite_core::theme::Theme;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::widgets::TableState;

/// Input mode for the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Inline search input with live preview.
    Search,
}

/// Details pane contents.
#[derive(Debug, Clone)]
pub enum DetailView {
    /// Waiting for the movie with this ID.
    Loading(u64),
    /// Loaded details.
    Loaded(Box<MovieDetail>),
    /// The request failed.
    Failed(String),
}

/// Side effect requested by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch a list page.
    Fetch(PageRequest),
    /// Fetch details for a movie.
    Details(u64),
    /// Feed a new value to the quick search.
    Preview(String),
    /// Open a URL in the default browser.
    OpenUrl(String),
    /// Flip and persist the theme.
    ToggleTheme,
    /// Leave the browser.
    Quit,
}

/// Result of background work, delivered back to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Response to a list page request.
    Page(PageRequest, Result<ResultPage, FetchError>),
    /// Response to a details request.
    Details(u64, Result<MovieDetail, FetchError>),
    /// Genre list for `g` cycling.
    Genres(Result<Vec<Genre>, FetchError>),
}

/// State for the movie browser TUI.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct BrowserState {
    /// Paged movie list.
    pub list: PagedList,
    /// Latest quick search snapshot.
    pub preview: QuickSearchView,
    /// Search input text.
    pub search_input: String,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Table state for the movie list (handles selection and scroll).
    pub table_state: TableState,
    /// Selected preview row while searching.
    pub preview_cursor: Option<usize>,
    /// Known genres.
    pub genres: Vec<Genre>,
    /// Details pane; `None` shows the list.
    pub detail: Option<DetailView>,
    /// Active theme.
    pub theme: Theme,
    /// One-line status message.
    pub status: Option<String>,
    genre_cursor: Option<usize>,
}

impl BrowserState {
    /// Creates an empty browser state.
    #[must_use]
    pub fn new(mode: PageMode, theme: Theme) -> Self {
        Self {
            list: PagedList::new(mode),
            preview: QuickSearchView::default(),
            search_input: String::new(),
            input_mode: InputMode::Normal,
            table_state: TableState::default(),
            preview_cursor: None,
            genres: Vec::new(),
            detail: None,
            theme,
            status: None,
            genre_cursor: None,
        }
    }

    /// Requests the initial listing (popular movies).
    pub fn start(&mut self) -> Vec<Command> {
        self.list
            .set_filter(ListFilter::Popular)
            .map(Command::Fetch)
            .into_iter()
            .collect()
    }

    /// Human-readable label for the active filter.
    #[must_use]
    pub fn filter_label(&self) -> String {
        match self.list.filter() {
            ListFilter::Popular => String::from("Popular"),
            ListFilter::TopRated => String::from("Top rated"),
            ListFilter::Upcoming => String::from("Upcoming"),
            ListFilter::Text(query) => format!("Search: \"{}\"", query.trim()),
            ListFilter::Genre(id) => {
                let name = self
                    .genres
                    .iter()
                    .find(|g| g.id == *id)
                    .map_or_else(|| id.to_string(), |g| g.name.clone());
                format!("Genre: {name}")
            }
        }
    }

    /// Returns the list cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    /// ID of the highlighted movie, if any.
    #[must_use]
    pub fn selected_movie_id(&self) -> Option<u64> {
        self.list.items().get(self.cursor()).map(|m| m.id)
    }

    /// Footer message: the status line, or the list error while the movies
    /// loaded before the failure are still shown.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.status.as_deref().or_else(|| {
            if self.list.items().is_empty() {
                None
            } else {
                self.list.error()
            }
        })
    }

    /// Handles a key press and returns the side effects to perform.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Vec<Command> {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Command::Quit];
        }
        match self.input_mode {
            InputMode::Search => self.handle_search_key(key),
            InputMode::Normal if self.detail.is_some() => self.handle_detail_key(key),
            InputMode::Normal => self.handle_list_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyCode) -> Vec<Command> {
        let command = match key {
            KeyCode::Char('q') => Some(Command::Quit),
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_up();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_down();
                None
            }
            KeyCode::Left | KeyCode::Char('h') => self.list.previous_page().map(Command::Fetch),
            KeyCode::Right | KeyCode::Char('l') => self.list.next_page().map(Command::Fetch),
            KeyCode::Home => self.list.go_to_page(1).map(Command::Fetch),
            KeyCode::End => {
                let last = self.list.total_pages();
                self.list.go_to_page(last).map(Command::Fetch)
            }
            KeyCode::Char(c @ '1'..='9') => self.jump_to_window_slot(c),
            KeyCode::Char('m') => self.list.load_more().map(Command::Fetch),
            KeyCode::F(5) => self.list.reload().map(Command::Fetch),
            KeyCode::Char('p') => self.switch_filter(ListFilter::Popular),
            KeyCode::Char('r') => self.switch_filter(ListFilter::TopRated),
            KeyCode::Char('u') => self.switch_filter(ListFilter::Upcoming),
            KeyCode::Char('g') => self.cycle_genre(),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
                self.preview_cursor = None;
                None
            }
            KeyCode::Char('d') | KeyCode::Enter => {
                self.selected_movie_id().map(|id| self.open_detail(id))
            }
            KeyCode::Char('t') => Some(Command::ToggleTheme),
            _ => None,
        };
        command.into_iter().collect()
    }

    fn handle_detail_key(&mut self, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Char('q') => vec![Command::Quit],
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                self.detail = None;
                Vec::new()
            }
            KeyCode::Char('o') => self.homepage().map(Command::OpenUrl).into_iter().collect(),
            KeyCode::Char('t') => vec![Command::ToggleTheme],
            _ => Vec::new(),
        }
    }

    fn handle_search_key(&mut self, key: KeyCode) -> Vec<Command> {
        match key {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.search_input.clear();
                self.preview_cursor = None;
                vec![Command::Preview(String::new())]
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let picked = self
                    .preview_cursor
                    .and_then(|i| self.preview.results.get(i))
                    .map(|m| m.id);
                self.preview_cursor = None;
                let mut commands = vec![Command::Preview(String::new())];
                if let Some(id) = picked {
                    commands.push(self.open_detail(id));
                } else {
                    let query = std::mem::take(&mut self.search_input);
                    commands.extend(self.switch_filter(ListFilter::Text(query)));
                }
                self.search_input.clear();
                commands
            }
            KeyCode::Down => {
                let len = self.preview.results.len();
                if len > 0 {
                    let next = self
                        .preview_cursor
                        .map_or(0, |i| i.saturating_add(1).min(len.saturating_sub(1)));
                    self.preview_cursor = Some(next);
                }
                Vec::new()
            }
            KeyCode::Up => {
                self.preview_cursor = match self.preview_cursor {
                    Some(0) | None => None,
                    Some(i) => Some(i.saturating_sub(1)),
                };
                Vec::new()
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.preview_cursor = None;
                vec![Command::Preview(self.search_input.clone())]
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.preview_cursor = None;
                vec![Command::Preview(self.search_input.clone())]
            }
            _ => Vec::new(),
        }
    }

    /// Applies the result of background work.
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Page(request, result) => {
                if self.list.complete(&request, result) {
                    self.sync_selection(request.is_append());
                }
            }
            AppEvent::Details(id, result) => {
                if !matches!(self.detail, Some(DetailView::Loading(pending)) if pending == id) {
                    return;
                }
                self.detail = Some(match result {
                    Ok(detail) => DetailView::Loaded(Box::new(detail)),
                    Err(e) => DetailView::Failed(describe_fetch_error(&e)),
                });
            }
            AppEvent::Genres(result) => match result {
                Ok(genres) => self.genres = genres,
                Err(e) => self.status = Some(describe_fetch_error(&e)),
            },
        }
    }

    /// Replaces the quick search snapshot.
    pub fn set_preview(&mut self, view: QuickSearchView) {
        if self
            .preview_cursor
            .is_some_and(|i| i >= view.results.len())
        {
            self.preview_cursor = None;
        }
        self.preview = view;
    }

    fn switch_filter(&mut self, filter: ListFilter) -> Option<Command> {
        self.table_state.select(None);
        let request = self.list.set_filter(filter);
        if request.is_none() {
            self.sync_selection(false);
        }
        request.map(Command::Fetch)
    }

    fn cycle_genre(&mut self) -> Option<Command> {
        if self.genres.is_empty() {
            self.status = Some(String::from("Genres are not loaded yet"));
            return None;
        }
        let count = self.genres.len();
        let next = self
            .genre_cursor
            .and_then(|i| i.saturating_add(1).checked_rem(count))
            .unwrap_or(0);
        self.genre_cursor = Some(next);
        let id = self.genres.get(next)?.id;
        self.switch_filter(ListFilter::Genre(id))
    }

    fn jump_to_window_slot(&mut self, digit: char) -> Option<Command> {
        let slot = usize::try_from(digit.to_digit(10)?).ok()?.checked_sub(1)?;
        let page = *self.list.window().pages.get(slot)?;
        self.list.go_to_page(page).map(Command::Fetch)
    }

    fn open_detail(&mut self, id: u64) -> Command {
        self.detail = Some(DetailView::Loading(id));
        Command::Details(id)
    }

    fn homepage(&self) -> Option<String> {
        match &self.detail {
            Some(DetailView::Loaded(detail)) => detail.homepage.clone(),
            _ => None,
        }
    }

    fn sync_selection(&mut self, keep: bool) {
        let len = self.list.items().len();
        if len == 0 {
            self.table_state.select(None);
        } else if !keep || self.table_state.selected().is_none() {
            self.table_state.select(Some(0));
        }
    }

    /// Moves cursor up.
    pub fn move_up(&mut self) {
        let current = self.cursor();
        if current > 0 {
            self.table_state.select(Some(current.saturating_sub(1)));
        }
    }

    /// Moves cursor down.
    pub fn move_down(&mut self) {
        let current = self.cursor();
        if current.saturating_add(1) < self.list.items().len() {
            self.table_state.select(Some(current.saturating_add(1)));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::indexing_slicing)]

    use cinelite_api::tmdb::{MovieListing, MovieSummary};
    use cinelite_core::messages::CREDENTIAL_MESSAGE;
    use cinelite_core::quick_search::SearchPhase;

    use super::*;

    fn summary(id: u64) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("movie {id}"),
            poster_path: None,
            release_date: Some(String::from("2001-01-01")),
            vote_average: Some(6.0),
        }
    }

    fn page(ids: std::ops::Range<u64>, page: u32, total_pages: u32) -> ResultPage {
        ResultPage {
            items: ids.map(summary).collect(),
            page,
            total_pages,
            total_results: 100,
        }
    }

    fn fetch_request(commands: Vec<Command>) -> PageRequest {
        match commands.into_iter().next() {
            Some(Command::Fetch(request)) => request,
            other => panic!("expected a fetch, got {other:?}"),
        }
    }

    fn loaded_state(mode: PageMode, total_pages: u32) -> BrowserState {
        let mut state = BrowserState::new(mode, Theme::Light);
        let request = fetch_request(state.start());
        state.apply(AppEvent::Page(request, Ok(page(1..6, 1, total_pages))));
        state
    }

    fn key(state: &mut BrowserState, code: KeyCode) -> Vec<Command> {
        state.handle_key(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_start_requests_popular() {
        // Arrange
        let mut state = BrowserState::new(PageMode::Replace, Theme::Dark);

        // Act
        let request = fetch_request(state.start());

        // Assert
        assert_eq!(request.listing(), &MovieListing::Popular);
        assert_eq!(request.page(), 1);
        assert_eq!(state.filter_label(), "Popular");
    }

    #[test]
    fn test_page_load_selects_first_row() {
        // Arrange & Act
        let state = loaded_state(PageMode::Replace, 10);

        // Assert
        assert_eq!(state.table_state.selected(), Some(0));
        assert_eq!(state.selected_movie_id(), Some(1));
    }

    #[test]
    fn test_move_down_and_up() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);

        // Act & Assert
        key(&mut state, KeyCode::Down);
        key(&mut state, KeyCode::Char('j'));
        assert_eq!(state.cursor(), 2);
        key(&mut state, KeyCode::Up);
        assert_eq!(state.cursor(), 1);
        for _ in 0..10 {
            key(&mut state, KeyCode::Down);
        }
        assert_eq!(state.cursor(), 4);
    }

    #[test]
    fn test_right_arrow_requests_next_page() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);

        // Act
        let request = fetch_request(key(&mut state, KeyCode::Right));
        let back = fetch_request(key(&mut state, KeyCode::Left));

        // Assert
        assert_eq!(request.page(), 2);
        assert_eq!(back.page(), 1);
        assert!(key(&mut state, KeyCode::Left).is_empty());
    }

    #[test]
    fn test_digit_jumps_to_window_slot() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);

        // Act
        let request = fetch_request(key(&mut state, KeyCode::Char('4')));

        // Assert
        assert_eq!(request.page(), 4);
        assert!(key(&mut state, KeyCode::Char('9')).is_empty());
    }

    #[test]
    fn test_load_more_in_append_mode() {
        // Arrange
        let mut state = loaded_state(PageMode::Append, 3);

        // Act
        let request = fetch_request(key(&mut state, KeyCode::Char('m')));
        state.apply(AppEvent::Page(request.clone(), Ok(page(6..11, 2, 3))));

        // Assert
        assert!(request.is_append());
        assert_eq!(state.list.items().len(), 10);
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_genre_cycle_needs_genres() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);

        // Act
        let commands = key(&mut state, KeyCode::Char('g'));

        // Assert
        assert!(commands.is_empty());
        assert!(state.status.is_some());
    }

    #[test]
    fn test_genre_cycle_wraps() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);
        state.apply(AppEvent::Genres(Ok(vec![
            Genre {
                id: 28,
                name: String::from("Ação"),
            },
            Genre {
                id: 35,
                name: String::from("Comédia"),
            },
        ])));

        // Act
        let first = fetch_request(key(&mut state, KeyCode::Char('g')));
        let label = state.filter_label();
        let second = fetch_request(key(&mut state, KeyCode::Char('g')));
        let third = fetch_request(key(&mut state, KeyCode::Char('g')));

        // Assert
        assert_eq!(first.listing(), &MovieListing::Genre { id: 28 });
        assert_eq!(label, "Genre: Ação");
        assert_eq!(second.listing(), &MovieListing::Genre { id: 35 });
        assert_eq!(third.listing(), &MovieListing::Genre { id: 28 });
    }

    #[test]
    fn test_search_typing_feeds_preview() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);

        // Act
        key(&mut state, KeyCode::Char('/'));
        key(&mut state, KeyCode::Char('b'));
        let commands = key(&mut state, KeyCode::Char('a'));

        // Assert
        assert_eq!(state.input_mode, InputMode::Search);
        assert_eq!(commands, vec![Command::Preview(String::from("ba"))]);
    }

    #[test]
    fn test_search_enter_commits_full_search() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);
        key(&mut state, KeyCode::Char('/'));
        for c in "batman".chars() {
            key(&mut state, KeyCode::Char(c));
        }

        // Act
        let commands = key(&mut state, KeyCode::Enter);

        // Assert
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], Command::Preview(String::new()));
        let Command::Fetch(request) = &commands[1] else {
            panic!("expected a fetch");
        };
        assert_eq!(request.listing(), &MovieListing::search("batman"));
        assert_eq!(state.input_mode, InputMode::Normal);
        assert!(state.search_input.is_empty());
    }

    #[test]
    fn test_search_enter_on_blank_query_clears_list() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);
        key(&mut state, KeyCode::Char('/'));
        key(&mut state, KeyCode::Char(' '));

        // Act
        let commands = key(&mut state, KeyCode::Enter);

        // Assert
        assert_eq!(commands, vec![Command::Preview(String::new())]);
        assert!(state.list.items().is_empty());
        assert_eq!(state.table_state.selected(), None);
    }

    #[test]
    fn test_preview_selection_opens_details() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);
        key(&mut state, KeyCode::Char('/'));
        state.set_preview(QuickSearchView {
            input: String::from("bat"),
            phase: SearchPhase::Ready,
            results: vec![summary(268), summary(272)],
        });

        // Act
        key(&mut state, KeyCode::Down);
        key(&mut state, KeyCode::Down);
        key(&mut state, KeyCode::Down);
        let commands = key(&mut state, KeyCode::Enter);

        // Assert
        assert_eq!(
            commands,
            vec![Command::Preview(String::new()), Command::Details(272)]
        );
        assert!(matches!(state.detail, Some(DetailView::Loading(272))));
    }

    #[test]
    fn test_escape_leaves_search() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);
        key(&mut state, KeyCode::Char('/'));
        key(&mut state, KeyCode::Char('x'));

        // Act
        let commands = key(&mut state, KeyCode::Esc);

        // Assert
        assert_eq!(commands, vec![Command::Preview(String::new())]);
        assert_eq!(state.input_mode, InputMode::Normal);
        assert!(state.search_input.is_empty());
    }

    #[test]
    fn test_details_flow_and_homepage() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);
        let commands = key(&mut state, KeyCode::Char('d'));
        assert_eq!(commands, vec![Command::Details(1)]);

        // Act
        state.apply(AppEvent::Details(
            1,
            Ok(MovieDetail {
                id: 1,
                title: String::from("movie 1"),
                overview: None,
                genres: Vec::new(),
                poster_path: None,
                vote_average: None,
                homepage: Some(String::from("https://example.com/movie")),
                release_date: None,
                runtime: None,
            }),
        ));
        let open = key(&mut state, KeyCode::Char('o'));
        key(&mut state, KeyCode::Esc);

        // Assert
        assert_eq!(
            open,
            vec![Command::OpenUrl(String::from("https://example.com/movie"))]
        );
        assert!(state.detail.is_none());
    }

    #[test]
    fn test_stale_details_are_ignored() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);
        key(&mut state, KeyCode::Char('d'));
        key(&mut state, KeyCode::Esc);

        // Act
        state.apply(AppEvent::Details(1, Err(FetchError::http(500, "HTTP 500"))));

        // Assert
        assert!(state.detail.is_none());
    }

    #[test]
    fn test_unauthorized_page_shows_credential_message() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);
        let request = fetch_request(key(&mut state, KeyCode::Right));

        // Act
        state.apply(AppEvent::Page(
            request,
            Err(FetchError::http(401, "HTTP 401 Unauthorized")),
        ));

        // Assert
        assert_eq!(state.list.error(), Some(CREDENTIAL_MESSAGE));
        assert!(state.list.items().is_empty());
        assert_eq!(state.table_state.selected(), None);
    }

    #[test]
    fn test_failed_load_more_keeps_movies_and_reports_in_footer() {
        // Arrange
        let mut state = loaded_state(PageMode::Append, 3);
        let request = fetch_request(key(&mut state, KeyCode::Char('m')));

        // Act
        state.apply(AppEvent::Page(
            request,
            Err(FetchError::http(503, "HTTP 503 Service Unavailable")),
        ));

        // Assert
        assert_eq!(state.list.items().len(), 5);
        assert_eq!(state.selected_movie_id(), Some(1));
        let notice = state.notice().unwrap();
        assert!(notice.starts_with("Could not load movies"));
    }

    #[test]
    fn test_error_without_movies_is_not_a_footer_notice() {
        // Arrange
        let mut state = BrowserState::new(PageMode::Replace, Theme::Light);
        let request = fetch_request(state.start());

        // Act
        state.apply(AppEvent::Page(
            request,
            Err(FetchError::http(401, "HTTP 401 Unauthorized")),
        ));

        // Assert
        assert_eq!(state.list.error(), Some(CREDENTIAL_MESSAGE));
        assert_eq!(state.notice(), None);
        state.status = Some(String::from("Could not open link"));
        assert_eq!(state.notice(), Some("Could not open link"));
    }

    #[test]
    fn test_quit_keys() {
        // Arrange
        let mut state = loaded_state(PageMode::Replace, 10);

        // Act & Assert
        assert_eq!(key(&mut state, KeyCode::Char('q')), vec![Command::Quit]);
        assert_eq!(
            state.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            vec![Command::Quit]
        );
        assert_eq!(key(&mut state, KeyCode::Char('t')), vec![Command::ToggleTheme]);
    }
}
