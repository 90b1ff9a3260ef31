//! TUI rendering logic for the movie browser.

use cinelite_api::tmdb::{MovieDetail, POSTER_SIZE, image_url};
use cinelite_core::paged_list::PageMode;
use cinelite_core::pagination::PaginationWindow;
use cinelite_core::quick_search::SearchPhase;
use cinelite_core::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap};

use super::state::{BrowserState, DetailView, InputMode};

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
struct Palette {
    fg: Color,
    bg: Color,
    accent: Color,
    muted: Color,
    error: Color,
}

impl Palette {
    const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                fg: Color::Black,
                bg: Color::White,
                accent: Color::Blue,
                muted: Color::DarkGray,
                error: Color::Red,
            },
            Theme::Dark => Self {
                fg: Color::Gray,
                bg: Color::Black,
                accent: Color::Cyan,
                muted: Color::DarkGray,
                error: Color::LightRed,
            },
        }
    }

    fn base(self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }
}

/// Formats a 0-10 rating with one decimal, `--` when absent.
fn fmt_rating(vote: Option<f64>) -> String {
    vote.map_or_else(|| String::from("--"), |v| format!("{v:.1}"))
}

/// Renders the page bar, e.g. `‹ 2 3 [4] 5 6 ›`.
fn page_bar(window: &PaginationWindow, palette: Palette) -> Line<'static> {
    if window.is_hidden() {
        return Line::default();
    }
    let mut spans = Vec::new();
    let arrow_style = |enabled: bool| {
        if enabled {
            Style::default().fg(palette.accent)
        } else {
            Style::default().fg(palette.muted)
        }
    };
    spans.push(Span::styled("‹ ", arrow_style(window.previous().is_some())));
    for page in &window.pages {
        if *page == window.current_page {
            spans.push(Span::styled(
                format!("[{page}] "),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(format!("{page} ")));
        }
    }
    spans.push(Span::styled("›", arrow_style(window.next().is_some())));
    spans.push(Span::styled(
        format!("  of {}", window.total_pages),
        Style::default().fg(palette.muted),
    ));
    Line::from(spans)
}

/// Draws the browser UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &mut BrowserState) {
    let palette = Palette::for_theme(state.theme);
    frame.render_widget(Block::default().style(palette.base()), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search input + filter
            Constraint::Min(5),    // main content
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], state, palette);
    match &state.detail {
        Some(detail) => draw_detail(frame, chunks[1], detail, palette),
        None => draw_movie_list(frame, chunks[1], state, palette),
    }
    draw_footer(frame, chunks[2], state, palette);

    if state.input_mode == InputMode::Search {
        draw_preview(frame, chunks[1], state, palette);
    }
}

/// Draws the search input and the active filter.
#[allow(clippy::indexing_slicing)]
fn draw_header(frame: &mut Frame, area: Rect, state: &BrowserState, palette: Palette) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let input_style = if state.input_mode == InputMode::Search {
        Style::default().fg(palette.accent)
    } else {
        Style::default()
    };
    let input = Paragraph::new(state.search_input.as_str())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(" Search: / "));
    frame.render_widget(input, header_chunks[0]);

    let mut label = state.filter_label();
    if state.list.total_results() > 0 {
        label.push_str(&format!("  ({} movies)", state.list.total_results()));
    }
    let filter = Paragraph::new(label).block(Block::default().borders(Borders::ALL).title(" CineLite "));
    frame.render_widget(filter, header_chunks[1]);
}

/// Draws the movie table, or the loading/error/empty message when there
/// is nothing to list. Errors next to listed movies go to the footer.
fn draw_movie_list(frame: &mut Frame, area: Rect, state: &mut BrowserState, palette: Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(" Movies ");

    if state.list.items().is_empty() {
        if let Some(error) = state.list.error() {
            let message = Paragraph::new(error)
                .style(Style::default().fg(palette.error))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(message, area);
            return;
        }
        let text = if state.list.is_loading() {
            "Loading..."
        } else {
            "No movies found."
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let header = Row::new(vec!["Title", "Year", "Rating"])
        .style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let rows: Vec<Row> = state
        .list
        .items()
        .iter()
        .map(|m| {
            Row::new(vec![
                m.title.clone(),
                m.release_year()
                    .map_or_else(|| String::from("----"), |y| y.to_string()),
                fmt_rating(m.vote_average),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(30),
        Constraint::Length(6),
        Constraint::Length(7),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(table, area, &mut state.table_state);
}

/// Draws the details pane.
fn draw_detail(frame: &mut Frame, area: Rect, detail: &DetailView, palette: Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(" Details ");
    let paragraph = match detail {
        DetailView::Loading(id) => Paragraph::new(format!("Loading movie {id}...")),
        DetailView::Failed(message) => {
            Paragraph::new(message.as_str()).style(Style::default().fg(palette.error))
        }
        DetailView::Loaded(movie) => Paragraph::new(detail_lines(movie, palette)),
    };
    frame.render_widget(paragraph.wrap(Wrap { trim: true }).block(block), area);
}

fn detail_lines(movie: &MovieDetail, palette: Palette) -> Vec<Line<'static>> {
    let label = |name: &'static str| Span::styled(name, Style::default().fg(palette.muted));
    let year = movie
        .release_year()
        .map_or_else(String::new, |y| format!(" ({y})"));
    let genres = movie
        .genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        Line::from(Span::styled(
            format!("{}{year}", movie.title),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![label("Rating:   "), Span::raw(fmt_rating(movie.vote_average))]),
        Line::from(vec![
            label("Runtime:  "),
            Span::raw(
                movie
                    .runtime
                    .map_or_else(|| String::from("--"), |r| format!("{r} min")),
            ),
        ]),
        Line::from(vec![label("Genres:   "), Span::raw(genres)]),
        Line::from(vec![
            label("Homepage: "),
            Span::raw(movie.homepage.clone().unwrap_or_else(|| String::from("--"))),
        ]),
        Line::from(vec![
            label("Poster:   "),
            Span::raw(
                image_url(movie.poster_path.as_deref(), POSTER_SIZE)
                    .unwrap_or_else(|| String::from("--")),
            ),
        ]),
        Line::default(),
        Line::from(
            movie
                .overview
                .clone()
                .unwrap_or_else(|| String::from("No overview available.")),
        ),
    ]
}

/// Draws the quick search preview as an overlay at the top of `area`.
fn draw_preview(frame: &mut Frame, area: Rect, state: &BrowserState, palette: Palette) {
    let preview = &state.preview;
    let mut lines: Vec<Line> = match preview.phase {
        SearchPhase::Idle => vec![Line::from(Span::styled(
            "Type at least 2 characters",
            Style::default().fg(palette.muted),
        ))],
        SearchPhase::Pending | SearchPhase::Loading if preview.results.is_empty() => {
            vec![Line::from("Searching...")]
        }
        SearchPhase::Failed => vec![Line::from("No results.")],
        SearchPhase::Ready if preview.results.is_empty() => vec![Line::from("No results.")],
        _ => Vec::new(),
    };
    for (i, movie) in preview.results.iter().enumerate() {
        let year = movie
            .release_year()
            .map_or_else(String::new, |y| format!(" ({y})"));
        let style = if state.preview_cursor == Some(i) {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!("{}{year}", movie.title), style)));
    }

    let height = u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(area.height);
    let popup = Rect {
        x: area.x,
        y: area.y,
        width: area.width.min(60),
        height,
    };
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(" Quick search ");
    frame.render_widget(Paragraph::new(lines).style(palette.base()).block(block), popup);
}

/// Draws the page bar and key help.
fn draw_footer(frame: &mut Frame, area: Rect, state: &BrowserState, palette: Palette) {
    let mut lines = Vec::new();
    let position = match state.list.mode() {
        PageMode::Replace => page_bar(&state.list.window(), palette),
        PageMode::Append => {
            let more = if state.list.is_loading_more() {
                String::from("loading more...")
            } else if state.list.current_page() < state.list.total_pages() {
                String::from("m: load more")
            } else {
                String::from("all pages loaded")
            };
            Line::from(format!(
                "{} movies shown, page {}/{}  {more}",
                state.list.items().len(),
                state.list.current_page(),
                state.list.total_pages()
            ))
        }
    };
    lines.push(position);

    let help = match (state.input_mode, state.detail.is_some()) {
        (InputMode::Search, _) => "Enter: search / open  Up/Down: pick  Esc: cancel",
        (InputMode::Normal, true) => "o: open homepage  Esc: back  t: theme  q: quit",
        (InputMode::Normal, false) => {
            "/: search  ←/→ 1-9: pages  g: genre  p/r/u: lists  d: details  t: theme  q: quit"
        }
    };
    let help_line = state.notice().map_or_else(
        || Line::from(Span::styled(help, Style::default().fg(palette.muted))),
        |notice| {
            Line::from(Span::styled(
                notice.to_owned(),
                Style::default().fg(palette.error),
            ))
        },
    );
    lines.push(help_line);

    frame.render_widget(Paragraph::new(lines), area);
}
