//! Paged movie list with page replacement or incremental "load more".

use std::collections::HashSet;

use cinelite_api::tmdb::{FetchError, MovieListing, MovieSummary, ResultPage, TmdbApi};
use tracing::{debug, warn};

use crate::messages::describe_fetch_error;
use crate::pagination::{PaginationWindow, clamp_total_pages};

/// What the list is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListFilter {
    /// No filter: popular movies.
    #[default]
    Popular,
    /// Free-text search.
    Text(String),
    /// Movies of one genre.
    Genre(u32),
    /// Top rated movies.
    TopRated,
    /// Upcoming releases.
    Upcoming,
}

impl ListFilter {
    /// Listing to fetch, or `None` when the filter matches nothing
    /// (a blank text query).
    #[must_use]
    pub fn listing(&self) -> Option<MovieListing> {
        match self {
            Self::Popular => Some(MovieListing::Popular),
            Self::Text(query) => {
                let query = query.trim();
                (!query.is_empty()).then(|| MovieListing::search(query))
            }
            Self::Genre(id) => Some(MovieListing::Genre { id: *id }),
            Self::TopRated => Some(MovieListing::TopRated),
            Self::Upcoming => Some(MovieListing::Upcoming),
        }
    }
}

/// How new pages are merged into the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Each page replaces the previous one.
    Replace,
    /// Pages accumulate ("load more").
    Append,
}

/// A page fetch the caller should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    generation: u64,
    listing: MovieListing,
    page: u32,
    append: bool,
}

impl PageRequest {
    /// Listing to fetch.
    #[must_use]
    pub const fn listing(&self) -> &MovieListing {
        &self.listing
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Whether the page will be appended to the current items.
    #[must_use]
    pub const fn is_append(&self) -> bool {
        self.append
    }
}

/// Paged list controller.
///
/// Requests are tagged with a generation; only the response to the most
/// recently issued request is applied.
#[derive(Debug)]
pub struct PagedList {
    mode: PageMode,
    filter: ListFilter,
    items: Vec<MovieSummary>,
    current_page: u32,
    target_page: u32,
    total_pages: u32,
    total_results: u32,
    loading: bool,
    loading_more: bool,
    error: Option<String>,
    generation: u64,
}

impl PagedList {
    /// Creates an empty list showing [`ListFilter::Popular`].
    #[must_use]
    pub fn new(mode: PageMode) -> Self {
        Self {
            mode,
            filter: ListFilter::default(),
            items: Vec::new(),
            current_page: 1,
            target_page: 1,
            total_pages: 1,
            total_results: 0,
            loading: false,
            loading_more: false,
            error: None,
            generation: 0,
        }
    }

    /// Switches to `filter` and requests its first page.
    ///
    /// Page counts of the previous filter are dropped right away. Returns
    /// `None` for a blank text query; the list is emptied instead.
    pub fn set_filter(&mut self, filter: ListFilter) -> Option<PageRequest> {
        self.filter = filter;
        self.current_page = 1;
        self.target_page = 1;
        self.total_pages = 1;
        self.total_results = 0;
        let Some(listing) = self.filter.listing() else {
            self.generation = self.generation.wrapping_add(1);
            self.items.clear();
            self.loading = false;
            self.loading_more = false;
            self.error = None;
            return None;
        };
        Some(self.issue(listing, 1, false))
    }

    /// Navigates to `page` in replace mode.
    ///
    /// The target is clamped to `[1, total_pages]`. Returns `None` when it
    /// is the page already shown or requested, or the list is in append mode.
    pub fn go_to_page(&mut self, page: u32) -> Option<PageRequest> {
        if self.mode != PageMode::Replace {
            return None;
        }
        let target = page.clamp(1, self.total_pages);
        if target == self.target_page {
            return None;
        }
        let listing = self.filter.listing()?;
        Some(self.issue(listing, target, false))
    }

    /// Requests the page after the one shown or already requested.
    pub fn next_page(&mut self) -> Option<PageRequest> {
        self.go_to_page(self.target_page.saturating_add(1))
    }

    /// Requests the page before the one shown or already requested.
    pub fn previous_page(&mut self) -> Option<PageRequest> {
        self.go_to_page(self.target_page.saturating_sub(1))
    }

    /// Requests the next page for appending.
    ///
    /// Returns `None` outside append mode, on the last page, or while a
    /// load is already in flight.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.mode != PageMode::Append || self.is_busy() {
            return None;
        }
        if self.current_page >= self.total_pages {
            return None;
        }
        let listing = self.filter.listing()?;
        let page = self.current_page.saturating_add(1);
        Some(self.issue(listing, page, true))
    }

    /// Re-requests the last successfully loaded page (the first page in
    /// append mode).
    ///
    /// A page jump that failed is not retried; the list goes back to the
    /// page it was showing before the jump.
    pub fn reload(&mut self) -> Option<PageRequest> {
        let listing = self.filter.listing()?;
        let page = match self.mode {
            PageMode::Replace => self.current_page,
            PageMode::Append => 1,
        };
        Some(self.issue(listing, page, false))
    }

    fn issue(&mut self, listing: MovieListing, page: u32, append: bool) -> PageRequest {
        self.generation = self.generation.wrapping_add(1);
        if append {
            self.loading_more = true;
        } else {
            self.loading = true;
            self.target_page = page;
        }
        self.error = None;
        debug!(listing = listing.path(), page, append, "page requested");
        PageRequest {
            generation: self.generation,
            listing,
            page,
            append,
        }
    }

    /// Applies the response to `request`. Returns `false` when a newer
    /// request has superseded it and the response was dropped.
    pub fn complete(&mut self, request: &PageRequest, result: Result<ResultPage, FetchError>) -> bool {
        if request.generation != self.generation {
            debug!(
                listing = request.listing.path(),
                page = request.page,
                "discarding stale page response"
            );
            return false;
        }
        self.loading = false;
        self.loading_more = false;

        match result {
            Ok(page) => {
                self.total_pages = clamp_total_pages(page.total_pages);
                self.total_results = page.total_results;
                self.current_page = request.page.min(self.total_pages);
                self.target_page = self.current_page;
                if request.append {
                    let known: HashSet<u64> = self.items.iter().map(|m| m.id).collect();
                    self.items
                        .extend(page.items.into_iter().filter(|m| !known.contains(&m.id)));
                } else {
                    self.items = page.items;
                }
                self.error = None;
            }
            Err(e) => {
                warn!(
                    listing = request.listing.path(),
                    page = request.page,
                    error = %e,
                    "page fetch failed"
                );
                self.error = Some(describe_fetch_error(&e));
                self.target_page = self.current_page;
                if !request.append {
                    self.items.clear();
                    self.total_results = 0;
                }
            }
        }
        true
    }

    /// Performs `request` against `api` and applies the response.
    pub async fn fetch<A: TmdbApi>(&mut self, api: &A, request: PageRequest) -> bool {
        let result = api.fetch_page(&request.listing, request.page).await;
        self.complete(&request, result)
    }

    /// Page-number window for the current position.
    #[must_use]
    pub fn window(&self) -> PaginationWindow {
        PaginationWindow::new(self.current_page, self.total_pages)
    }

    /// Whether any request is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.loading || self.loading_more
    }

    /// Merge mode chosen at construction.
    #[must_use]
    pub const fn mode(&self) -> PageMode {
        self.mode
    }

    /// Active filter.
    #[must_use]
    pub const fn filter(&self) -> &ListFilter {
        &self.filter
    }

    /// Movies currently shown.
    #[must_use]
    pub fn items(&self) -> &[MovieSummary] {
        &self.items
    }

    /// Last successfully loaded page.
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Page of the pending replacing request, or the current page when
    /// none is in flight.
    #[must_use]
    pub const fn target_page(&self) -> u32 {
        self.target_page
    }

    /// Number of pages, at most 500.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Total number of matching movies as reported upstream.
    #[must_use]
    pub const fn total_results(&self) -> u32 {
        self.total_results
    }

    /// A replacing load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// An appending load is in flight.
    #[must_use]
    pub const fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    /// Message describing the last failure.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
