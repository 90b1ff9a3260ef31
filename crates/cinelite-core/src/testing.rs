//! Scripted gateway shared by the controller tests.

#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    missing_debug_implementations
)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use cinelite_api::tmdb::{
    FetchError, Genre, MovieDetail, MovieListing, MovieSummary, ResultPage, TmdbApi,
};

/// Items returned per page.
pub const PAGE_SIZE: u64 = 4;

/// Gateway returning synthetic pages and recording every call.
///
/// Items on page `p` carry ids `p * 100 ..`, so appended pages never
/// collide unless a test asks for it.
pub struct MockTmdbApi {
    calls: Mutex<Vec<(String, u32)>>,
    delays: HashMap<String, Duration>,
    total_pages: u32,
    fail_status: AtomicU16,
}

impl MockTmdbApi {
    pub fn new(total_pages: u32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            delays: HashMap::new(),
            total_pages,
            fail_status: AtomicU16::new(0),
        }
    }

    /// Delays every response for `key` (see [`listing_key`]).
    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(String::from(key), delay);
        self
    }

    /// Makes subsequent calls fail with the given HTTP status; 0 restores success.
    pub fn fail_with(&self, status: u16) {
        self.fail_status.store(status, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }

    fn page_for(&self, key: &str, page: u32) -> ResultPage {
        let base = u64::from(page) * 100;
        let items = (0..PAGE_SIZE)
            .map(|i| MovieSummary {
                id: base + i,
                title: format!("{key} #{}", base + i),
                poster_path: None,
                release_date: None,
                vote_average: None,
            })
            .collect();
        ResultPage {
            items,
            page,
            total_pages: self.total_pages,
            total_results: self.total_pages * 4,
        }
    }

    async fn respond(&self, key: String, page: u32) -> Result<ResultPage, FetchError> {
        self.calls.lock().unwrap().push((key.clone(), page));
        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        match self.fail_status.load(Ordering::SeqCst) {
            0 => Ok(self.page_for(&key, page)),
            status => Err(FetchError::http(status, format!("HTTP {status}"))),
        }
    }
}

/// Key a listing is recorded under: `popular`, `search:<q>`, `genre:<id>`, ...
pub fn listing_key(listing: &MovieListing) -> String {
    match listing {
        MovieListing::Popular => String::from("popular"),
        MovieListing::TopRated => String::from("top_rated"),
        MovieListing::Upcoming => String::from("upcoming"),
        MovieListing::Search { query } => format!("search:{query}"),
        MovieListing::Genre { id } => format!("genre:{id}"),
    }
}

impl TmdbApi for MockTmdbApi {
    async fn fetch_page(
        &self,
        listing: &MovieListing,
        page: u32,
    ) -> Result<ResultPage, FetchError> {
        self.respond(listing_key(listing), page).await
    }

    async fn search(&self, query: &str, page: u32) -> Result<ResultPage, FetchError> {
        self.respond(format!("search:{query}"), page).await
    }

    async fn discover_by_genre(&self, genre_id: u32, page: u32) -> Result<ResultPage, FetchError> {
        self.respond(format!("genre:{genre_id}"), page).await
    }

    async fn details(&self, movie_id: u64) -> Result<MovieDetail, FetchError> {
        Ok(MovieDetail {
            id: movie_id,
            title: format!("movie {movie_id}"),
            overview: None,
            genres: Vec::new(),
            poster_path: None,
            vote_average: None,
            homepage: None,
            release_date: None,
            runtime: None,
        })
    }

    async fn genres(&self) -> Result<Vec<Genre>, FetchError> {
        Ok(vec![Genre {
            id: 28,
            name: String::from("Action"),
        }])
    }
}
