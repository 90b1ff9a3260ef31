//! TMDB wire types and the normalized shapes handed to callers.

use std::hash::{Hash, Hasher};

use serde::Deserialize;

use super::error::FetchError;

/// Highest vote average TMDB reports.
const MAX_VOTE_AVERAGE: f64 = 10.0;

// --- Listings ---

/// A paged movie listing the gateway can fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MovieListing {
    /// `movie/popular`.
    Popular,
    /// `movie/top_rated`.
    TopRated,
    /// `movie/upcoming`.
    Upcoming,
    /// `search/movie?query=`.
    Search {
        /// Free-text query, passed through as given.
        query: String,
    },
    /// `discover/movie?with_genres=`.
    Genre {
        /// TMDB genre ID.
        id: u32,
    },
}

impl MovieListing {
    /// Shorthand for [`MovieListing::Search`].
    pub fn search(query: impl Into<String>) -> Self {
        Self::Search {
            query: query.into(),
        }
    }

    /// Endpoint path relative to the API base URL.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Popular => "movie/popular",
            Self::TopRated => "movie/top_rated",
            Self::Upcoming => "movie/upcoming",
            Self::Search { .. } => "search/movie",
            Self::Genre { .. } => "discover/movie",
        }
    }

    /// Listing-specific query parameters (page and credential excluded).
    pub(crate) fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Popular | Self::TopRated | Self::Upcoming => Vec::new(),
            Self::Search { query } => vec![("query", query.clone())],
            Self::Genre { id } => vec![("with_genres", id.to_string())],
        }
    }
}

// --- Normalized types ---

/// One page of movie summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    /// Movies on this page, in upstream order.
    pub items: Vec<MovieSummary>,
    /// Page number (>= 1).
    pub page: u32,
    /// Total number of pages as reported upstream (>= 1, not clamped).
    pub total_pages: u32,
    /// Total number of matching movies.
    pub total_results: u32,
}

/// Summary of a movie as shown in lists.
///
/// Two summaries are equal when their `id`s are equal.
#[derive(Debug, Clone)]
pub struct MovieSummary {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Poster image path (feed to [`super::image_url`]).
    pub poster_path: Option<String>,
    /// Release date, `YYYY-MM-DD` or a prefix of it.
    pub release_date: Option<String>,
    /// Vote average in `[0, 10]`.
    pub vote_average: Option<f64>,
}

impl MovieSummary {
    /// Release year, when the release date starts with one.
    #[must_use]
    pub fn release_year(&self) -> Option<u16> {
        release_year(self.release_date.as_deref())
    }
}

impl PartialEq for MovieSummary {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MovieSummary {}

impl Hash for MovieSummary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Full movie details.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Synopsis.
    pub overview: Option<String>,
    /// Genres.
    pub genres: Vec<Genre>,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Vote average in `[0, 10]`.
    pub vote_average: Option<f64>,
    /// Official site.
    pub homepage: Option<String>,
    /// Release date.
    pub release_date: Option<String>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
}

impl MovieDetail {
    /// Release year, when the release date starts with one.
    #[must_use]
    pub fn release_year(&self) -> Option<u16> {
        release_year(self.release_date.as_deref())
    }
}

/// Genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Genre {
    /// Genre ID.
    pub id: u32,
    /// Localized genre name.
    pub name: String,
}

// --- Wire types ---

/// Body of every paged movie endpoint.
///
/// Every field is optional so that shape problems surface as a
/// [`FetchError`] from [`TmdbPagedResponse::normalize`] instead of a decode panic deep in serde.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbPagedResponse {
    pub page: Option<u32>,
    pub results: Option<Vec<TmdbMovieResult>>,
    pub total_pages: Option<u32>,
    pub total_results: Option<u32>,
}

/// A single movie inside a paged response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbMovieResult {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
}

/// Body of `movie/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbMovieDetails {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub homepage: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
}

/// Body of `genre/movie/list`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbGenreList {
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
}

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
}

impl TmdbPagedResponse {
    /// Validates the body into a [`ResultPage`].
    ///
    /// `requested_page` stands in when the body omits `page`.
    pub(crate) fn normalize(self, requested_page: u32) -> Result<ResultPage, FetchError> {
        let results = self
            .results
            .ok_or_else(|| FetchError::malformed("response has no results array"))?;

        Ok(ResultPage {
            items: results.into_iter().map(MovieSummary::from).collect(),
            page: self.page.unwrap_or(requested_page).max(1),
            total_pages: self.total_pages.unwrap_or(1).max(1),
            total_results: self.total_results.unwrap_or(0),
        })
    }
}

impl From<TmdbMovieResult> for MovieSummary {
    fn from(raw: TmdbMovieResult) -> Self {
        Self {
            id: raw.id,
            title: pick_title(raw.title, raw.original_title),
            poster_path: non_empty(raw.poster_path),
            release_date: non_empty(raw.release_date),
            vote_average: vote_in_range(raw.vote_average),
        }
    }
}

impl From<TmdbMovieDetails> for MovieDetail {
    fn from(raw: TmdbMovieDetails) -> Self {
        Self {
            id: raw.id,
            title: pick_title(raw.title, raw.original_title),
            overview: non_empty(raw.overview),
            genres: raw.genres.unwrap_or_default(),
            poster_path: non_empty(raw.poster_path),
            vote_average: vote_in_range(raw.vote_average),
            homepage: non_empty(raw.homepage),
            release_date: non_empty(raw.release_date),
            runtime: raw.runtime.filter(|&m| m > 0),
        }
    }
}

impl From<TmdbGenreList> for Vec<Genre> {
    fn from(raw: TmdbGenreList) -> Self {
        raw.genres.unwrap_or_default()
    }
}

/// Localized title, falling back to the original title.
fn pick_title(title: Option<String>, original_title: Option<String>) -> String {
    non_empty(title)
        .or_else(|| non_empty(original_title))
        .unwrap_or_default()
}

/// TMDB sends `""` where it means "absent".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn vote_in_range(value: Option<f64>) -> Option<f64> {
    value.filter(|v| (0.0..=MAX_VOTE_AVERAGE).contains(v))
}

fn release_year(date: Option<&str>) -> Option<u16> {
    date?.get(..4)?.parse().ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_listing_paths() {
        // Arrange & Act & Assert
        assert_eq!(MovieListing::Popular.path(), "movie/popular");
        assert_eq!(MovieListing::TopRated.path(), "movie/top_rated");
        assert_eq!(MovieListing::Upcoming.path(), "movie/upcoming");
        assert_eq!(MovieListing::search("bat").path(), "search/movie");
        assert_eq!(MovieListing::Genre { id: 28 }.path(), "discover/movie");
    }

    #[test]
    fn test_listing_query_params() {
        // Arrange & Act
        let search = MovieListing::search("bat").query_params();
        let genre = MovieListing::Genre { id: 28 }.query_params();

        // Assert
        assert_eq!(search, vec![("query", String::from("bat"))]);
        assert_eq!(genre, vec![("with_genres", String::from("28"))]);
        assert!(MovieListing::Popular.query_params().is_empty());
    }

    #[test]
    fn test_parse_search_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/search_movie_batman.json");

        // Act
        let raw: TmdbPagedResponse = serde_json::from_str(json).unwrap();
        let page = raw.normalize(1).unwrap();

        // Assert
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 9);
        assert_eq!(page.total_results, 167);
        assert_eq!(page.items.len(), 7);
        assert_eq!(page.items[0].id, 268);
        assert_eq!(page.items[0].title, "Batman");
        assert_eq!(page.items[0].release_year(), Some(1989));
    }

    #[test]
    fn test_normalize_missing_results_is_upstream_error() {
        // Arrange
        let raw: TmdbPagedResponse =
            serde_json::from_str(r#"{"page":1,"total_pages":3,"total_results":50}"#).unwrap();

        // Act
        let err = raw.normalize(1).unwrap_err();

        // Assert
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("no results array"));
    }

    #[test]
    fn test_normalize_null_results_is_upstream_error() {
        // Arrange
        let raw: TmdbPagedResponse = serde_json::from_str(r#"{"results":null}"#).unwrap();

        // Act & Assert
        assert!(raw.normalize(1).is_err());
    }

    #[test]
    fn test_non_array_results_fail_to_decode() {
        // Arrange & Act
        let parsed = serde_json::from_str::<TmdbPagedResponse>(r#"{"results":{"id":1}}"#);

        // Assert
        assert!(parsed.is_err());
    }

    #[test]
    fn test_normalize_fills_missing_counters() {
        // Arrange
        let raw: TmdbPagedResponse =
            serde_json::from_str(r#"{"results":[],"total_pages":0}"#).unwrap();

        // Act
        let page = raw.normalize(4).unwrap();

        // Assert
        assert_eq!(page.page, 4);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_results, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_summary_normalization() {
        // Arrange
        let raw: TmdbMovieResult = serde_json::from_str(
            r#"{"id":42,"title":"","original_title":"Orig","poster_path":"","release_date":"","vote_average":11.5}"#,
        )
        .unwrap();

        // Act
        let summary = MovieSummary::from(raw);

        // Assert
        assert_eq!(summary.title, "Orig");
        assert_eq!(summary.poster_path, None);
        assert_eq!(summary.release_date, None);
        assert_eq!(summary.vote_average, None);
        assert_eq!(summary.release_year(), None);
    }

    #[test]
    fn test_summary_identity_is_id() {
        // Arrange
        let a = MovieSummary {
            id: 7,
            title: String::from("A"),
            poster_path: None,
            release_date: None,
            vote_average: Some(5.0),
        };
        let b = MovieSummary {
            id: 7,
            title: String::from("B"),
            poster_path: Some(String::from("/b.jpg")),
            release_date: Some(String::from("2001")),
            vote_average: None,
        };

        // Act
        let set: HashSet<MovieSummary> = [a.clone(), b.clone()].into_iter().collect();

        // Assert
        assert_eq!(a, b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_parse_details_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_details_550.json");

        // Act
        let raw: TmdbMovieDetails = serde_json::from_str(json).unwrap();
        let detail = MovieDetail::from(raw);

        // Assert
        assert_eq!(detail.id, 550);
        assert_eq!(detail.title, "Clube da Luta");
        assert_eq!(detail.genres.len(), 1);
        assert_eq!(detail.genres[0].name, "Drama");
        assert_eq!(detail.runtime, Some(139));
        assert_eq!(detail.release_year(), Some(1999));
        assert!(detail.homepage.is_some());
    }

    #[test]
    fn test_details_empty_homepage_is_none() {
        // Arrange
        let raw: TmdbMovieDetails =
            serde_json::from_str(r#"{"id":1,"title":"X","homepage":"","runtime":0}"#).unwrap();

        // Act
        let detail = MovieDetail::from(raw);

        // Assert
        assert_eq!(detail.homepage, None);
        assert_eq!(detail.runtime, None);
        assert!(detail.genres.is_empty());
    }

    #[test]
    fn test_genre_list_missing_is_empty() {
        // Arrange
        let raw: TmdbGenreList = serde_json::from_str("{}").unwrap();

        // Act
        let genres: Vec<Genre> = raw.into();

        // Assert
        assert!(genres.is_empty());
    }

    #[test]
    fn test_parse_error_response() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/error_invalid_api_key.json");

        // Act
        let error: TmdbErrorResponse = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(error.status_code, 7);
        assert!(error.status_message.contains("Invalid API key"));
    }
}
