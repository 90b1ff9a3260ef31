//! `TmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::FetchError;
use super::types::{Genre, MovieDetail, MovieListing, ResultPage};

/// TMDB gateway trait.
///
/// Abstracts the remote calls so controllers can be driven by a mock in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TmdbApi: Send)]
pub trait LocalTmdbApi {
    /// Fetches one page of a movie listing.
    ///
    /// `page` is passed through as given; range checks belong to the caller.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on transport failure, non-2xx status, or a
    /// body that cannot be normalized into a [`ResultPage`].
    async fn fetch_page(&self, listing: &MovieListing, page: u32)
    -> Result<ResultPage, FetchError>;

    /// Searches movies by title.
    ///
    /// # Errors
    ///
    /// Same as [`LocalTmdbApi::fetch_page`].
    async fn search(&self, query: &str, page: u32) -> Result<ResultPage, FetchError>;

    /// Discovers movies of one genre.
    ///
    /// # Errors
    ///
    /// Same as [`LocalTmdbApi::fetch_page`].
    async fn discover_by_genre(&self, genre_id: u32, page: u32)
    -> Result<ResultPage, FetchError>;

    /// Fetches the details of one movie.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the HTTP request or JSON parsing fails.
    async fn details(&self, movie_id: u64) -> Result<MovieDetail, FetchError>;

    /// Lists the movie genres.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the HTTP request or JSON parsing fails.
    async fn genres(&self) -> Result<Vec<Genre>, FetchError>;
}
