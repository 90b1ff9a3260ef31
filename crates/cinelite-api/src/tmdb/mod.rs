//! TMDB API client module.
//!
//! Sends requests to the TMDB v3 movie endpoints and normalizes
//! listings, details, and genres into strict shapes.

mod api;
mod client;
mod error;
mod image;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{Credential, DEFAULT_LANGUAGE, TmdbClient, TmdbClientBuilder};
pub use error::FetchError;
pub use image::{IMAGE_BASE_URL, POSTER_SIZE, image_url};
pub use types::{Genre, MovieDetail, MovieListing, MovieSummary, ResultPage};
