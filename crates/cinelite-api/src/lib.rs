//! TMDB gateway for cinelite.
//!
//! Wraps the TMDB v3 REST endpoints the browser needs (search, discover,
//! curated listings, details, genres) and normalizes their responses.

/// TMDB API client.
pub mod tmdb;
