//! Browsing controllers for cinelite.
//!
//! Everything here is independent of the terminal front end: the
//! controllers hold state and decide which requests to issue, and the
//! caller performs the I/O against a [`cinelite_api::tmdb::TmdbApi`].

/// User-facing error messages.
pub mod messages;
/// Paged list controller (page replacement and "load more").
pub mod paged_list;
/// Windowed pagination calculator.
pub mod pagination;
/// Debounced search-as-you-type controller.
pub mod quick_search;
/// Theme preference.
pub mod theme;

#[cfg(test)]
pub(crate) mod testing;
