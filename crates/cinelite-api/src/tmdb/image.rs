//! Poster and backdrop URLs.

/// Base URL of the TMDB image CDN.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Poster size used by list and detail views.
pub const POSTER_SIZE: &str = "w500";

/// Builds the CDN URL for an image path returned by the API.
///
/// Returns `None` when the movie has no image.
#[must_use]
pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    Some(format!("{IMAGE_BASE_URL}{size}{path}"))
}
