//! Turns gateway failures into text for the full-page views.

use cinelite_api::tmdb::FetchError;

/// Shown when TMDB rejects (or never received) the credential.
pub const CREDENTIAL_MESSAGE: &str =
    "Authentication error (HTTP 401): check the TMDB credential in TMDB_API_KEY or TMDB_API_TOKEN";

/// Describes a failed fetch for the user.
///
/// HTTP 401 gets a credential-specific message; everything else a generic
/// one carrying the cause.
#[must_use]
pub fn describe_fetch_error(err: &FetchError) -> String {
    if err.is_unauthorized() {
        return String::from(CREDENTIAL_MESSAGE);
    }
    format!("Could not load movies. Try again. ({err})")
}
