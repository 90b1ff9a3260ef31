//! `TmdbClient` - TMDB API client implementation.

use std::fmt;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::api::TmdbApi;
use super::error::FetchError;
use super::types::{
    Genre, MovieDetail, MovieListing, ResultPage, TmdbErrorResponse, TmdbGenreList,
    TmdbMovieDetails, TmdbPagedResponse,
};

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default response language.
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// How requests authenticate against TMDB.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// v3 API key, sent as the `api_key` query parameter.
    ApiKey(String),
    /// v4 read access token, sent as `Authorization: Bearer`.
    BearerToken(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Self::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
        }
    }
}

/// TMDB API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Credential injected into every request, if configured.
    credential: Option<Credential>,
    /// `language` query parameter.
    language: String,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    credential: Option<Credential>,
    language: Option<String>,
    user_agent: Option<String>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            credential: None,
            language: None,
            user_agent: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Authenticates with a v3 API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.credential = Some(Credential::ApiKey(key.into()));
        self
    }

    /// Authenticates with a v4 bearer token.
    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.credential = Some(Credential::BearerToken(token.into()));
        self
    }

    /// Sets or clears the credential.
    #[must_use]
    pub fn credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    /// Sets the response language (default: `pt-BR`).
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// A missing credential is not an error: the client is built, a warning
    /// is logged, and TMDB will answer every request with HTTP 401.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        if self.credential.is_none() {
            tracing::warn!("TMDB credential is not set; requests will fail with HTTP 401");
        }

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            base_url,
            credential: self.credential,
            language: self
                .language
                .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE)),
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Whether a credential is configured.
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Sends a GET request with credential, locale, and the given query params.
    #[instrument(skip_all, fields(path = %path))]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<T, FetchError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|source| FetchError::InvalidUrl {
                path: String::from(path),
                source,
            })?;

        query.push(("language", self.language.clone()));
        let mut request = self.http_client.get(url);
        match &self.credential {
            Some(Credential::ApiKey(key)) => query.push(("api_key", key.clone())),
            Some(Credential::BearerToken(token)) => request = request.bearer_auth(token),
            None => {}
        }

        tracing::debug!(params = query.len(), "TMDB API request");

        let response = request
            .query(&query)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                path: String::from(path),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            let detail = serde_json::from_str::<TmdbErrorResponse>(&body).map_or(body, |e| {
                format!("code={}, message={}", e.status_code, e.status_message)
            });
            tracing::debug!(%status, "TMDB API returned an error status");
            return Err(FetchError::http(
                status.as_u16(),
                format!("HTTP {status}: {detail}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Network {
                path: String::from(path),
                source,
            })?;
        serde_json::from_str(&body)
            .map_err(|e| FetchError::malformed(format!("failed to decode {path}: {e}")))
    }
}

impl TmdbApi for TmdbClient {
    #[instrument(skip_all, fields(listing = listing.path(), page = page))]
    async fn fetch_page(
        &self,
        listing: &MovieListing,
        page: u32,
    ) -> Result<ResultPage, FetchError> {
        let mut query = listing.query_params();
        query.push(("page", page.to_string()));

        let raw: TmdbPagedResponse = self.get_json(listing.path(), query).await?;
        raw.normalize(page)
    }

    async fn search(&self, query: &str, page: u32) -> Result<ResultPage, FetchError> {
        self.fetch_page(&MovieListing::search(query), page).await
    }

    async fn discover_by_genre(
        &self,
        genre_id: u32,
        page: u32,
    ) -> Result<ResultPage, FetchError> {
        self.fetch_page(&MovieListing::Genre { id: genre_id }, page)
            .await
    }

    #[instrument(skip_all, fields(movie_id = movie_id))]
    async fn details(&self, movie_id: u64) -> Result<MovieDetail, FetchError> {
        let path = format!("movie/{movie_id}");
        let raw: TmdbMovieDetails = self.get_json(&path, Vec::new()).await?;
        Ok(raw.into())
    }

    #[instrument(skip_all)]
    async fn genres(&self) -> Result<Vec<Genre>, FetchError> {
        let raw: TmdbGenreList = self.get_json("genre/movie/list", Vec::new()).await?;
        Ok(raw.into())
    }
}
