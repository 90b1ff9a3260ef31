//! cinelite - terminal movie discovery backed by TMDB.

/// Application configuration (TOML).
mod config;
/// Log output routing.
mod logging;
/// Terminal UI components.
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, TomlThemeStore, resolve_config_path};
use crate::logging::{BROWSER_LOG_FILE, LogOutput, divert_to_file};
use crate::tui::run_browser;
use cinelite_api::tmdb::{
    Credential, FetchError, MovieListing, POSTER_SIZE, ResultPage, TmdbApi, TmdbClient, image_url,
};
use cinelite_core::messages::describe_fetch_error;
use cinelite_core::paged_list::{ListFilter, PageMode};
use cinelite_core::pagination::clamp_total_pages;
use cinelite_core::theme::{Theme, ThemeSettings, theme_from_colorfgbg};

/// Environment variable holding a TMDB v3 API key.
const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Environment variable holding a TMDB v4 read access token.
const API_TOKEN_ENV: &str = "TMDB_API_TOKEN";

/// Version string shown by `--version`.
const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (rev:", env!("GIT_HASH"), ")");

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version = APP_VERSION)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Response language (overrides `[tmdb] language` in config.toml).
    #[arg(long, global = true)]
    language: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search movies by title.
    Search(SearchArgs),
    /// List popular movies.
    Popular(PageArgs),
    /// List top rated movies.
    TopRated(PageArgs),
    /// List upcoming movies.
    Upcoming(PageArgs),
    /// List movies of one genre.
    Discover(DiscoverArgs),
    /// Show details for one movie.
    Details(DetailsArgs),
    /// List movie genres.
    Genres,
    /// Browse movies interactively via TUI.
    Browse(BrowseArgs),
    /// Show or toggle the UI theme.
    Theme(ThemeCommand),
}

/// Page selection shared by the listing subcommands.
#[derive(clap::Args)]
struct PageArgs {
    /// Page number (1-500).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=500))]
    page: u32,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "Batman").
    #[arg(long, required = true)]
    query: String,
    /// Page selection.
    #[command(flatten)]
    page: PageArgs,
}

/// Arguments for the `discover` subcommand.
#[derive(clap::Args)]
struct DiscoverArgs {
    /// TMDB genre ID (see `genres`).
    #[arg(long, required = true)]
    genre: u32,
    /// Page selection.
    #[command(flatten)]
    page: PageArgs,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `browse` subcommand.
#[derive(clap::Args)]
struct BrowseArgs {
    /// Accumulate pages with "load more" instead of page buttons.
    #[arg(long)]
    load_more: bool,
}

/// Arguments for the `theme` subcommand.
#[derive(clap::Args)]
struct ThemeCommand {
    /// Theme subcommand to run.
    #[command(subcommand)]
    command: ThemeSubcommands,
}

/// Available theme subcommands.
#[derive(Subcommand)]
enum ThemeSubcommands {
    /// Print the active theme.
    Show,
    /// Switch between light and dark and save the choice.
    Toggle,
}

/// Reads the TMDB credential from the environment.
///
/// `TMDB_API_KEY` wins over `TMDB_API_TOKEN`; blank values are ignored.
fn credential_from_env() -> Option<Credential> {
    let read = |name: &str| {
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    };
    read(API_KEY_ENV)
        .map(Credential::ApiKey)
        .or_else(|| read(API_TOKEN_ENV).map(Credential::BearerToken))
}

/// Builds a `TmdbClient` from the environment and config.
///
/// A missing credential is not an error; requests will fail with HTTP 401.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(dir: Option<&PathBuf>, language: Option<&str>) -> Result<TmdbClient> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    let language = language.map_or(config.tmdb.language, String::from);

    TmdbClient::builder()
        .credential(credential_from_env())
        .language(language)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .context("failed to build TMDB client")
}

/// Wraps a gateway failure with the user-facing message.
fn fetch_failed(err: FetchError) -> anyhow::Error {
    let message = describe_fetch_error(&err);
    anyhow::Error::new(err).context(message)
}

/// Theme guessed from the terminal when none is saved.
fn platform_theme() -> Theme {
    theme_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

/// Loads theme settings backed by config.toml.
fn load_theme(dir: Option<&PathBuf>) -> Result<ThemeSettings<TomlThemeStore>> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    Ok(ThemeSettings::init(
        TomlThemeStore::new(config_path),
        platform_theme(),
    ))
}

/// Logs one result page as a table.
fn print_page(page: &ResultPage) {
    tracing::info!(
        "Page {}/{} ({} results)",
        page.page,
        clamp_total_pages(page.total_pages),
        page.total_results
    );
    tracing::info!("ID\tYear\tRating\tTitle");
    for movie in &page.items {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            movie.id,
            movie
                .release_year()
                .map_or_else(|| String::from("-"), |y| y.to_string()),
            movie
                .vote_average
                .map_or_else(|| String::from("-"), |v| format!("{v:.1}")),
            movie.title,
        );
    }
}

/// Runs one of the paged listing subcommands.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all, fields(listing = listing.path(), page = page))]
async fn run_listing(
    listing: MovieListing,
    page: u32,
    dir: Option<&PathBuf>,
    language: Option<&str>,
) -> Result<()> {
    let client = build_tmdb_client(dir, language)?;

    let response = client
        .fetch_page(&listing, page)
        .await
        .map_err(fetch_failed)?;

    if response.items.is_empty() {
        tracing::info!("No movies found.");
        return Ok(());
    }
    print_page(&response);

    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_details(args: &DetailsArgs, dir: Option<&PathBuf>, language: Option<&str>) -> Result<()> {
    let client = build_tmdb_client(dir, language)?;

    let movie = client.details(args.id).await.map_err(fetch_failed)?;

    tracing::info!("ID: {}", movie.id);
    tracing::info!("Title: {}", movie.title);
    tracing::info!("Release Date: {}", movie.release_date.as_deref().unwrap_or("-"));
    tracing::info!(
        "Runtime: {}",
        movie
            .runtime
            .map_or_else(|| String::from("-"), |r| format!("{r} min"))
    );
    tracing::info!(
        "Rating: {}",
        movie
            .vote_average
            .map_or_else(|| String::from("-"), |v| format!("{v:.1}"))
    );
    tracing::info!(
        "Genres: {}",
        movie
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("Homepage: {}", movie.homepage.as_deref().unwrap_or("-"));
    tracing::info!(
        "Poster: {}",
        image_url(movie.poster_path.as_deref(), POSTER_SIZE).unwrap_or_else(|| String::from("-"))
    );
    tracing::info!("---");
    tracing::info!("{}", movie.overview.as_deref().unwrap_or("No overview available."));

    Ok(())
}

/// Runs the `genres` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_genres(dir: Option<&PathBuf>, language: Option<&str>) -> Result<()> {
    let client = build_tmdb_client(dir, language)?;

    let genres = client.genres().await.map_err(fetch_failed)?;

    tracing::info!("ID\tName");
    for genre in &genres {
        tracing::info!("{}\t{}", genre.id, genre.name);
    }
    tracing::info!("Total: {} genres", genres.len());

    Ok(())
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(args: &BrowseArgs, dir: Option<&PathBuf>, language: Option<&str>) -> Result<()> {
    let client = build_tmdb_client(dir, language)?;
    let theme = load_theme(dir)?;
    let mode = if args.load_more {
        PageMode::Append
    } else {
        PageMode::Replace
    };

    let log_path = resolve_config_path(dir)?.with_file_name(BROWSER_LOG_FILE);
    let _logs = divert_to_file(&log_path);
    run_browser(Arc::new(client), mode, theme)
        .await
        .context("movie browser TUI failed")
}

/// Runs the `theme show` / `theme toggle` subcommands.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or the theme cannot be saved.
#[instrument(skip_all)]
fn run_theme(command: &ThemeSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let mut settings = load_theme(dir)?;
    match command {
        ThemeSubcommands::Show => {
            tracing::info!("Theme: {}", settings.theme().as_str());
        }
        ThemeSubcommands::Toggle => {
            let theme = settings.toggle().context("failed to save theme")?;
            tracing::info!("Theme switched to {}", theme.as_str());
        }
    }
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_writer(LogOutput)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(LogOutput);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    let language = cli.language.as_deref();
    match cli.command {
        Commands::Search(args) => match ListFilter::Text(args.query).listing() {
            Some(listing) => run_listing(listing, args.page.page, dir, language).await,
            None => {
                tracing::info!("No movies found.");
                Ok(())
            }
        },
        Commands::Popular(args) => run_listing(MovieListing::Popular, args.page, dir, language).await,
        Commands::TopRated(args) => {
            run_listing(MovieListing::TopRated, args.page, dir, language).await
        }
        Commands::Upcoming(args) => {
            run_listing(MovieListing::Upcoming, args.page, dir, language).await
        }
        Commands::Discover(args) => {
            run_listing(
                MovieListing::Genre { id: args.genre },
                args.page.page,
                dir,
                language,
            )
            .await
        }
        Commands::Details(args) => run_details(&args, dir, language).await,
        Commands::Genres => run_genres(dir, language).await,
        Commands::Browse(args) => run_browse(&args, dir, language).await,
        Commands::Theme(theme) => run_theme(&theme.command, dir),
    }
}
