//! Application configuration module.
//!
//! Manages the TOML config file holding the TMDB response language and
//! the persisted UI theme.

#[allow(clippy::module_inception)]
mod config;
mod paths;
mod theme_store;

#[allow(clippy::module_name_repetitions)]
pub use config::AppConfig;
pub use paths::resolve_config_path;
pub use theme_store::TomlThemeStore;
