//! Theme persistence in `config.toml`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cinelite_core::theme::{PreferenceStore, Theme};

use super::AppConfig;

/// Stores the theme under `[ui] theme`, leaving the rest of the file intact.
#[derive(Debug, Clone)]
pub struct TomlThemeStore {
    path: PathBuf,
}

impl TomlThemeStore {
    /// Creates a store backed by the config file at `path`.
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PreferenceStore for TomlThemeStore {
    fn load(&self) -> Result<Option<Theme>> {
        let config = AppConfig::load(&self.path).context("failed to load config")?;
        Ok(config.ui.theme)
    }

    fn save(&mut self, theme: Theme) -> Result<()> {
        let mut config = AppConfig::load(&self.path).context("failed to load config")?;
        config.ui.theme = Some(theme);
        config.save(&self.path).context("failed to save config")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use cinelite_core::theme::ThemeSettings;

    use super::*;

    #[test]
    fn test_toggle_persists_and_keeps_other_settings() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tmdb]\nlanguage = \"en-US\"\n").unwrap();
        let mut settings = ThemeSettings::init(TomlThemeStore::new(path.clone()), Theme::Light);

        // Act
        settings.toggle().unwrap();

        // Assert
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.ui.theme, Some(Theme::Dark));
        assert_eq!(config.tmdb.language, "en-US");
    }

    #[test]
    fn test_stored_theme_wins_over_platform_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\ntheme = \"dark\"\n").unwrap();

        // Act
        let settings = ThemeSettings::init(TomlThemeStore::new(path), Theme::Light);

        // Assert
        assert_eq!(settings.theme(), Theme::Dark);
    }
}
