//! Light/dark theme preference with write-through persistence.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Persisted name (`"light"` / `"dark"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Storage for the persisted theme.
pub trait PreferenceStore {
    /// Reads the stored theme, `None` when nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self) -> Result<Option<Theme>>;

    /// Stores `theme`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&mut self, theme: Theme) -> Result<()>;
}

/// Current theme plus the store it is persisted in.
#[derive(Debug)]
pub struct ThemeSettings<S> {
    store: S,
    theme: Theme,
}

impl<S: PreferenceStore> ThemeSettings<S> {
    /// Loads the stored theme, falling back to `platform_default` when none
    /// is stored or the store cannot be read.
    pub fn init(store: S, platform_default: Theme) -> Self {
        let theme = match store.load() {
            Ok(Some(theme)) => theme,
            Ok(None) => platform_default,
            Err(e) => {
                warn!(error = %e, "failed to read theme preference; using platform default");
                platform_default
            }
        };
        debug!(theme = theme.as_str(), "theme initialized");
        Self { store, theme }
    }

    /// Active theme.
    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether the dark theme is active.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    /// Flips the theme and persists the new value.
    ///
    /// The in-memory theme flips even if persisting fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn toggle(&mut self) -> Result<Theme> {
        self.theme = self.theme.toggled();
        self.store.save(self.theme)?;
        Ok(self.theme)
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

/// Guesses the terminal's theme from a `COLORFGBG` value such as `"15;0"`.
///
/// Background colors 0-6 and 8 are dark; anything else, including a
/// missing or unparsable value, maps to [`Theme::Light`].
#[must_use]
pub fn theme_from_colorfgbg(value: Option<&str>) -> Theme {
    let background = value
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok());
    match background {
        Some(0..=6 | 8) => Theme::Dark,
        _ => Theme::Light,
    }
}
