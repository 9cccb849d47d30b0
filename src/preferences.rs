//! Locally persisted user state: theme selection and the signed-in session.

use crate::baas::{Session, UserSettings};
use crate::config::app_config_dir;
use crate::error::ServiceError;
use crate::theme::ThemeMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const PREFERENCES_FILE: &str = "preferences.toml";

/// State that survives between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: ThemeMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

impl Preferences {
    /// `<config_dir>/veriscan/preferences.toml`
    pub fn default_path() -> Option<PathBuf> {
        app_config_dir().map(|d| d.join(PREFERENCES_FILE))
    }

    /// Loads preferences; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No preferences at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse preferences: {}", path.display()))
    }

    /// Writes preferences, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize preferences")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write preferences: {}", path.display()))?;

        debug!("Saved preferences to {}", path.display());
        Ok(())
    }

    /// The current session, or `NotSignedIn`.
    pub fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or_else(|| ServiceError::NotSignedIn.into())
    }

    /// Adopts the remote theme when it is a valid mode. Returns whether
    /// anything changed.
    pub fn sync_from_settings(&mut self, settings: &UserSettings) -> bool {
        match settings.theme_mode() {
            Some(mode) if mode != self.theme => {
                self.theme = mode;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> Session {
        Session {
            access_token: "jwt".to_string(),
            refresh_token: Some("refresh".to_string()),
            user_id: "user-1".to_string(),
            email: Some("a@b.co".to_string()),
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let prefs = Preferences::load(dir.path().join("nope.toml")).unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.theme, ThemeMode::System);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");

        let prefs = Preferences { theme: ThemeMode::Dark, session: Some(session()) };
        prefs.save(&path).unwrap();

        assert_eq!(Preferences::load(&path).unwrap(), prefs);
    }

    #[test]
    fn test_signed_out_omits_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.toml");

        Preferences { theme: ThemeMode::Light, session: None }.save(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.contains("theme = \"light\""));
        assert!(!content.contains("session"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "theme = \"sepia\"").unwrap();

        let err = Preferences::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse preferences"));
    }

    #[test]
    fn test_require_session() {
        let prefs = Preferences::default();
        let err = prefs.require_session().unwrap_err();
        assert!(matches!(err.downcast_ref::<ServiceError>(), Some(ServiceError::NotSignedIn)));

        let signed_in = Preferences { session: Some(session()), ..Preferences::default() };
        assert_eq!(signed_in.require_session().unwrap().user_id, "user-1");
    }

    #[test]
    fn test_sync_from_settings() {
        let mut prefs = Preferences::default();

        let dark = UserSettings { theme: Some("dark".to_string()), ..UserSettings::default() };
        assert!(prefs.sync_from_settings(&dark));
        assert_eq!(prefs.theme, ThemeMode::Dark);
        assert!(!prefs.sync_from_settings(&dark));

        let invalid = UserSettings { theme: Some("neon".to_string()), ..UserSettings::default() };
        assert!(!prefs.sync_from_settings(&invalid));
        assert_eq!(prefs.theme, ThemeMode::Dark);

        assert!(!prefs.sync_from_settings(&UserSettings::default()));
    }
}
