//! Light/dark palettes and the persisted theme selection.

use serde::{Deserialize, Serialize};

/// User-selected theme. `System` follows the platform scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn all() -> &'static [ThemeMode] {
        &[ThemeMode::Light, ThemeMode::Dark, ThemeMode::System]
    }

    /// Whether the dark palette applies, given the platform scheme.
    pub fn is_dark(&self, system_dark: bool) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::System => system_dark,
        }
    }

    /// Resolves the palette to render with.
    pub fn resolve(&self, system_dark: bool) -> &'static Palette {
        if self.is_dark(system_dark) {
            &Palette::DARK
        } else {
            &Palette::LIGHT
        }
    }
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" | "auto" => Ok(ThemeMode::System),
            _ => Err(format!("Unknown theme: {}. Use: light, dark, system", s)),
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        };
        write!(f, "{}", s)
    }
}

/// Named colors as hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub error: &'static str,
    pub white: &'static str,
    pub border: &'static str,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        primary: "#6200ee",
        secondary: "#03dac6",
        background: "#f6f6f6",
        surface: "#ffffff",
        text: "#000000",
        text_secondary: "#666666",
        error: "#B00020",
        white: "#ffffff",
        border: "#dddddd",
    };

    pub const DARK: Palette = Palette {
        primary: "#bb86fc",
        secondary: "#03dac6",
        background: "#121212",
        surface: "#1e1e1e",
        text: "#ffffff",
        text_secondary: "#aaaaaa",
        error: "#cf6679",
        white: "#ffffff",
        border: "#333333",
    };

    /// Name/value pairs in display order.
    pub fn entries(&self) -> [(&'static str, &'static str); 9] {
        [
            ("primary", self.primary),
            ("secondary", self.secondary),
            ("background", self.background),
            ("surface", self.surface),
            ("text", self.text),
            ("textSecondary", self.text_secondary),
            ("error", self.error),
            ("white", self.white),
            ("border", self.border),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(ThemeMode::Light.resolve(true), &Palette::LIGHT);
        assert_eq!(ThemeMode::Dark.resolve(false), &Palette::DARK);
        assert_eq!(ThemeMode::System.resolve(true), &Palette::DARK);
        assert_eq!(ThemeMode::System.resolve(false), &Palette::LIGHT);
    }

    #[test]
    fn test_parse() {
        assert_eq!("dark".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert_eq!("LIGHT".parse::<ThemeMode>().unwrap(), ThemeMode::Light);
        assert_eq!("auto".parse::<ThemeMode>().unwrap(), ThemeMode::System);
        assert!("sepia".parse::<ThemeMode>().is_err());
    }

    #[test]
    fn test_display_round_trips_for_each_mode() {
        for mode in ThemeMode::all() {
            assert_eq!(mode.to_string().parse::<ThemeMode>().unwrap(), *mode);
        }
    }

    #[test]
    fn test_default_is_system() {
        assert_eq!(ThemeMode::default(), ThemeMode::System);
    }

    #[test]
    fn test_palettes_differ_where_expected() {
        assert_eq!(Palette::LIGHT.secondary, Palette::DARK.secondary);
        assert_ne!(Palette::LIGHT.background, Palette::DARK.background);
        assert_eq!(Palette::DARK.entries()[0], ("primary", "#bb86fc"));
    }
}
