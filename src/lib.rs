//! veriscan - product verification client
//!
//! Submits product photos to an analysis backend, maps whatever JSON comes
//! back into stable view models, and keeps a per-user scan history in a
//! hosted BaaS project.

pub mod analysis;
pub mod baas;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod mapping;
pub mod preferences;
pub mod theme;

pub use analysis::{ImageSet, RawAnalysisResult, ScanIntent, SortMode};
pub use config::Config;
pub use error::ServiceError;
pub use mapping::{map_scan, ScanOutcome, ScanView};
pub use preferences::Preferences;
pub use theme::{Palette, ThemeMode};
