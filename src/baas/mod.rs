//! Hosted backend-as-a-service: auth, user data tables and image storage.

pub mod client;
pub mod history;
pub mod models;

pub use client::{unix_millis, BaasClient, BaasStore};
pub use history::{replay, HistoryEntry, HistoryFilter};
pub use models::{
    NewPriceResult, NewScan, NewScanResult, NewSupportTicket, Page, Profile, ProfileUpdate,
    ScanRecord, Session, SettingsUpdate, UserDataExport, UserSettings,
};
