//! Row and request types for the BaaS tables.

use crate::analysis::ScanIntent;
use crate::mapping::fields::as_number;
use crate::theme::ThemeMode;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Signed-in user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Wire format of the auth token and signup endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
    // Signup with email confirmation returns the bare user object.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthResponse {
    /// Converts to a session when an access token was issued.
    pub fn into_session(self) -> Option<Session> {
        let access_token = self.access_token?;
        let user = self.user?;
        Some(Session {
            access_token,
            refresh_token: self.refresh_token,
            user_id: user.id,
            email: user.email.or(self.email),
        })
    }
}

/// Row of the `profiles` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Partial update of a profile row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.avatar_url.is_none()
    }
}

/// Row of the `user_settings` table.
///
/// Columns this client does not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub default_scan_intent: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSettings {
    /// The stored theme, if it is one of `light`, `dark` or `system`.
    pub fn theme_mode(&self) -> Option<ThemeMode> {
        let stored = self.theme.as_deref()?;
        ThemeMode::all().iter().copied().find(|mode| mode.to_string() == stored)
    }

    /// The stored default intent, if valid.
    pub fn default_intent(&self) -> Option<ScanIntent> {
        self.default_scan_intent.as_deref()?.parse().ok()
    }
}

/// Partial update of a settings row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_scan_intent: Option<ScanIntent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
}

impl SettingsUpdate {
    /// Keys accepted by [`SettingsUpdate::set`].
    pub const KEYS: &'static [&'static str] =
        &["theme", "default_scan_intent", "language", "notifications_enabled"];

    /// Parses and assigns a single `key = value` pair.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "theme" => self.theme = Some(value.parse::<ThemeMode>().map_err(anyhow::Error::msg)?),
            "default_scan_intent" | "intent" => {
                self.default_scan_intent =
                    Some(value.parse::<ScanIntent>().map_err(anyhow::Error::msg)?)
            }
            "language" => self.language = Some(value.trim().to_string()),
            "notifications_enabled" | "notifications" => {
                self.notifications_enabled = Some(match value.trim().to_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    other => bail!("Invalid boolean: {}. Use: true, false", other),
                })
            }
            other => bail!("Unknown setting: {}. Use: {}", other, Self::KEYS.join(", ")),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Insert payload for the `scans` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewScan {
    pub user_id: String,
    pub input_type: String,
    pub intent: ScanIntent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewScan {
    /// A camera/file scan.
    pub fn image(user_id: impl Into<String>, intent: ScanIntent, image_url: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            input_type: "image".to_string(),
            intent,
            image_url,
        }
    }
}

/// Row of the `scans` table, optionally with nested result rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub scan_results: Vec<ScanResultRecord>,
    #[serde(default)]
    pub price_results: Vec<PriceResultRecord>,
}

impl ScanRecord {
    /// Parsed intent; unknown values are treated as details scans.
    pub fn scan_intent(&self) -> ScanIntent {
        self.intent
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(ScanIntent::Details)
    }
}

/// Insert payload for the `scan_results` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewScanResult {
    pub scan_id: String,
    pub authenticity_status: String,
    pub confidence_score: u8,
    pub product_name: String,
    pub brand: String,
    /// Raw analysis payload, kept for replay
    pub metadata: Value,
}

/// Row of the `scan_results` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResultRecord {
    #[serde(default)]
    pub scan_id: Option<String>,
    #[serde(default)]
    pub authenticity_status: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<Value>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

/// Insert payload for the `price_results` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPriceResult {
    pub scan_id: String,
    pub seller: String,
    pub price: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Row of the `price_results` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceResultRecord {
    #[serde(default)]
    pub seller: Option<String>,
    /// Numeric column; may arrive as a number or a string
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl PriceResultRecord {
    pub fn amount(&self) -> Option<f64> {
        self.price.as_ref().and_then(as_number)
    }
}

/// Insert payload for the `support_tickets` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupportTicket {
    pub user_id: String,
    pub subject: String,
    pub message: String,
}

/// One page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    /// Zero-based page number of a given size.
    pub fn nth(page: usize, size: usize) -> Self {
        let limit = size.max(1);
        Self { limit, offset: page * limit }
    }

    /// Inclusive row range for the `Range` header.
    pub fn range_header(&self) -> String {
        format!("{}-{}", self.offset, self.offset + self.limit - 1)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::nth(0, 20)
    }
}

/// Everything stored for one user, as returned by the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDataExport {
    pub profile: Option<Value>,
    pub settings: Option<Value>,
    pub scans: Vec<Value>,
    pub support_tickets: Vec<Value>,
    /// RFC 3339 timestamp
    pub exported_at: String,
}
