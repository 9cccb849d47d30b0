//! Request and response types for the analysis backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// User-selected purpose of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanIntent {
    #[default]
    Verify,
    Price,
    Details,
}

impl ScanIntent {
    /// Returns all intents.
    pub fn all() -> &'static [ScanIntent] {
        &[ScanIntent::Verify, ScanIntent::Price, ScanIntent::Details]
    }

    /// Returns the backend path for this intent.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ScanIntent::Verify => "/verify",
            ScanIntent::Price => "/price",
            ScanIntent::Details => "/details",
        }
    }

    /// Returns the heading shown above a result.
    pub fn label(&self) -> &'static str {
        match self {
            ScanIntent::Verify => "Authenticity Check",
            ScanIntent::Price => "Price Comparison",
            ScanIntent::Details => "Product Details",
        }
    }
}

impl std::str::FromStr for ScanIntent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verify" | "verification" => Ok(ScanIntent::Verify),
            "price" | "pricing" => Ok(ScanIntent::Price),
            "details" | "detail" => Ok(ScanIntent::Details),
            _ => Err(format!("Unknown intent: {}. Use: verify, price, details", s)),
        }
    }
}

impl std::fmt::Display for ScanIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanIntent::Verify => write!(f, "verify"),
            ScanIntent::Price => write!(f, "price"),
            ScanIntent::Details => write!(f, "details"),
        }
    }
}

/// Ordering requested from the price endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    PriceAsc,
    PriceDesc,
    Rating,
}

impl SortMode {
    /// Returns the query value understood by the backend.
    pub fn as_query(&self) -> &'static str {
        match self {
            SortMode::PriceAsc => "price_asc",
            SortMode::PriceDesc => "price_desc",
            SortMode::Rating => "rating",
        }
    }
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "price_asc" | "asc" => Ok(SortMode::PriceAsc),
            "price_desc" | "desc" => Ok(SortMode::PriceDesc),
            "rating" => Ok(SortMode::Rating),
            _ => Err(format!("Unknown sort mode: {}. Use: price_asc, price_desc, rating", s)),
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Front and back photos of a product, as local file paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    pub front: Option<PathBuf>,
    pub back: Option<PathBuf>,
}

impl ImageSet {
    /// Creates an image set from optional front and back paths.
    pub fn new(front: Option<PathBuf>, back: Option<PathBuf>) -> Self {
        Self { front, back }
    }

    /// Creates an image set holding only a front photo.
    pub fn front_only(front: impl Into<PathBuf>) -> Self {
        Self { front: Some(front.into()), back: None }
    }

    /// Returns true if neither side was supplied.
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// The image used for history thumbnails: front, else back.
    pub fn primary(&self) -> Option<&Path> {
        self.front.as_deref().or(self.back.as_deref())
    }

    /// Iterates over present images paired with their form field name.
    pub fn parts(&self) -> impl Iterator<Item = (&'static str, &Path)> + '_ {
        [("front_image", self.front.as_deref()), ("back_image", self.back.as_deref())]
            .into_iter()
            .filter_map(|(field, path)| path.map(|p| (field, p)))
    }
}

/// Guesses an image MIME type from a file extension.
pub fn image_mime(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" | "" => "image/jpeg".to_string(),
        other => format!("image/{}", other),
    }
}

/// Untyped response body from the analysis backend.
///
/// The backend has shipped two response layouts for verification and
/// intent-specific layouts for pricing and details, so the body is kept as
/// JSON and interpreted by the mapping layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAnalysisResult(Value);

impl RawAnalysisResult {
    /// Wraps a JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// A result with no content at all.
    pub fn empty() -> Self {
        Self(Value::Null)
    }

    /// Returns the underlying JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the wrapper and returns the JSON.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Looks up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true if the key is present at the top level, even when null.
    pub fn has_key(&self, key: &str) -> bool {
        self.0.as_object().is_some_and(|o| o.contains_key(key))
    }

    /// Returns true for null or an empty object.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Top-level `product_name`, if the backend supplied one.
    pub fn product_name(&self) -> Option<&str> {
        self.get("product_name").and_then(Value::as_str).filter(|s| !s.trim().is_empty())
    }
}

impl From<Value> for RawAnalysisResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
