//! View model produced by the result mapper.

use crate::analysis::ScanIntent;
use serde::{Deserialize, Serialize};

/// Image references held by the caller when a result is mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRefs {
    /// Public URL of the uploaded primary image, if the upload succeeded
    pub uploaded: Option<String>,
    /// Local reference to the front photo
    pub front: Option<String>,
    /// Local reference to the back photo
    pub back: Option<String>,
}

impl ImageRefs {
    /// Image shown in the summary: uploaded URL, else front, else back.
    pub fn display_url(&self) -> String {
        self.uploaded
            .as_ref()
            .or(self.front.as_ref())
            .or(self.back.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

/// Product header shown above every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    pub brand: String,
    pub sku: String,
    pub description: String,
    /// Integer percent in [0, 100]
    pub confidence_percent: u8,
    pub image_url: String,
    pub front_image_url: Option<String>,
    pub back_image_url: Option<String>,
}

/// Overall authenticity verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Genuine,
    Suspicious,
    Fake,
}

impl VerificationStatus {
    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Genuine => "Genuine",
            VerificationStatus::Suspicious => "Suspicious",
            VerificationStatus::Fake => "Fake",
        }
    }
}

/// Outcome of a single verification check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
        }
    }
}

/// A named verification check with a 0-100 score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub status: CheckStatus,
    pub score: u8,
}

impl Check {
    /// Creates a check, clamping the score to 100.
    pub fn new(name: impl Into<String>, status: CheckStatus, score: u8) -> Self {
        Self { name: name.into(), status, score: score.min(100) }
    }
}

/// Verification verdict plus the ordered list of checks behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub status: VerificationStatus,
    pub checks: Vec<Check>,
}

/// One seller offer in a price comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceOption {
    pub seller: String,
    /// Numeric price as reported
    pub amount: f64,
    pub price_label: String,
    pub currency: String,
    pub shipping_label: String,
    pub rating: Option<f64>,
    pub link: String,
    pub is_best: bool,
    pub availability: String,
    pub condition: String,
}

/// Offers across sellers with best and average price labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub best_price_label: String,
    pub average_price_label: String,
    pub options: Vec<PriceOption>,
}

impl PriceComparison {
    /// Label used when no offers are available.
    pub const UNAVAILABLE: &'static str = "N/A";

    /// A comparison with no offers.
    pub fn unavailable() -> Self {
        Self {
            best_price_label: Self::UNAVAILABLE.to_string(),
            average_price_label: Self::UNAVAILABLE.to_string(),
            options: Vec::new(),
        }
    }

    /// Returns the offer flagged as best.
    pub fn best(&self) -> Option<&PriceOption> {
        self.options.iter().find(|o| o.is_best)
    }
}

/// A label/value row in the details view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    pub label: String,
    pub value: String,
}

impl Spec {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

/// Description and specification rows for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub description: String,
    pub specs: Vec<Spec>,
}

/// The intent-specific part of a result. Exactly one per scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScanOutcome {
    Verification(VerificationOutcome),
    Price(PriceComparison),
    Details(ProductDetails),
}

impl ScanOutcome {
    /// Returns the intent this outcome belongs to.
    pub fn intent(&self) -> ScanIntent {
        match self {
            ScanOutcome::Verification(_) => ScanIntent::Verify,
            ScanOutcome::Price(_) => ScanIntent::Price,
            ScanOutcome::Details(_) => ScanIntent::Details,
        }
    }
}

/// Fully mapped result, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanView {
    pub intent: ScanIntent,
    pub summary: ProductSummary,
    pub outcome: ScanOutcome,
}

impl ScanView {
    pub fn verification(&self) -> Option<&VerificationOutcome> {
        match &self.outcome {
            ScanOutcome::Verification(v) => Some(v),
            _ => None,
        }
    }

    pub fn price(&self) -> Option<&PriceComparison> {
        match &self.outcome {
            ScanOutcome::Price(p) => Some(p),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<&ProductDetails> {
        match &self.outcome {
            ScanOutcome::Details(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_url_precedence() {
        let refs = ImageRefs {
            uploaded: Some("https://cdn/x.jpg".to_string()),
            front: Some("front.jpg".to_string()),
            back: Some("back.jpg".to_string()),
        };
        assert_eq!(refs.display_url(), "https://cdn/x.jpg");

        let refs = ImageRefs { uploaded: None, ..refs };
        assert_eq!(refs.display_url(), "front.jpg");

        let refs = ImageRefs { back: Some("back.jpg".to_string()), ..ImageRefs::default() };
        assert_eq!(refs.display_url(), "back.jpg");

        assert_eq!(ImageRefs::default().display_url(), "");
    }

    #[test]
    fn test_check_score_capped() {
        assert_eq!(Check::new("x", CheckStatus::Pass, 250).score, 100);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&VerificationStatus::Suspicious).unwrap(), "\"suspicious\"");
        assert_eq!(serde_json::to_string(&CheckStatus::Warn).unwrap(), "\"warn\"");
    }

    #[test]
    fn test_unavailable_comparison() {
        let comparison = PriceComparison::unavailable();
        assert_eq!(comparison.best_price_label, "N/A");
        assert_eq!(comparison.average_price_label, "N/A");
        assert!(comparison.options.is_empty());
        assert!(comparison.best().is_none());
    }

    #[test]
    fn test_outcome_tagged_serde() {
        let outcome = ScanOutcome::Details(ProductDetails {
            description: "d".to_string(),
            specs: vec![Spec::new("Brand", "Acme")],
        });
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"kind\":\"details\""));
        assert_eq!(outcome.intent(), ScanIntent::Details);
    }
}
