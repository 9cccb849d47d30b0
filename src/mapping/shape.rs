//! Classification of analysis payloads into the layouts the backend has shipped.

use super::fields::{flag, items, number, object, text};
use crate::analysis::RawAnalysisResult;
use serde_json::Value;

/// Key that marks the first-generation verification layout.
pub const LEGACY_KEY: &str = "input_analysis";

/// A verification payload, discriminated by the presence of [`LEGACY_KEY`].
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadShape {
    /// `input_analysis` + `verification_result.similarity_score` + `reference_search`
    Legacy(LegacyPayload),
    /// `product_info` + `verification_result` (+ optional `raw_forensic_analysis`)
    Current(CurrentPayload),
    /// Nothing recognizable; mapped to a zero-confidence placeholder.
    Unrecognized,
}

impl PayloadShape {
    /// Classifies a raw response. Never fails.
    pub fn classify(raw: &RawAnalysisResult) -> Self {
        if raw.has_key(LEGACY_KEY) {
            return PayloadShape::Legacy(LegacyPayload::from_value(raw.as_value()));
        }

        let value = raw.as_value();
        if object(value, "product_info").is_some()
            || object(value, "verification_result").is_some()
            || object(value, "raw_forensic_analysis").is_some()
        {
            return PayloadShape::Current(CurrentPayload::from_value(value));
        }

        PayloadShape::Unrecognized
    }
}

/// Fields read from the legacy layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyPayload {
    pub brand: Option<String>,
    pub product_name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub similarity_score: Option<f64>,
    pub is_authentic: bool,
    pub found_url: Option<String>,
}

impl LegacyPayload {
    fn from_value(value: &Value) -> Self {
        let null = Value::Null;
        let analysis = value.get(LEGACY_KEY).unwrap_or(&null);
        let verification = value.get("verification_result").unwrap_or(&null);
        let search = value.get("reference_search").unwrap_or(&null);

        Self {
            brand: owned(text(analysis, "brand")),
            product_name: owned(text(analysis, "product_name")),
            sku: owned(text(analysis, "sku")),
            description: owned(text(analysis, "description")),
            similarity_score: number(verification, "similarity_score"),
            is_authentic: flag(verification, "is_authentic").unwrap_or(false),
            found_url: owned(text(search, "found_url")),
        }
    }
}

/// One named pass/fail check from the forensic analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForensicFlag {
    pub check: String,
    pub passed: bool,
    pub observation: Option<String>,
}

/// Fields read from the current layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentPayload {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub is_authentic: bool,
    pub verdict: Option<String>,
    pub confidence_score: Option<f64>,
    pub reasoning: Option<String>,
    pub anomalies: Vec<String>,
    pub forensic_flags: Vec<ForensicFlag>,
    pub risk_level: Option<String>,
}

impl CurrentPayload {
    fn from_value(value: &Value) -> Self {
        let null = Value::Null;
        let info = value.get("product_info").unwrap_or(&null);
        let verification = value.get("verification_result").unwrap_or(&null);
        let forensic = value.get("raw_forensic_analysis").unwrap_or(&null);

        let anomalies = ["anomalies", "anomalies_detected"]
            .iter()
            .flat_map(|key| items(verification, key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let forensic_flags = items(forensic, "forensic_flags")
            .iter()
            .map(|f| ForensicFlag {
                check: text(f, "check").unwrap_or("Unnamed Check").to_string(),
                passed: text(f, "status").is_some_and(|s| s.eq_ignore_ascii_case("PASS")),
                observation: owned(text(f, "observation")),
            })
            .collect();

        let risk_level = forensic
            .get("health_safety_assessment")
            .and_then(|h| text(h, "risk_level"))
            .map(str::to_string);

        Self {
            brand: owned(text(info, "brand")),
            model: owned(text(info, "model")),
            name: owned(text(info, "name")),
            sku: owned(text(info, "sku")),
            is_authentic: flag(verification, "is_authentic").unwrap_or(false),
            verdict: owned(text(verification, "verdict")),
            confidence_score: number(verification, "confidence_score"),
            reasoning: owned(text(verification, "reasoning")),
            anomalies,
            forensic_flags,
            risk_level,
        }
    }
}

fn owned(s: Option<&str>) -> Option<String> {
    s.map(str::to_string)
}
