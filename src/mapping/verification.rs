//! Verification branch: verdict and checks for each payload layout.

use super::fields::fraction_to_percent;
use super::models::{Check, CheckStatus, VerificationOutcome, VerificationStatus};
use super::shape::{CurrentPayload, LegacyPayload, PayloadShape};

/// Similarity above which the legacy visual match counts as a pass.
pub const VISUAL_MATCH_THRESHOLD: f64 = 0.8;

/// Name of the check derived from the health & safety risk level.
pub const HEALTH_AUDIT_CHECK: &str = "Health & Safety Audit";

/// Maps any payload shape to a verification outcome.
pub fn map_verification(shape: &PayloadShape) -> VerificationOutcome {
    match shape {
        PayloadShape::Legacy(legacy) => map_legacy(legacy),
        PayloadShape::Current(current) => map_current(current),
        PayloadShape::Unrecognized => placeholder(),
    }
}

/// Zero-confidence outcome used when nothing could be read.
pub fn placeholder() -> VerificationOutcome {
    VerificationOutcome { status: VerificationStatus::Suspicious, checks: Vec::new() }
}

/// First-generation layout: similarity score plus reference image search.
pub fn map_legacy(payload: &LegacyPayload) -> VerificationOutcome {
    let similarity = payload.similarity_score.unwrap_or(0.0);
    let visual_score = fraction_to_percent(similarity);

    let visual_status =
        if similarity > VISUAL_MATCH_THRESHOLD { CheckStatus::Pass } else { CheckStatus::Warn };

    let reference = if payload.found_url.is_some() {
        Check::new("Reference Check", CheckStatus::Pass, 100)
    } else {
        Check::new("Reference Check", CheckStatus::Fail, 0)
    };

    let status =
        if payload.is_authentic { VerificationStatus::Genuine } else { VerificationStatus::Fake };

    VerificationOutcome {
        status,
        checks: vec![
            Check::new("Visual Match", visual_status, visual_score),
            Check::new("Feature Analysis", CheckStatus::Pass, 95),
            reference,
        ],
    }
}

/// Current layout: verdict plus forensic flags, with synthetic fallbacks.
pub fn map_current(payload: &CurrentPayload) -> VerificationOutcome {
    let confidence = payload.confidence_score.map(fraction_to_percent).unwrap_or(0);

    let mut checks: Vec<Check> = payload
        .forensic_flags
        .iter()
        .map(|flag| {
            if flag.passed {
                Check::new(&flag.check, CheckStatus::Pass, 100)
            } else {
                Check::new(&flag.check, CheckStatus::Fail, 0)
            }
        })
        .collect();

    if let Some(risk) = &payload.risk_level {
        checks.push(health_audit(risk));
    }

    if checks.is_empty() {
        checks.push(confidence_check(confidence));
        checks.push(anomalies_check(&payload.anomalies));
    }

    VerificationOutcome { status: current_status(payload), checks }
}

fn current_status(payload: &CurrentPayload) -> VerificationStatus {
    if payload.is_authentic {
        return VerificationStatus::Genuine;
    }

    match payload.verdict.as_deref() {
        Some("Suspect") | Some("Suspicious") => VerificationStatus::Suspicious,
        _ => VerificationStatus::Fake,
    }
}

/// Maps a risk level to the health & safety check.
pub fn health_audit(risk_level: &str) -> Check {
    match risk_level.trim() {
        "High Risk" | "Critical" => Check::new(HEALTH_AUDIT_CHECK, CheckStatus::Fail, 0),
        "Caution" => Check::new(HEALTH_AUDIT_CHECK, CheckStatus::Warn, 50),
        _ => Check::new(HEALTH_AUDIT_CHECK, CheckStatus::Pass, 100),
    }
}

fn confidence_check(confidence: u8) -> Check {
    let status = match confidence {
        81.. => CheckStatus::Pass,
        51..=80 => CheckStatus::Warn,
        _ => CheckStatus::Fail,
    };
    Check::new("AI Confidence", status, confidence)
}

fn anomalies_check(anomalies: &[String]) -> Check {
    if anomalies.is_empty() {
        Check::new("Anomalies Check", CheckStatus::Pass, 100)
    } else {
        Check::new("Anomalies Check", CheckStatus::Warn, 50)
    }
}
