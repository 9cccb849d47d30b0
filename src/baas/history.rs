//! History list projection and replay of stored scans.

use super::models::ScanRecord;
use crate::analysis::{RawAnalysisResult, ScanIntent};
use crate::mapping::{self, format_amount, ImageRefs, ScanView};
use serde::Serialize;

/// One row of the history list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub image_url: Option<String>,
    pub created_at: Option<String>,
    pub intent: ScanIntent,
    pub status: String,
}

impl HistoryEntry {
    /// Projects a stored scan; only the first result rows are considered.
    pub fn from_record(record: &ScanRecord) -> Self {
        let result = record.scan_results.first();
        let intent = record.scan_intent();

        let status = match intent {
            ScanIntent::Verify => result
                .and_then(|r| r.authenticity_status.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            ScanIntent::Price => {
                let best = record.price_results.first();
                match best.and_then(|p| p.amount()) {
                    Some(amount) if amount != 0.0 => {
                        let currency = best.and_then(|p| p.currency.as_deref()).unwrap_or("USD");
                        format_amount(amount, currency)
                    }
                    _ => "No Price".to_string(),
                }
            }
            ScanIntent::Details => "Viewed".to_string(),
        };

        Self {
            id: record.id.clone(),
            name: result
                .and_then(|r| r.product_name.clone())
                .unwrap_or_else(|| "Unknown Product".to_string()),
            brand: result
                .and_then(|r| r.brand.clone())
                .unwrap_or_else(|| "Unknown Brand".to_string()),
            image_url: record.image_url.clone(),
            created_at: record.created_at.clone(),
            intent,
            status,
        }
    }

    /// Date part of `created_at` (`YYYY-MM-DD`).
    pub fn date(&self) -> &str {
        self.created_at
            .as_deref()
            .map(|ts| ts.split('T').next().unwrap_or(ts))
            .unwrap_or("-")
    }
}

/// Intent filter plus free-text search over name and brand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// `None` matches every intent
    pub intent: Option<ScanIntent>,
    pub query: Option<String>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        if let Some(intent) = self.intent {
            if entry.intent != intent {
                return false;
            }
        }

        match self.query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                entry.name.to_lowercase().contains(&query)
                    || entry.brand.to_lowercase().contains(&query)
            }
            _ => true,
        }
    }

    /// Projects and filters a page of records, keeping their order.
    pub fn apply(&self, records: &[ScanRecord]) -> Vec<HistoryEntry> {
        records.iter().map(HistoryEntry::from_record).filter(|e| self.matches(e)).collect()
    }
}

/// Re-maps a stored scan from the raw payload saved with its first result.
pub fn replay(record: &ScanRecord) -> ScanView {
    let raw = record
        .scan_results
        .first()
        .map(|r| RawAnalysisResult::new(r.metadata.clone()))
        .unwrap_or_else(RawAnalysisResult::empty);

    let images = ImageRefs { uploaded: record.image_url.clone(), ..ImageRefs::default() };
    mapping::map_scan(&raw, record.scan_intent(), &images)
}
