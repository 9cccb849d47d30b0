//! Details branch: description and specification rows.

use super::fields::{display, text};
use super::models::{ProductDetails, ProductSummary, Spec};
use crate::analysis::RawAnalysisResult;
use serde_json::Value;

/// Maps a details response, synthesizing a description and specs when the
/// backend omitted them.
pub fn map_details(raw: &RawAnalysisResult, summary: &ProductSummary) -> ProductDetails {
    let value = raw.as_value();

    let description = text(value, "description")
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} detected. Analysis complete.", summary.name));

    let specs = match value.get("specs").and_then(Value::as_array) {
        Some(rows) => rows.iter().filter_map(spec_row).collect(),
        None => vec![
            Spec::new("Brand", summary.brand.clone()),
            Spec::new("Confidence", format!("{}%", summary.confidence_percent)),
        ],
    };

    ProductDetails { description, specs }
}

/// Rows without a label are dropped; non-string values are rendered as text.
fn spec_row(row: &Value) -> Option<Spec> {
    let label = text(row, "label")?;
    let value = row.get("value").and_then(display).unwrap_or_default();
    Some(Spec::new(label, value))
}
