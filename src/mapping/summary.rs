//! Product header derived from whichever payload layout arrived.

use super::fields::{fraction_to_percent, text};
use super::models::{ImageRefs, ProductSummary};
use super::shape::PayloadShape;
use crate::analysis::RawAnalysisResult;

/// Builds the product summary for any response.
pub fn summarize(raw: &RawAnalysisResult, shape: &PayloadShape, images: &ImageRefs) -> ProductSummary {
    let value = raw.as_value();
    let top_level_name = raw.product_name().map(str::to_string);
    let top_level_brand = text(value, "brand").map(str::to_string);
    let top_level_description = text(value, "description").map(str::to_string);

    let (name, brand, sku, description, confidence_percent) = match shape {
        PayloadShape::Legacy(legacy) => (
            legacy.product_name.clone().unwrap_or_else(|| "Analyzed Product".to_string()),
            legacy.brand.clone().unwrap_or_else(|| "Detected Brand".to_string()),
            legacy.sku.clone().unwrap_or_else(|| "N/A".to_string()),
            legacy.description.clone().unwrap_or_default(),
            legacy.similarity_score.map(fraction_to_percent).unwrap_or(0),
        ),
        PayloadShape::Current(current) => (
            current
                .name
                .clone()
                .or(top_level_name)
                .or_else(|| current.model.clone())
                .unwrap_or_else(|| "Analyzed Product".to_string()),
            current.brand.clone().unwrap_or_else(|| "Unknown".to_string()),
            current.sku.clone().unwrap_or_else(|| "N/A".to_string()),
            current.reasoning.clone().unwrap_or_default(),
            current.confidence_score.map(fraction_to_percent).unwrap_or(0),
        ),
        PayloadShape::Unrecognized => (
            top_level_name.unwrap_or_else(|| "Unknown Product".to_string()),
            top_level_brand.unwrap_or_else(|| "Unknown".to_string()),
            "---".to_string(),
            top_level_description.unwrap_or_default(),
            0,
        ),
    };

    ProductSummary {
        name,
        brand,
        sku,
        description,
        confidence_percent,
        image_url: images.display_url(),
        front_image_url: images.front.clone(),
        back_image_url: images.back.clone(),
    }
}
