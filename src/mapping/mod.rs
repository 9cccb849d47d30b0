//! Result mapping: turns raw analysis responses into the display view.
//!
//! The mapper is pure and total. Any JSON value maps to a [`ScanView`];
//! missing or malformed fields fall back to documented defaults.

pub mod details;
pub mod fields;
pub mod models;
pub mod price;
pub mod shape;
pub mod summary;
pub mod verification;

pub use details::map_details;
pub use models::{
    Check, CheckStatus, ImageRefs, PriceComparison, PriceOption, ProductDetails, ProductSummary,
    ScanOutcome, ScanView, Spec, VerificationOutcome, VerificationStatus,
};
pub use price::{currency_symbol, format_amount, map_prices};
pub use shape::PayloadShape;
pub use summary::summarize;
pub use verification::map_verification;

use crate::analysis::{RawAnalysisResult, ScanIntent};

/// Maps a raw response for the given intent.
pub fn map_scan(raw: &RawAnalysisResult, intent: ScanIntent, images: &ImageRefs) -> ScanView {
    let shape = PayloadShape::classify(raw);
    let summary = summarize(raw, &shape, images);

    let outcome = match intent {
        ScanIntent::Verify => ScanOutcome::Verification(map_verification(&shape)),
        ScanIntent::Price => ScanOutcome::Price(map_prices(raw)),
        ScanIntent::Details => ScanOutcome::Details(map_details(raw, &summary)),
    };

    ScanView { intent, summary, outcome }
}
