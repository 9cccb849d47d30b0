//! Analysis backend integration: request types and the multipart client.

pub mod client;
pub mod models;

pub use client::{submit, AnalysisApi, AnalysisClient};
pub use models::{ImageSet, RawAnalysisResult, ScanIntent, SortMode};
