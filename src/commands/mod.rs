//! CLI command implementations.

pub mod account;
pub mod history;
pub mod scan;

pub use history::{HistoryCommand, HistoryQuery};
pub use scan::{ScanCommand, ScanRequest, ScanRun};
