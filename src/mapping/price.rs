//! Price branch: best offer, average price and per-seller options.

use super::fields::{as_number, display, items, number, text};
use super::models::{PriceComparison, PriceOption};
use crate::analysis::RawAnalysisResult;
use serde_json::Value;

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_AVAILABILITY: &str = "In stock";
const DEFAULT_CONDITION: &str = "New";
const FREE_SHIPPING: &str = "Free Shipping";

/// Currency code to display symbol.
///
/// Codes without a known symbol are kept and followed by a space
/// (`CHF 12.00`); values that already are symbols pass through.
pub fn currency_symbol(currency: &str) -> String {
    let code = currency.trim();
    match code.to_uppercase().as_str() {
        "" | "USD" | "US$" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "INR" => "₹".to_string(),
        "JPY" => "¥".to_string(),
        upper if upper.chars().all(|c| c.is_ascii_alphabetic()) => format!("{} ", upper),
        _ => code.to_string(),
    }
}

/// Formats an amount with its currency symbol and two decimals.
pub fn format_amount(amount: f64, currency: &str) -> String {
    format!("{}{:.2}", currency_symbol(currency), amount)
}

/// One usable entry of the backend `prices` array.
#[derive(Debug, Clone, PartialEq)]
struct PriceEntry<'a> {
    raw: &'a Value,
    price: f64,
    currency: String,
}

impl<'a> PriceEntry<'a> {
    /// Entries without a numeric price are skipped.
    fn from_value(raw: &'a Value) -> Option<Self> {
        let price = number(raw, "price")?;
        let currency = text(raw, "currency").unwrap_or(DEFAULT_CURRENCY).to_string();
        Some(Self { raw, price, currency })
    }

    /// Price at whole-cent precision, used for best-offer comparison.
    fn cents(&self) -> i64 {
        (self.price * 100.0).round() as i64
    }

    fn shipping_label(&self) -> String {
        match self.raw.get("shipping_cost") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(value) => match as_number(value) {
                Some(cost) if cost > 0.0 => format!("+{} Shipping", format_amount(cost, &self.currency)),
                _ => FREE_SHIPPING.to_string(),
            },
            None => FREE_SHIPPING.to_string(),
        }
    }

    fn into_option(self, is_best: bool) -> PriceOption {
        PriceOption {
            seller: text(self.raw, "seller").unwrap_or("Unknown Seller").to_string(),
            amount: self.price,
            price_label: format_amount(self.price, &self.currency),
            shipping_label: self.shipping_label(),
            rating: number(self.raw, "rating"),
            link: text(self.raw, "link").unwrap_or_default().to_string(),
            is_best,
            availability: self
                .raw
                .get("availability")
                .and_then(display)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_AVAILABILITY.to_string()),
            condition: text(self.raw, "condition").unwrap_or(DEFAULT_CONDITION).to_string(),
            currency: self.currency,
        }
    }
}

/// Maps the `prices` array of a price-check response.
///
/// The best offer is the lowest price compared in whole cents; on ties the
/// earliest entry wins. Exactly one option is flagged as best whenever the
/// list is non-empty.
pub fn map_prices(raw: &RawAnalysisResult) -> PriceComparison {
    let entries: Vec<PriceEntry<'_>> =
        items(raw.as_value(), "prices").iter().filter_map(PriceEntry::from_value).collect();

    let Some(best_index) = best_index(&entries) else {
        return PriceComparison::unavailable();
    };

    let best = &entries[best_index];
    let average = entries.iter().map(|e| e.price).sum::<f64>() / entries.len() as f64;

    let best_price_label = format_amount(best.price, &best.currency);
    let average_price_label = format_amount(average, &best.currency);

    let options = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| entry.into_option(i == best_index))
        .collect();

    PriceComparison { best_price_label, average_price_label, options }
}

fn best_index(entries: &[PriceEntry<'_>]) -> Option<usize> {
    // min_by_key returns the first of several equal minimums.
    entries.iter().enumerate().min_by_key(|(_, e)| e.cents()).map(|(i, _)| i)
}
