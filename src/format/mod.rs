//! Output formatting for scan results, history and account data (table, JSON, markdown).

use crate::baas::{HistoryEntry, Profile, UserSettings};
use crate::config::OutputFormat;
use crate::mapping::{
    PriceComparison, ProductDetails, ProductSummary, ScanOutcome, ScanView, VerificationOutcome,
};
use crate::theme::{Palette, ThemeMode};
use serde::Serialize;

/// Formats view models for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a mapped scan result.
    pub fn format_scan(&self, view: &ScanView) -> String {
        match self.format {
            OutputFormat::Json => json(view, "{}"),
            OutputFormat::Table => self.table_scan(view),
            OutputFormat::Markdown => self.markdown_scan(view),
        }
    }

    /// Formats a page of history entries.
    pub fn format_history(&self, entries: &[HistoryEntry]) -> String {
        if entries.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                _ => "No history yet. Scan your first product to see it here.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => json(entries, "[]"),
            OutputFormat::Table => self.table_history(entries),
            OutputFormat::Markdown => self.markdown_history(entries),
        }
    }

    /// Formats a profile row.
    pub fn format_profile(&self, profile: &Profile) -> String {
        let rows = [
            ("Name", profile.full_name.as_deref().unwrap_or("-")),
            ("Email", profile.email.as_deref().unwrap_or("-")),
            ("Avatar", profile.avatar_url.as_deref().unwrap_or("-")),
            ("Member since", profile.created_at.as_deref().map(date_part).unwrap_or("-")),
        ];

        match self.format {
            OutputFormat::Json => json(profile, "{}"),
            OutputFormat::Table => key_value_table(&rows),
            OutputFormat::Markdown => key_value_markdown("Profile", &rows),
        }
    }

    /// Formats a settings row.
    pub fn format_settings(&self, settings: &UserSettings) -> String {
        let notifications = match settings.notifications_enabled {
            Some(true) => "on",
            Some(false) => "off",
            None => "-",
        };
        let rows = [
            ("Theme", settings.theme.as_deref().unwrap_or("-")),
            ("Default intent", settings.default_scan_intent.as_deref().unwrap_or("-")),
            ("Language", settings.language.as_deref().unwrap_or("-")),
            ("Notifications", notifications),
        ];

        match self.format {
            OutputFormat::Json => json(settings, "{}"),
            OutputFormat::Table => key_value_table(&rows),
            OutputFormat::Markdown => key_value_markdown("Settings", &rows),
        }
    }

    /// Formats the theme selection with its resolved palette.
    pub fn format_theme(&self, mode: ThemeMode, palette: &Palette) -> String {
        match self.format {
            OutputFormat::Json => {
                json(&serde_json::json!({ "theme": mode, "palette": palette }), "{}")
            }
            OutputFormat::Table => {
                let mut lines = vec![format!("Theme:   {}", mode)];
                for (name, hex) in palette.entries() {
                    lines.push(format!("  {:<14} {}", name, hex));
                }
                lines.join("\n")
            }
            OutputFormat::Markdown => {
                let mut lines = vec![format!("- **Theme:** {}", mode)];
                for (name, hex) in palette.entries() {
                    lines.push(format!("  - `{}`: {}", name, hex));
                }
                lines.join("\n")
            }
        }
    }

    // Table formatting

    fn table_scan(&self, view: &ScanView) -> String {
        let mut lines = table_summary(&view.summary);
        lines.push(String::new());

        match &view.outcome {
            ScanOutcome::Verification(outcome) => table_verification(&mut lines, outcome),
            ScanOutcome::Price(comparison) => table_prices(&mut lines, comparison),
            ScanOutcome::Details(details) => table_details(&mut lines, details),
        }

        lines.join("\n")
    }

    fn table_history(&self, entries: &[HistoryEntry]) -> String {
        let id_width = 12;
        let date_width = 10;
        let intent_width = 7;
        let status_width = 12;
        let name_width = 40;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<id_width$}  {:<date_width$}  {:<intent_width$}  {:<status_width$}  {}",
            "ID", "Date", "Intent", "Status", "Product"
        ));
        lines.push(format!(
            "{:-<id_width$}  {:-<date_width$}  {:-<intent_width$}  {:-<status_width$}  {:-<name_width$}",
            "", "", "", "", ""
        ));

        for entry in entries {
            let product = format!("{} ({})", entry.name, entry.brand);
            lines.push(format!(
                "{:<id_width$}  {:<date_width$}  {:<intent_width$}  {:<status_width$}  {}",
                truncate(&entry.id, id_width),
                entry.date(),
                entry.intent.to_string(),
                truncate(&entry.status, status_width),
                truncate(&product, name_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} scans", entries.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_scan(&self, view: &ScanView) -> String {
        let summary = &view.summary;
        let mut lines = Vec::new();

        lines.push(format!("## {}", summary.name));
        lines.push(String::new());
        lines.push(format!("- **Brand:** {}", summary.brand));
        lines.push(format!("- **SKU:** {}", summary.sku));
        lines.push(format!("- **Confidence:** {}%", summary.confidence_percent));
        if !summary.image_url.is_empty() {
            lines.push(format!("- **Image:** {}", summary.image_url));
        }
        lines.push(String::new());

        match &view.outcome {
            ScanOutcome::Verification(outcome) => {
                lines.push(format!("### {}", outcome.status.label()));
                lines.push(String::new());
                lines.push("| Check | Status | Score |".to_string());
                lines.push("|-------|--------|-------|".to_string());
                for check in &outcome.checks {
                    lines.push(format!(
                        "| {} | {} | {} |",
                        check.name,
                        check.status.label(),
                        check.score
                    ));
                }
            }
            ScanOutcome::Price(comparison) => {
                lines.push(format!(
                    "**Best price:** {} · **Average:** {}",
                    comparison.best_price_label, comparison.average_price_label
                ));
                lines.push(String::new());
                lines.push("| Seller | Price | Shipping | Rating | Availability |".to_string());
                lines.push("|--------|-------|----------|--------|--------------|".to_string());
                for option in &comparison.options {
                    let seller = if option.link.is_empty() {
                        option.seller.clone()
                    } else {
                        format!("[{}]({})", option.seller, option.link)
                    };
                    let price = if option.is_best {
                        format!("**{}** ✓", option.price_label)
                    } else {
                        option.price_label.clone()
                    };
                    lines.push(format!(
                        "| {} | {} | {} | {} | {} |",
                        seller,
                        price,
                        option.shipping_label,
                        rating_label(option.rating),
                        option.availability
                    ));
                }
            }
            ScanOutcome::Details(details) => {
                lines.push(details.description.clone());
                if !details.specs.is_empty() {
                    lines.push(String::new());
                    for spec in &details.specs {
                        lines.push(format!("- **{}:** {}", spec.label, spec.value));
                    }
                }
            }
        }

        lines.join("\n")
    }

    fn markdown_history(&self, entries: &[HistoryEntry]) -> String {
        let mut lines = Vec::new();

        lines.push("| Date | Intent | Product | Brand | Status |".to_string());
        lines.push("|------|--------|---------|-------|--------|".to_string());

        for entry in entries {
            lines.push(format!(
                "| {} | {} | {} | {} | {} |",
                entry.date(),
                entry.intent,
                entry.name,
                entry.brand,
                entry.status
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} scans*", entries.len()));

        lines.join("\n")
    }
}

fn json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

fn table_summary(summary: &ProductSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Product:    {}", summary.name),
        format!("Brand:      {}", summary.brand),
        format!("SKU:        {}", summary.sku),
        format!("Confidence: {}%", summary.confidence_percent),
    ];
    if !summary.image_url.is_empty() {
        lines.push(format!("Image:      {}", summary.image_url));
    }
    if !summary.description.is_empty() {
        lines.push(format!("Notes:      {}", summary.description));
    }
    lines
}

fn table_verification(lines: &mut Vec<String>, outcome: &VerificationOutcome) {
    lines.push(format!("Verdict:    {}", outcome.status.label().to_uppercase()));

    if outcome.checks.is_empty() {
        lines.push("No checks were reported.".to_string());
        return;
    }

    lines.push(String::new());
    lines.push(format!("{:<28}  {:<6}  {:>5}", "Check", "Status", "Score"));
    lines.push(format!("{:-<28}  {:-<6}  {:->5}", "", "", ""));
    for check in &outcome.checks {
        lines.push(format!(
            "{:<28}  {:<6}  {:>5}",
            truncate(&check.name, 28),
            check.status.label(),
            check.score
        ));
    }
}

fn table_prices(lines: &mut Vec<String>, comparison: &PriceComparison) {
    lines.push(format!("Best price: {}", comparison.best_price_label));
    lines.push(format!("Average:    {}", comparison.average_price_label));

    if comparison.options.is_empty() {
        lines.push("No offers found.".to_string());
        return;
    }

    let seller_width = 20;
    let price_width = 12;
    let shipping_width = 20;

    lines.push(String::new());
    lines.push(format!(
        "  {:<seller_width$}  {:>price_width$}  {:<shipping_width$}  {:>6}  {}",
        "Seller", "Price", "Shipping", "Rating", "Condition"
    ));
    for option in &comparison.options {
        let marker = if option.is_best { "*" } else { " " };
        lines.push(format!(
            "{} {:<seller_width$}  {:>price_width$}  {:<shipping_width$}  {:>6}  {}, {}",
            marker,
            truncate(&option.seller, seller_width),
            option.price_label,
            truncate(&option.shipping_label, shipping_width),
            rating_label(option.rating),
            option.condition,
            option.availability
        ));
    }
    lines.push(String::new());
    lines.push(format!("Total: {} offers (* best)", comparison.options.len()));
}

fn table_details(lines: &mut Vec<String>, details: &ProductDetails) {
    lines.push(details.description.clone());
    if details.specs.is_empty() {
        return;
    }

    lines.push(String::new());
    let width = details.specs.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    for spec in &details.specs {
        lines.push(format!("  {:<width$}  {}", spec.label, spec.value));
    }
}

fn key_value_table(rows: &[(&str, &str)]) -> String {
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 1;
    rows.iter()
        .map(|(key, value)| format!("{:<width$} {}", format!("{}:", key), value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn key_value_markdown(title: &str, rows: &[(&str, &str)]) -> String {
    let mut lines = vec![format!("## {}", title), String::new()];
    lines.extend(rows.iter().map(|(key, value)| format!("- **{}:** {}", key, value)));
    lines.join("\n")
}

fn rating_label(rating: Option<f64>) -> String {
    rating.map(|r| format!("{:.1}", r)).unwrap_or_else(|| "N/A".to_string())
}

fn date_part(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

/// Shortens to `max` characters, ending in "..." when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ScanIntent;
    use crate::mapping::{Check, CheckStatus, PriceOption, Spec, VerificationStatus};

    fn summary() -> ProductSummary {
        ProductSummary {
            name: "Air Max 90".to_string(),
            brand: "Nike".to_string(),
            sku: "CN8490-002".to_string(),
            description: String::new(),
            confidence_percent: 92,
            image_url: "https://cdn/x.jpg".to_string(),
            front_image_url: None,
            back_image_url: None,
        }
    }

    fn verification_view() -> ScanView {
        ScanView {
            intent: ScanIntent::Verify,
            summary: summary(),
            outcome: ScanOutcome::Verification(VerificationOutcome {
                status: VerificationStatus::Genuine,
                checks: vec![
                    Check::new("Visual Match", CheckStatus::Pass, 92),
                    Check::new("Reference Check", CheckStatus::Fail, 0),
                ],
            }),
        }
    }

    fn price_view() -> ScanView {
        let option = |seller: &str, amount: f64, price: &str, best: bool| PriceOption {
            seller: seller.to_string(),
            amount,
            price_label: price.to_string(),
            currency: "USD".to_string(),
            shipping_label: "Free Shipping".to_string(),
            rating: if best { Some(4.8) } else { None },
            link: if best { "https://stockx.com".to_string() } else { String::new() },
            is_best: best,
            availability: "In stock".to_string(),
            condition: "New".to_string(),
        };

        ScanView {
            intent: ScanIntent::Price,
            summary: summary(),
            outcome: ScanOutcome::Price(PriceComparison {
                best_price_label: "$8.00".to_string(),
                average_price_label: "$8.67".to_string(),
                options: vec![option("A", 10.0, "$10.00", false), option("B", 8.0, "$8.00", true)],
            }),
        }
    }

    fn details_view() -> ScanView {
        ScanView {
            intent: ScanIntent::Details,
            summary: summary(),
            outcome: ScanOutcome::Details(ProductDetails {
                description: "Air Max 90 detected. Analysis complete.".to_string(),
                specs: vec![Spec::new("Brand", "Nike"), Spec::new("Confidence", "92%")],
            }),
        }
    }

    fn entry(id: &str, intent: ScanIntent, status: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            name: "Air Max 90".to_string(),
            brand: "Nike".to_string(),
            image_url: None,
            created_at: Some("2026-03-01T10:15:00Z".to_string()),
            intent,
            status: status.to_string(),
        }
    }

    #[test]
    fn test_table_verification() {
        let output = Formatter::new(OutputFormat::Table).format_scan(&verification_view());

        assert!(output.contains("Product:    Air Max 90"));
        assert!(output.contains("Confidence: 92%"));
        assert!(output.contains("Verdict:    GENUINE"));
        assert!(output.contains("Visual Match"));
        assert!(output.contains("fail"));
    }

    #[test]
    fn test_table_verification_without_checks() {
        let mut view = verification_view();
        view.outcome = ScanOutcome::Verification(VerificationOutcome {
            status: VerificationStatus::Suspicious,
            checks: Vec::new(),
        });
        let output = Formatter::new(OutputFormat::Table).format_scan(&view);

        assert!(output.contains("SUSPICIOUS"));
        assert!(output.contains("No checks were reported."));
    }

    #[test]
    fn test_table_prices_marks_best() {
        let output = Formatter::new(OutputFormat::Table).format_scan(&price_view());

        assert!(output.contains("Best price: $8.00"));
        assert!(output.contains("Average:    $8.67"));
        let best_line = output.lines().find(|l| l.contains("$8.00") && l.starts_with('*')).unwrap();
        assert!(best_line.contains("B"));
        assert!(output.contains("Total: 2 offers"));
    }

    #[test]
    fn test_table_prices_unavailable() {
        let mut view = price_view();
        view.outcome = ScanOutcome::Price(PriceComparison::unavailable());
        let output = Formatter::new(OutputFormat::Table).format_scan(&view);

        assert!(output.contains("Best price: N/A"));
        assert!(output.contains("No offers found."));
    }

    #[test]
    fn test_table_details() {
        let output = Formatter::new(OutputFormat::Table).format_scan(&details_view());
        assert!(output.contains("Air Max 90 detected. Analysis complete."));
        assert!(output.contains("Confidence  92%"));
    }

    #[test]
    fn test_json_scan_is_tagged() {
        let output = Formatter::new(OutputFormat::Json).format_scan(&price_view());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["intent"], "price");
        assert_eq!(value["outcome"]["kind"], "price");
        assert_eq!(value["summary"]["brand"], "Nike");
    }

    #[test]
    fn test_markdown_scan_variants() {
        let formatter = Formatter::new(OutputFormat::Markdown);

        let verification = formatter.format_scan(&verification_view());
        assert!(verification.starts_with("## Air Max 90"));
        assert!(verification.contains("### Genuine"));
        assert!(verification.contains("| Visual Match | pass | 92 |"));

        let prices = formatter.format_scan(&price_view());
        assert!(prices.contains("[B](https://stockx.com)"));
        assert!(prices.contains("**$8.00** ✓"));

        let details = formatter.format_scan(&details_view());
        assert!(details.contains("- **Brand:** Nike"));
    }

    #[test]
    fn test_history_all_formats() {
        let entries = vec![
            entry("scan-1", ScanIntent::Verify, "analyzed"),
            entry("scan-2", ScanIntent::Price, "$8.00"),
        ];

        let table = Formatter::new(OutputFormat::Table).format_history(&entries);
        assert!(table.contains("2026-03-01"));
        assert!(table.contains("Air Max 90 (Nike)"));
        assert!(table.contains("Total: 2 scans"));

        let markdown = Formatter::new(OutputFormat::Markdown).format_history(&entries);
        assert!(markdown.contains("| 2026-03-01 | price | Air Max 90 | Nike | $8.00 |"));

        let json = Formatter::new(OutputFormat::Json).format_history(&entries);
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["intent"], "verify");
    }

    #[test]
    fn test_history_empty() {
        assert_eq!(Formatter::new(OutputFormat::Json).format_history(&[]), "[]");
        assert!(Formatter::new(OutputFormat::Table).format_history(&[]).contains("No history yet"));
    }

    #[test]
    fn test_profile_and_settings() {
        let profile = Profile {
            id: "user-1".to_string(),
            full_name: Some("Asha Rao".to_string()),
            email: Some("a@b.co".to_string()),
            avatar_url: None,
            created_at: Some("2025-12-24T08:00:00Z".to_string()),
        };
        let table = Formatter::new(OutputFormat::Table).format_profile(&profile);
        assert!(table.contains("Asha Rao"));
        assert!(table.contains("Member since: 2025-12-24"));

        let settings = UserSettings {
            theme: Some("dark".to_string()),
            notifications_enabled: Some(false),
            ..UserSettings::default()
        };
        let markdown = Formatter::new(OutputFormat::Markdown).format_settings(&settings);
        assert!(markdown.contains("- **Theme:** dark"));
        assert!(markdown.contains("- **Notifications:** off"));
    }

    #[test]
    fn test_theme_output() {
        let output = Formatter::new(OutputFormat::Table)
            .format_theme(ThemeMode::Dark, ThemeMode::Dark.resolve(false));
        assert!(output.contains("Theme:   dark"));
        assert!(output.contains("#121212"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Ultraboost Light Running Shoe", 10), "Ultrabo...");
        assert_eq!(truncate("ÄÖÜÄÖÜÄÖÜÄÖÜ", 6), "ÄÖÜ...");
    }
}
