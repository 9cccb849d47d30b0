//! History command: list past scans or replay one.

use crate::analysis::ScanIntent;
use crate::baas::{replay, BaasClient, BaasStore, HistoryFilter, Page, Session};
use crate::config::Config;
use crate::format::Formatter;
use anyhow::{bail, Context, Result};
use tracing::info;

/// Listing options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub intent: Option<ScanIntent>,
    pub search: Option<String>,
    /// Zero-based page number
    pub page: usize,
    /// Replay this scan instead of listing
    pub show: Option<String>,
}

/// Lists or replays stored scans for the signed-in user.
pub struct HistoryCommand {
    config: Config,
    session: Session,
}

impl HistoryCommand {
    /// Creates a new history command.
    pub fn new(config: Config, session: Session) -> Self {
        Self { config, session }
    }

    /// Executes the query and returns formatted output.
    pub async fn execute(&self, query: &HistoryQuery) -> Result<String> {
        let store = BaasClient::new(&self.config)
            .context("Failed to create BaaS client")?
            .with_session(Some(&self.session));

        self.execute_with_client(&store, query).await
    }

    /// Executes the query with a provided store (for testing).
    pub async fn execute_with_client(
        &self,
        store: &impl BaasStore,
        query: &HistoryQuery,
    ) -> Result<String> {
        let formatter = Formatter::new(self.config.format);

        if let Some(scan_id) = &query.show {
            info!("Replaying scan {}", scan_id);
            let Some(record) = store.get_scan(scan_id).await? else {
                bail!("Scan not found: {}", scan_id);
            };
            return Ok(formatter.format_scan(&replay(&record)));
        }

        let page = Page::nth(query.page, self.config.history_page_size);
        let records = store.history(&self.session.user_id, page).await?;

        let filter = HistoryFilter { intent: query.intent, query: query.search.clone() };
        let entries = filter.apply(&records);

        info!("{} of {} scans match", entries.len(), records.len());
        Ok(formatter.format_history(&entries))
    }
}
