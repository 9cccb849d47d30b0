//! Scan command: analyze, persist to history, map and render.

use crate::analysis::{submit, AnalysisApi, AnalysisClient, ImageSet, ScanIntent, SortMode};
use crate::baas::{
    unix_millis, BaasClient, BaasStore, NewPriceResult, NewScan, NewScanResult, Session,
};
use crate::config::Config;
use crate::format::Formatter;
use crate::mapping::{map_scan, ImageRefs, ScanView};
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// What to analyze and how.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub images: ImageSet,
    pub intent: ScanIntent,
    pub sort: SortMode,
    /// Persist to history when signed in
    pub save: bool,
}

/// Result of one scan run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRun {
    pub view: ScanView,
    /// Stored scan id, or a `temp-id-*` placeholder when saving failed.
    /// `None` when nothing was persisted.
    pub scan_id: Option<String>,
}

/// Executes a scan.
pub struct ScanCommand {
    config: Config,
    session: Option<Session>,
}

impl ScanCommand {
    /// Creates a new scan command.
    pub fn new(config: Config, session: Option<Session>) -> Self {
        Self { config, session }
    }

    /// Runs the scan and returns formatted output.
    pub async fn execute(&self, request: &ScanRequest) -> Result<String> {
        let api = AnalysisClient::new(&self.config).context("Failed to create HTTP client")?;

        let store = match self.config.baas_credentials() {
            Some(_) if request.save && self.session.is_some() => Some(
                BaasClient::new(&self.config)
                    .context("Failed to create BaaS client")?
                    .with_session(self.session.as_ref()),
            ),
            _ => None,
        };

        let run = self
            .execute_with(&api, store.as_ref().map(|s| s as &dyn BaasStore), request)
            .await?;

        Ok(Formatter::new(self.config.format).format_scan(&run.view))
    }

    /// Runs the scan with provided clients (for testing).
    ///
    /// Only the analysis call can fail the scan; persistence problems are
    /// logged and skipped.
    pub async fn execute_with(
        &self,
        api: &impl AnalysisApi,
        store: Option<&dyn BaasStore>,
        request: &ScanRequest,
    ) -> Result<ScanRun> {
        info!("Scanning ({})", request.intent.label());

        let raw = submit(api, request.intent, &request.images, request.sort).await?;

        let mut images = ImageRefs {
            uploaded: None,
            front: request.images.front.as_ref().map(|p| p.display().to_string()),
            back: request.images.back.as_ref().map(|p| p.display().to_string()),
        };

        let target = match (store, self.session.as_ref()) {
            _ if !request.save => {
                debug!("Saving disabled for this scan");
                None
            }
            (Some(store), Some(session)) => Some((store, session)),
            (_, None) => {
                warn!("Not signed in; this scan will not be saved to history");
                None
            }
            (None, Some(_)) => {
                warn!("BaaS is not configured; this scan will not be saved to history");
                None
            }
        };

        let Some((store, session)) = target else {
            let view = map_scan(&raw, request.intent, &images);
            return Ok(ScanRun { view, scan_id: None });
        };

        if let Some(path) = request.images.primary() {
            match store.upload_image(&self.config.image_bucket, path).await {
                Ok(url) => images.uploaded = Some(url),
                Err(e) => warn!("Image upload failed, keeping local reference: {:#}", e),
            }
        }

        let new_scan = NewScan::image(&session.user_id, request.intent, images.uploaded.clone());
        let scan_id = match store.save_scan(&new_scan).await {
            Ok(record) => record.id,
            Err(e) => {
                warn!("Saving scan to history failed: {:#}", e);
                format!("temp-id-{}", unix_millis())
            }
        };

        let view = map_scan(&raw, request.intent, &images);

        let result = NewScanResult {
            scan_id: scan_id.clone(),
            authenticity_status: match request.intent {
                ScanIntent::Verify => "analyzed",
                _ => "info_only",
            }
            .to_string(),
            confidence_score: view.summary.confidence_percent,
            product_name: view.summary.name.clone(),
            brand: view.summary.brand.clone(),
            metadata: raw.as_value().clone(),
        };
        if let Err(e) = store.save_scan_result(&result).await {
            warn!("Saving scan result failed: {:#}", e);
        }

        if let Some(best) = view.price().and_then(|p| p.best()) {
            let price = NewPriceResult {
                scan_id: scan_id.clone(),
                seller: best.seller.clone(),
                price: best.amount,
                currency: best.currency.clone(),
                link: Some(best.link.clone()).filter(|l| !l.is_empty()),
            };
            if let Err(e) = store.save_price_result(&price).await {
                warn!("Saving price result failed: {:#}", e);
            }
        }

        Ok(ScanRun { view, scan_id: Some(scan_id) })
    }
}
