//! Price-refresh tick: read the page, classify, render the panel.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::engine::controller::TickAction;
use crate::engine::extractor::{read_thresholds, ReadingsExtractor};
use crate::page::MarketPage;
use crate::panel::ControlPanel;
use crate::strategy::evaluate_market;
use crate::types::{CommodityReport, TraderError};

pub struct DisplayRefresher {
    page: Arc<dyn MarketPage>,
    extractor: ReadingsExtractor,
    panel: Arc<ControlPanel>,
}

impl DisplayRefresher {
    pub fn new(
        page: Arc<dyn MarketPage>,
        extractor: ReadingsExtractor,
        panel: Arc<ControlPanel>,
    ) -> Self {
        Self {
            page,
            extractor,
            panel,
        }
    }

    /// Run one refresh. On extraction failure the panel keeps its previous
    /// cells.
    pub async fn refresh(&self) -> Result<Vec<CommodityReport>, TraderError> {
        let snapshot = self.extractor.extract(self.page.as_ref()).await?;
        let thresholds = read_thresholds(&self.panel.inputs().await);
        let reports = evaluate_market(&snapshot, &thresholds);

        self.panel.render(&snapshot, &thresholds, &reports).await;
        debug!(
            buyable = reports.iter().filter(|r| r.classification.buyable).count(),
            sellable = reports.iter().filter(|r| r.classification.sellable).count(),
            "Panel refreshed"
        );
        Ok(reports)
    }
}

#[async_trait]
impl TickAction for DisplayRefresher {
    async fn tick(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Price refresh skipped");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
