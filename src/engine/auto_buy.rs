//! Auto-buy tick.
//!
//! Checks the buy control, then walks the commodities in order, re-reading
//! the page before each decision and submitting an order for every one
//! classified buyable. A failure on one commodity does not stop the rest.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::engine::actuator::Purchaser;
use crate::engine::controller::TickAction;
use crate::engine::extractor::{read_thresholds, ReadingsExtractor};
use crate::page::{MarketPage, PageSelectors};
use crate::panel::ControlPanel;
use crate::strategy::threshold::is_buyable;
use crate::types::{Commodity, PurchaseReceipt, TraderError};

/// What happened to one commodity during a buy tick.
#[derive(Debug, Clone)]
pub enum BuyOutcome {
    Purchased(PurchaseReceipt),
    NotBuyable,
    Failed(TraderError),
}

/// Summary of one buy tick.
#[derive(Debug, Clone, Default)]
pub struct BuyTickReport {
    pub outcomes: Vec<(Commodity, BuyOutcome)>,
}

impl BuyTickReport {
    pub fn purchased(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, BuyOutcome::Purchased(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, BuyOutcome::Failed(_)))
            .count()
    }
}

pub struct AutoBuyer {
    page: Arc<dyn MarketPage>,
    selectors: PageSelectors,
    extractor: ReadingsExtractor,
    purchaser: Purchaser,
    panel: Arc<ControlPanel>,
}

impl AutoBuyer {
    pub fn new(
        page: Arc<dyn MarketPage>,
        selectors: PageSelectors,
        purchaser: Purchaser,
        panel: Arc<ControlPanel>,
    ) -> Self {
        Self {
            extractor: ReadingsExtractor::new(selectors.clone()),
            page,
            selectors,
            purchaser,
            panel,
        }
    }

    /// Run one buy tick.
    ///
    /// Returns `SkippedByPolicy` without touching anything when the buy
    /// control is present but disabled.
    pub async fn run_tick(&self) -> Result<BuyTickReport, TraderError> {
        if let Some(control) = self.page.query(&self.selectors.compute_offer).await {
            if control.disabled {
                return Err(TraderError::SkippedByPolicy);
            }
        }

        let thresholds = read_thresholds(&self.panel.inputs().await);
        let mut report = BuyTickReport::default();

        for commodity in Commodity::ALL {
            let outcome = match self.attempt(commodity, thresholds.buy_threshold).await {
                Ok(Some(receipt)) => BuyOutcome::Purchased(receipt),
                Ok(None) => BuyOutcome::NotBuyable,
                Err(e) => {
                    warn!(%commodity, error = %e, "Purchase attempt failed");
                    BuyOutcome::Failed(e)
                }
            };
            report.outcomes.push((commodity, outcome));
        }

        Ok(report)
    }

    async fn attempt(
        &self,
        commodity: Commodity,
        buy_threshold: f64,
    ) -> Result<Option<PurchaseReceipt>, TraderError> {
        let page = self.page.as_ref();
        let observation = self.extractor.observe(page, commodity).await?;
        let capacity = self.extractor.capacity(page).await?;

        if !is_buyable(observation.price, observation.stock, buy_threshold, capacity) {
            info!(
                %commodity,
                price = observation.price,
                stock = observation.stock,
                buy_threshold,
                capacity,
                "Not buying: not buyable"
            );
            return Ok(None);
        }

        info!(%commodity, price = observation.price, "Buying");
        self.purchaser.purchase(&observation).await.map(Some)
    }
}

#[async_trait]
impl TickAction for AutoBuyer {
    async fn tick(&self) {
        info!("Attempting to purchase resources");
        match self.run_tick().await {
            Ok(report) => info!(
                purchased = report.purchased(),
                failed = report.failed(),
                "Buy tick complete"
            ),
            Err(TraderError::SkippedByPolicy) => {
                info!("Not buying: buy control is unavailable")
            }
            Err(e) => warn!(error = %e, "Buy tick aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
