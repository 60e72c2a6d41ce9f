//! Readings extractor.
//!
//! Turns the text fields rendered by the exchange page into a typed
//! `MarketSnapshot`. Readings are whole numbers; grouping punctuation and
//! other decorations are stripped before parsing.

use tracing::debug;

use crate::page::{MarketPage, PageSelectors};
use crate::types::{
    Commodity, MarketSnapshot, Observation, ThresholdInputs, Thresholds, TraderError,
};

/// Parse a numeric reading such as `"1,234"` or `" 125 "`.
///
/// Keeps ASCII digits and a leading minus sign; everything else is
/// decoration. Fails when no digit remains.
pub fn parse_reading(field: &str, raw: &str) -> Result<f64, TraderError> {
    let trimmed = raw.trim();
    let negative = trimmed.starts_with('-');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return Err(TraderError::extraction(
            field,
            format!("no numeric content in {raw:?}"),
        ));
    }

    let value = digits
        .parse::<f64>()
        .map_err(|e| TraderError::extraction(field, e.to_string()))?;

    Ok(if negative { -value } else { value })
}

/// Parse the user's threshold inputs. Unparseable fields become `NaN`.
pub fn read_thresholds(inputs: &ThresholdInputs) -> Thresholds {
    Thresholds::parse(inputs)
}

pub struct ReadingsExtractor {
    selectors: PageSelectors,
}

impl ReadingsExtractor {
    pub fn new(selectors: PageSelectors) -> Self {
        Self { selectors }
    }

    async fn reading(&self, page: &dyn MarketPage, selector: &str) -> Result<f64, TraderError> {
        let raw = page
            .text(selector)
            .await
            .ok_or_else(|| TraderError::extraction(selector, "element not found"))?;
        parse_reading(selector, &raw)
    }

    /// Read price and stock for one commodity.
    pub async fn observe(
        &self,
        page: &dyn MarketPage,
        commodity: Commodity,
    ) -> Result<Observation, TraderError> {
        let price = self.reading(page, &self.selectors.price_for(commodity)).await?;
        let stock = self.reading(page, &self.selectors.stock_for(commodity)).await?;
        Ok(Observation {
            commodity,
            price,
            stock,
        })
    }

    /// Read the storage capacity shared by all commodities.
    pub async fn capacity(&self, page: &dyn MarketPage) -> Result<f64, TraderError> {
        self.reading(page, &self.selectors.capacity).await
    }

    /// Read every commodity plus the shared capacity and merchant figures.
    pub async fn extract(&self, page: &dyn MarketPage) -> Result<MarketSnapshot, TraderError> {
        let mut observations = Vec::with_capacity(Commodity::ALL.len());
        for commodity in Commodity::ALL {
            observations.push(self.observe(page, commodity).await?);
        }

        let capacity = self.capacity(page).await?;
        let merchants = self.reading(page, &self.selectors.merchants).await?;

        let snapshot = MarketSnapshot {
            observations,
            capacity,
            available_merchants: merchants.max(0.0) as u64,
        };

        debug!(
            capacity = snapshot.capacity,
            merchants = snapshot.available_merchants,
            "Market snapshot extracted"
        );

        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
