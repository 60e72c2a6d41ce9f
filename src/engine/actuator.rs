//! Purchase actuator.
//!
//! Drives the exchange page through one buy order: write the offer,
//! compute the best offer, confirm. Success is inferred from the controls
//! becoming available; the page gives no acknowledgement.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::engine::retry::{await_interactive_element, RetryPolicy};
use crate::page::{MarketPage, PageSelectors};
use crate::types::{Observation, PurchaseReceipt, TraderError};

/// Fraction of the observed price written as the offer amount.
pub const OFFER_FRACTION: f64 = 0.5;

/// Offer amount for an observed price.
pub fn offer_amount(price: f64) -> f64 {
    price * OFFER_FRACTION
}

pub struct Purchaser {
    page: Arc<dyn MarketPage>,
    selectors: PageSelectors,
    retry: RetryPolicy,
}

impl Purchaser {
    pub fn new(page: Arc<dyn MarketPage>, selectors: PageSelectors, retry: RetryPolicy) -> Self {
        Self {
            page,
            selectors,
            retry,
        }
    }

    /// Submit one buy order for an observation already classified buyable.
    ///
    /// Each control wait has its own attempt budget. On `RetryExhausted`
    /// the page is left mid-transaction; the next tick starts over from a
    /// fresh read.
    pub async fn purchase(
        &self,
        observation: &Observation,
    ) -> Result<PurchaseReceipt, TraderError> {
        let commodity = observation.commodity;
        let amount = offer_amount(observation.price);
        let input = self.selectors.offer_input_for(commodity);

        self.page
            .set_value(&input, &amount.to_string())
            .await
            .map_err(|e| TraderError::Page(format!("{e:#}")))?;
        debug!(%commodity, amount, "Offer written");

        let compute = await_interactive_element(
            self.page.as_ref(),
            &self.selectors.compute_offer,
            &self.retry,
        )
        .await?;
        self.page
            .click(&compute)
            .await
            .map_err(|e| TraderError::Page(format!("{e:#}")))?;

        let confirm =
            await_interactive_element(self.page.as_ref(), &self.selectors.confirm, &self.retry)
                .await?;
        self.page
            .click(&confirm)
            .await
            .map_err(|e| TraderError::Page(format!("{e:#}")))?;

        let receipt = PurchaseReceipt {
            id: uuid::Uuid::new_v4(),
            commodity,
            observed_price: observation.price,
            offer_amount: amount,
            submitted_at: Utc::now(),
        };

        info!(
            %commodity,
            price = observation.price,
            amount,
            order = %receipt.id,
            "Buy order submitted"
        );

        Ok(receipt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
