//! Exchange page integration.
//!
//! Defines the `MarketPage` trait, the data source and actuator the
//! agent reads prices from and drives purchases through, plus the
//! CSS selector contract that locates every field on it.
//!
//! Implementations:
//! - `SimulatedExchange`: in-memory paper exchange rendered as markup

pub mod dom;
pub mod simulated;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::types::{Commodity, Element};

/// Abstraction over the exchange page.
///
/// Reads return `None` when nothing matches the selector. Writes fail when
/// the target element is absent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketPage: Send + Sync {
    /// Text content of the first element matching `selector`.
    async fn text(&self, selector: &str) -> Option<String>;

    /// Look up an interactive control.
    async fn query(&self, selector: &str) -> Option<Element>;

    /// Write a value into an input field.
    async fn set_value(&self, selector: &str, value: &str) -> Result<()>;

    /// Click a previously resolved control.
    async fn click(&self, element: &Element) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Selector contract
// ---------------------------------------------------------------------------

const RESOURCE_PLACEHOLDER: &str = "{resource}";

/// Selectors for every field the agent reads or writes.
///
/// Per-commodity selectors are templates where `{resource}` is replaced
/// by the commodity identifier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    pub price: String,
    pub stock: String,
    pub capacity: String,
    pub merchants: String,
    pub offer_input: String,
    /// Doubles as the buy-capability indicator.
    pub compute_offer: String,
    pub confirm: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            price: "#premium_exchange_rate_{resource} .premium-exchange-sep".into(),
            stock: "#{resource}".into(),
            capacity: "#storage".into(),
            merchants: "#market_merchant_available_count".into(),
            offer_input: r#"input[data-resource="{resource}"][data-type="buy"]"#.into(),
            compute_offer: ".btn-premium-exchange-buy".into(),
            confirm: "button.btn-confirm-yes".into(),
        }
    }
}

impl PageSelectors {
    pub fn price_for(&self, commodity: Commodity) -> String {
        self.price.replace(RESOURCE_PLACEHOLDER, commodity.as_str())
    }

    pub fn stock_for(&self, commodity: Commodity) -> String {
        self.stock.replace(RESOURCE_PLACEHOLDER, commodity.as_str())
    }

    pub fn offer_input_for(&self, commodity: Commodity) -> String {
        self.offer_input.replace(RESOURCE_PLACEHOLDER, commodity.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
