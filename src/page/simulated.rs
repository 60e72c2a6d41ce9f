//! In-memory paper exchange.
//!
//! Renders its state as exchange-page markup and answers selector queries
//! against it, so the agent exercises the same selector contract it would
//! against a live page. Purchases are credited to stock (clamped to
//! storage capacity) when the confirm control is clicked.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Mutex;
use tracing::{debug, info};

use super::{dom, MarketPage, PageSelectors};
use crate::types::{Commodity, Element};

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CommoditySeed {
    pub commodity: Commodity,
    pub price: f64,
    pub stock: f64,
}

/// Initial state of the paper exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeSeed {
    pub capacity: f64,
    pub merchants: u64,
    #[serde(default = "default_buy_enabled")]
    pub buy_enabled: bool,
    pub commodities: Vec<CommoditySeed>,
}

fn default_buy_enabled() -> bool {
    true
}

impl Default for ExchangeSeed {
    fn default() -> Self {
        Self {
            capacity: 24_000.0,
            merchants: 12,
            buy_enabled: true,
            commodities: vec![
                CommoditySeed {
                    commodity: Commodity::Wood,
                    price: 160.0,
                    stock: 8_500.0,
                },
                CommoditySeed {
                    commodity: Commodity::Stone,
                    price: 120.0,
                    stock: 12_000.0,
                },
                CommoditySeed {
                    commodity: Commodity::Iron,
                    price: 210.0,
                    stock: 4_300.0,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MarketState {
    commodity: Commodity,
    price: f64,
    stock: f64,
    offer: Option<String>,
}

#[derive(Debug)]
struct ExchangeState {
    markets: Vec<MarketState>,
    capacity: f64,
    merchants: u64,
    buy_enabled: bool,
    confirm_open: bool,
    purchases: u64,
}

impl ExchangeState {
    fn market_mut(&mut self, commodity: Commodity) -> Option<&mut MarketState> {
        self.markets.iter_mut().find(|m| m.commodity == commodity)
    }

    fn render(&self) -> String {
        let mut html = String::from("<html><body><div id=\"content_value\">");
        for m in &self.markets {
            let id = m.commodity.as_str();
            let _ = write!(
                html,
                "<div id=\"premium_exchange_rate_{id}\">\
                 <div class=\"premium-exchange-sep\">{}</div></div>\
                 <span id=\"{id}\">{}</span>\
                 <input data-resource=\"{id}\" data-type=\"buy\" value=\"{}\">",
                m.price.round() as i64,
                group_thousands(m.stock.round() as i64),
                m.offer.as_deref().unwrap_or(""),
            );
        }
        let _ = write!(
            html,
            "<span id=\"storage\">{}</span>\
             <span id=\"market_merchant_available_count\">{}</span>\
             <button class=\"btn btn-premium-exchange-buy\"{}>Calculate best offer</button>",
            group_thousands(self.capacity.round() as i64),
            self.merchants,
            if self.buy_enabled { "" } else { " disabled" },
        );
        if self.confirm_open {
            html.push_str(
                "<div class=\"confirmation-box\">\
                 <button class=\"btn btn-confirm-yes\">Confirm</button></div>",
            );
        }
        html.push_str("</div></body></html>");
        html
    }
}

/// Format an integer with comma thousands separators, as the page does.
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// SimulatedExchange
// ---------------------------------------------------------------------------

pub struct SimulatedExchange {
    selectors: PageSelectors,
    state: Mutex<ExchangeState>,
}

impl SimulatedExchange {
    pub fn new(seed: ExchangeSeed, selectors: PageSelectors) -> Self {
        let markets = seed
            .commodities
            .into_iter()
            .map(|c| MarketState {
                commodity: c.commodity,
                price: c.price,
                stock: c.stock,
                offer: None,
            })
            .collect();
        Self {
            selectors,
            state: Mutex::new(ExchangeState {
                markets,
                capacity: seed.capacity,
                merchants: seed.merchants,
                buy_enabled: seed.buy_enabled,
                confirm_open: false,
                purchases: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ExchangeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current page markup.
    pub fn markup(&self) -> String {
        self.lock().render()
    }

    pub fn set_price(&self, commodity: Commodity, price: f64) {
        if let Some(m) = self.lock().market_mut(commodity) {
            m.price = price;
        }
    }

    pub fn set_buy_enabled(&self, enabled: bool) {
        self.lock().buy_enabled = enabled;
    }

    pub fn stock(&self, commodity: Commodity) -> Option<f64> {
        self.lock().markets.iter().find(|m| m.commodity == commodity).map(|m| m.stock)
    }

    /// Number of confirmed orders so far.
    pub fn purchases(&self) -> u64 {
        self.lock().purchases
    }
}

#[async_trait]
impl MarketPage for SimulatedExchange {
    async fn text(&self, selector: &str) -> Option<String> {
        let markup = self.markup();
        dom::select_text(&markup, selector)
    }

    async fn query(&self, selector: &str) -> Option<Element> {
        let markup = self.markup();
        dom::select_element(&markup, selector)
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<()> {
        let target = Commodity::ALL
            .into_iter()
            .find(|c| self.selectors.offer_input_for(*c) == selector);

        let mut state = self.lock();
        if !dom::exists(&state.render(), selector) {
            bail!("No input matches {selector}");
        }
        let Some(market) = target.and_then(|c| state.market_mut(c)) else {
            bail!("{selector} is not an offer input");
        };
        market.offer = Some(value.to_string());
        debug!(commodity = %market.commodity, value, "Offer input written");
        Ok(())
    }

    async fn click(&self, element: &Element) -> Result<()> {
        let mut state = self.lock();

        if element.selector == self.selectors.compute_offer {
            if !state.buy_enabled {
                bail!("Buy control is disabled");
            }
            state.confirm_open = state.markets.iter().any(|m| {
                m.offer
                    .as_deref()
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(0.0)
                    > 0.0
            });
            return Ok(());
        }

        if element.selector == self.selectors.confirm {
            if !state.confirm_open {
                bail!("Confirmation dialog is not open");
            }
            let capacity = state.capacity;
            for market in &mut state.markets {
                let amount = market
                    .offer
                    .take()
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(0.0);
                if amount > 0.0 {
                    market.stock = (market.stock + amount).min(capacity);
                    info!(
                        commodity = %market.commodity,
                        amount,
                        stock = market.stock,
                        "[PAPER] Order filled"
                    );
                }
            }
            state.confirm_open = false;
            state.purchases += 1;
            return Ok(());
        }

        bail!("Nothing to click at {}", element.selector)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
