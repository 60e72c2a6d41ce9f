//! Shared types for the premium-exchange trader.
//!
//! These types form the data model used across all modules: per-tick
//! observations read off the exchange page, the user's threshold
//! configuration, the derived classification, and the domain error
//! taxonomy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Commodity
// ---------------------------------------------------------------------------

/// A tradable resource on the premium exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commodity {
    Wood,
    Stone,
    Iron,
}

impl Commodity {
    /// Every commodity, in evaluation order.
    pub const ALL: [Commodity; 3] = [Commodity::Wood, Commodity::Stone, Commodity::Iron];

    /// Identifier used by the exchange page (`data-resource`, element ids).
    pub fn as_str(&self) -> &'static str {
        match self {
            Commodity::Wood => "wood",
            Commodity::Stone => "stone",
            Commodity::Iron => "iron",
        }
    }

    /// Human-readable row label for the control panel.
    pub fn label(&self) -> &'static str {
        match self {
            Commodity::Wood => "Wood",
            Commodity::Stone => "Stone",
            Commodity::Iron => "Iron",
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

/// Price and stock of one commodity, as read in a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub commodity: Commodity,
    /// Exchange rate shown on the page.
    pub price: f64,
    /// Units currently held in storage.
    pub stock: f64,
}

/// A full read of the exchange page. Each tick produces a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub observations: Vec<Observation>,
    /// Storage capacity shared by all commodities.
    pub capacity: f64,
    /// Merchants available to carry goods this tick.
    pub available_merchants: u64,
}

impl MarketSnapshot {
    pub fn observation(&self, commodity: Commodity) -> Option<&Observation> {
        self.observations.iter().find(|o| o.commodity == commodity)
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Raw, user-edited threshold fields.
///
/// Kept as text so that an empty or garbled field survives until the next
/// tick parses it; see [`Thresholds::parse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdInputs {
    #[serde(default)]
    pub buy_threshold: String,
    #[serde(default)]
    pub sell_threshold: String,
    #[serde(default)]
    pub keep_resources: String,
}

impl ThresholdInputs {
    pub fn from_values(buy: Option<f64>, sell: Option<f64>, keep: Option<f64>) -> Self {
        let text = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        Self {
            buy_threshold: text(buy),
            sell_threshold: text(sell),
            keep_resources: text(keep),
        }
    }
}

/// Parsed thresholds. Unparseable inputs become `NaN`, which every
/// predicate treats as "no decision".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub keep_resources: f64,
}

impl Thresholds {
    pub fn new(buy_threshold: f64, sell_threshold: f64, keep_resources: f64) -> Self {
        Self {
            buy_threshold,
            sell_threshold,
            keep_resources,
        }
    }

    /// Parse the three input fields. Never fails.
    pub fn parse(inputs: &ThresholdInputs) -> Self {
        Self {
            buy_threshold: parse_field(&inputs.buy_threshold),
            sell_threshold: parse_field(&inputs.sell_threshold),
            keep_resources: parse_field(&inputs.keep_resources),
        }
    }
}

fn parse_field(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Decision for one commodity. Derived every tick, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub sellable: bool,
    /// Sell operations that keep stock above the buffer (0 unless sellable).
    pub sell_quantity: u64,
    /// `sell_quantity` capped by available merchants.
    pub bounded_quantity: u64,
    pub buyable: bool,
}

/// An observation together with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommodityReport {
    pub observation: Observation,
    pub classification: Classification,
}

// ---------------------------------------------------------------------------
// Page elements
// ---------------------------------------------------------------------------

/// An interactive control found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Selector the element was resolved from.
    pub selector: String,
    pub disabled: bool,
}

impl Element {
    pub fn new(selector: impl Into<String>, disabled: bool) -> Self {
        Self {
            selector: selector.into(),
            disabled,
        }
    }

    pub fn is_interactive(&self) -> bool {
        !self.disabled
    }
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

/// Record of a submitted buy order. Submission is inferred from the
/// confirm control being clicked, not from any acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub id: uuid::Uuid,
    pub commodity: Commodity,
    pub observed_price: f64,
    pub offer_amount: f64,
    pub submitted_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors local to one tick or one purchase attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraderError {
    #[error("Extraction failed for {field}: {reason}")]
    Extraction {
        field: String,
        reason: String,
    },

    #[error("Element {selector} not interactive after {attempts} attempts")]
    RetryExhausted {
        selector: String,
        attempts: u32,
    },

    #[error("Buy tick skipped: buy control is disabled")]
    SkippedByPolicy,

    #[error("Page interaction failed: {0}")]
    Page(String),
}

impl TraderError {
    pub fn extraction(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TraderError::Extraction {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
