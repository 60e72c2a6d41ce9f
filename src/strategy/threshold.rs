//! Threshold rules.
//!
//! Pure, deterministic predicates deciding whether a commodity is worth
//! selling or buying at the current rate. Any non-positive price or
//! non-finite input yields "no" rather than an error.

use crate::types::{Classification, Observation, Thresholds};

/// Stock buffer subtracted before the reserve check, per unit of price.
pub const SELL_BUFFER: f64 = 1.2;

/// Headroom added to stock before the capacity check, per unit of price.
pub const BUY_BUFFER: f64 = 0.9;

fn usable(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// `price < sell_threshold` and stock minus the sell buffer stays above
/// the reserve.
pub fn is_sellable(price: f64, stock: f64, sell_threshold: f64, keep_resources: f64) -> bool {
    if price <= 0.0 || !usable(&[price, stock, sell_threshold, keep_resources]) {
        return false;
    }
    price < sell_threshold && (stock - price * SELL_BUFFER) > keep_resources
}

/// Number of sell operations that leave stock above the buffer.
///
/// Returns 0 for a non-positive price or when nothing is left after the
/// buffer. Only meaningful when [`is_sellable`] holds.
pub fn sellable_quantity(price: f64, stock: f64) -> u64 {
    if price <= 0.0 || !usable(&[price, stock]) {
        return 0;
    }
    let times = ((stock - price * SELL_BUFFER) / price).floor();
    if times <= 0.0 {
        0
    } else {
        times as u64
    }
}

/// `price > buy_threshold` and a purchase would not overflow storage.
pub fn is_buyable(price: f64, stock: f64, buy_threshold: f64, max_capacity: f64) -> bool {
    if price <= 0.0 || !usable(&[price, stock, buy_threshold, max_capacity]) {
        return false;
    }
    price > buy_threshold && (stock + price * BUY_BUFFER) < max_capacity
}

/// Cap a quantity by the merchants available to carry it.
pub fn bounded_quantity(quantity: u64, available_merchants: u64) -> u64 {
    quantity.min(available_merchants)
}

/// Classify one observation against the thresholds.
pub fn classify(
    observation: &Observation,
    thresholds: &Thresholds,
    capacity: f64,
    available_merchants: u64,
) -> Classification {
    let Observation { price, stock, .. } = *observation;

    let sellable = is_sellable(price, stock, thresholds.sell_threshold, thresholds.keep_resources);
    let sell_quantity = if sellable { sellable_quantity(price, stock) } else { 0 };

    Classification {
        sellable,
        sell_quantity,
        bounded_quantity: bounded_quantity(sell_quantity, available_merchants),
        buyable: is_buyable(price, stock, thresholds.buy_threshold, capacity),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
