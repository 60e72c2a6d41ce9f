//! Strategy: threshold classification of every commodity on the exchange.

pub mod threshold;

use tracing::debug;

use crate::types::{CommodityReport, MarketSnapshot, Thresholds};

/// Classify every observation in a snapshot, preserving snapshot order.
pub fn evaluate_market(snapshot: &MarketSnapshot, thresholds: &Thresholds) -> Vec<CommodityReport> {
    snapshot
        .observations
        .iter()
        .map(|observation| {
            let classification = threshold::classify(
                observation,
                thresholds,
                snapshot.capacity,
                snapshot.available_merchants,
            );
            debug!(
                commodity = %observation.commodity,
                price = observation.price,
                stock = observation.stock,
                sellable = classification.sellable,
                quantity = classification.sell_quantity,
                buyable = classification.buyable,
                "Commodity classified"
            );
            CommodityReport {
                observation: *observation,
                classification,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Commodity, Observation};

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            observations: vec![
                Observation {
                    commodity: Commodity::Wood,
                    price: 100.0,
                    stock: 2000.0,
                },
                Observation {
                    commodity: Commodity::Stone,
                    price: 200.0,
                    stock: 5000.0,
                },
                Observation {
                    commodity: Commodity::Iron,
                    price: 0.0,
                    stock: 5000.0,
                },
            ],
            capacity: 10000.0,
            available_merchants: 4,
        }
    }

    #[test]
    fn test_evaluate_market() {
        let reports = evaluate_market(&snapshot(), &Thresholds::new(150.0, 150.0, 500.0));
        assert_eq!(reports.len(), 3);

        let wood = &reports[0];
        assert_eq!(wood.observation.commodity, Commodity::Wood);
        assert!(wood.classification.sellable);
        assert_eq!(wood.classification.sell_quantity, 18);
        assert_eq!(wood.classification.bounded_quantity, 4);
        assert!(!wood.classification.buyable);

        let stone = &reports[1];
        assert!(!stone.classification.sellable);
        assert!(stone.classification.buyable);

        let iron = &reports[2];
        assert!(!iron.classification.sellable);
        assert!(!iron.classification.buyable);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let t = Thresholds::new(150.0, 150.0, 500.0);
        assert_eq!(evaluate_market(&snapshot(), &t), evaluate_market(&snapshot(), &t));
    }
}
