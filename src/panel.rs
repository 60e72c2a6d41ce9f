//! Control panel state.
//!
//! Holds what the user edits (threshold inputs) and what the display loop
//! renders (per-commodity cells, echoed settings, toggle labels). Cells
//! start as a dash placeholder and keep their last rendered value when a
//! refresh fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::engine::controller::{LoopKind, LoopPhase};
use crate::types::{Commodity, CommodityReport, MarketSnapshot, ThresholdInputs, Thresholds};

pub const PLACEHOLDER: &str = "-";

fn yes_no(flag: bool) -> String {
    let cell = if flag { "Yes" } else { "No" };
    cell.to_string()
}

fn number_cell(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        PLACEHOLDER.to_string()
    }
}

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// One rendered row of the market table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommodityRow {
    pub commodity: Commodity,
    pub label: String,
    pub price: String,
    pub stock: String,
    pub sellable: String,
    pub sell_quantity: String,
    pub bounded_quantity: String,
    pub buyable: String,
}

impl CommodityRow {
    fn placeholder(commodity: Commodity) -> Self {
        Self {
            commodity,
            label: commodity.label().to_string(),
            price: PLACEHOLDER.into(),
            stock: PLACEHOLDER.into(),
            sellable: PLACEHOLDER.into(),
            sell_quantity: PLACEHOLDER.into(),
            bounded_quantity: PLACEHOLDER.into(),
            buyable: PLACEHOLDER.into(),
        }
    }

    fn from_report(report: &CommodityReport) -> Self {
        let o = &report.observation;
        let c = &report.classification;
        Self {
            commodity: o.commodity,
            label: o.commodity.label().to_string(),
            price: number_cell(o.price),
            stock: number_cell(o.stock),
            sellable: yes_no(c.sellable),
            sell_quantity: c.sell_quantity.to_string(),
            bounded_quantity: c.bounded_quantity.to_string(),
            buyable: yes_no(c.buyable),
        }
    }
}

/// Everything the panel displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub rows: Vec<CommodityRow>,
    pub buy_threshold: String,
    pub sell_threshold: String,
    pub keep_resources: String,
    pub available_merchants: String,
    pub price_refresh_label: String,
    pub auto_buy_label: String,
    pub last_rendered: Option<DateTime<Utc>>,
}

impl Default for PanelView {
    fn default() -> Self {
        Self {
            rows: Commodity::ALL.into_iter().map(CommodityRow::placeholder).collect(),
            buy_threshold: PLACEHOLDER.into(),
            sell_threshold: PLACEHOLDER.into(),
            keep_resources: PLACEHOLDER.into(),
            available_merchants: PLACEHOLDER.into(),
            price_refresh_label: LoopKind::PriceRefresh.label(LoopPhase::Disabled),
            auto_buy_label: LoopKind::AutoBuy.label(LoopPhase::Disabled),
            last_rendered: None,
        }
    }
}

/// Partial edit of the threshold inputs. Absent fields are left as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdUpdate {
    pub buy_threshold: Option<String>,
    pub sell_threshold: Option<String>,
    pub keep_resources: Option<String>,
}

// ---------------------------------------------------------------------------
// ControlPanel
// ---------------------------------------------------------------------------

pub struct ControlPanel {
    loaded_at: DateTime<Utc>,
    inputs: RwLock<ThresholdInputs>,
    view: RwLock<PanelView>,
}

impl ControlPanel {
    pub fn new(inputs: ThresholdInputs) -> Self {
        Self {
            loaded_at: Utc::now(),
            inputs: RwLock::new(inputs),
            view: RwLock::new(PanelView::default()),
        }
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub async fn inputs(&self) -> ThresholdInputs {
        self.inputs.read().await.clone()
    }

    /// Current thresholds, parsed from the inputs.
    pub async fn thresholds(&self) -> Thresholds {
        Thresholds::parse(&*self.inputs.read().await)
    }

    pub async fn update_inputs(&self, update: ThresholdUpdate) -> ThresholdInputs {
        let mut inputs = self.inputs.write().await;
        if let Some(v) = update.buy_threshold {
            inputs.buy_threshold = v;
        }
        if let Some(v) = update.sell_threshold {
            inputs.sell_threshold = v;
        }
        if let Some(v) = update.keep_resources {
            inputs.keep_resources = v;
        }
        inputs.clone()
    }

    pub async fn view(&self) -> PanelView {
        self.view.read().await.clone()
    }

    /// Write a fresh set of readings and decisions into every cell.
    pub async fn render(
        &self,
        snapshot: &MarketSnapshot,
        thresholds: &Thresholds,
        reports: &[CommodityReport],
    ) {
        let mut view = self.view.write().await;
        view.rows = reports.iter().map(CommodityRow::from_report).collect();
        view.buy_threshold = number_cell(thresholds.buy_threshold);
        view.sell_threshold = number_cell(thresholds.sell_threshold);
        view.keep_resources = number_cell(thresholds.keep_resources);
        view.available_merchants = snapshot.available_merchants.to_string();
        view.last_rendered = Some(Utc::now());
    }

    pub async fn set_toggle_label(&self, kind: LoopKind, phase: LoopPhase) {
        let mut view = self.view.write().await;
        let label = kind.label(phase);
        match kind {
            LoopKind::PriceRefresh => view.price_refresh_label = label,
            LoopKind::AutoBuy => view.auto_buy_label = label,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
