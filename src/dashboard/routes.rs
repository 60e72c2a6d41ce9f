//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::engine::controller::{AutomationController, LoopKind, LoopPhase};
use crate::panel::{ControlPanel, PanelView, ThresholdUpdate};
use crate::types::ThresholdInputs;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub panel: Arc<ControlPanel>,
    pub controller: Mutex<AutomationController>,
}

impl DashboardState {
    pub fn new(panel: Arc<ControlPanel>, controller: AutomationController) -> Self {
        Self {
            panel,
            controller: Mutex::new(controller),
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PanelResponse {
    pub loaded_at: DateTime<Utc>,
    pub inputs: ThresholdInputs,
    pub price_refresh: LoopPhase,
    pub auto_buy: LoopPhase,
    #[serde(flatten)]
    pub view: PanelView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleResponse {
    pub kind: LoopKind,
    pub phase: LoopPhase,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /api/panel
pub async fn get_panel(State(state): State<AppState>) -> Json<PanelResponse> {
    let (price_refresh, auto_buy) = {
        let controller = state.controller.lock().await;
        (
            controller.phase(LoopKind::PriceRefresh),
            controller.phase(LoopKind::AutoBuy),
        )
    };

    Json(PanelResponse {
        loaded_at: state.panel.loaded_at(),
        inputs: state.panel.inputs().await,
        price_refresh,
        auto_buy,
        view: state.panel.view().await,
    })
}

/// PUT /api/thresholds
pub async fn put_thresholds(
    State(state): State<AppState>,
    Json(update): Json<ThresholdUpdate>,
) -> Json<ThresholdInputs> {
    Json(state.panel.update_inputs(update).await)
}

/// POST /api/toggle/:kind
pub async fn post_toggle(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<ToggleResponse>, StatusCode> {
    let kind = match kind.as_str() {
        "price-refresh" => LoopKind::PriceRefresh,
        "auto-buy" => LoopKind::AutoBuy,
        _ => return Err(StatusCode::NOT_FOUND),
    };

    let phase = state.controller.lock().await.toggle(kind).await;

    Ok(Json(ToggleResponse {
        kind,
        phase,
        label: kind.label(phase),
    }))
}
