//! Premium Trader: threshold-driven auto-buy agent.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the exchange page, control panel and both automation loops,
//! serves the control panel and waits for Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use premium_trader::config::AppConfig;
use premium_trader::dashboard::{self, routes::DashboardState};
use premium_trader::engine::actuator::Purchaser;
use premium_trader::engine::auto_buy::AutoBuyer;
use premium_trader::engine::controller::{AutomationController, LoopKind, TickAction};
use premium_trader::engine::display::DisplayRefresher;
use premium_trader::engine::extractor::ReadingsExtractor;
use premium_trader::page::simulated::SimulatedExchange;
use premium_trader::page::MarketPage;
use premium_trader::panel::ControlPanel;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load(&AppConfig::default_path())?;

    init_logging();

    info!(
        agent_name = %cfg.agent.name,
        price_refresh_ms = cfg.agent.price_refresh_interval_ms,
        auto_buy_ms = cfg.agent.auto_buy_interval_ms,
        poll_ms = cfg.retry.poll_interval_ms,
        max_attempts = cfg.retry.max_attempts,
        "Premium Trader starting up"
    );

    // -- Initialise components -------------------------------------------

    let page: Arc<dyn MarketPage> =
        Arc::new(SimulatedExchange::new(cfg.simulation.clone(), cfg.page.clone()));
    warn!("Running against the simulated exchange; no real orders are placed");

    let panel = Arc::new(ControlPanel::new(cfg.thresholds.to_inputs()));

    let refresher: Arc<dyn TickAction> = Arc::new(DisplayRefresher::new(
        page.clone(),
        ReadingsExtractor::new(cfg.page.clone()),
        panel.clone(),
    ));

    let purchaser = Purchaser::new(page.clone(), cfg.page.clone(), cfg.retry.clone());
    let buyer: Arc<dyn TickAction> = Arc::new(AutoBuyer::new(
        page.clone(),
        cfg.page.clone(),
        purchaser,
        panel.clone(),
    ));

    let mut controller = AutomationController::new(
        panel.clone(),
        (cfg.agent.price_refresh_interval(), refresher),
        (cfg.agent.auto_buy_interval(), buyer),
    );

    if cfg.agent.start_price_refresh {
        controller.toggle(LoopKind::PriceRefresh).await;
    }
    if cfg.agent.start_auto_buy {
        controller.toggle(LoopKind::AutoBuy).await;
    }

    let state = Arc::new(DashboardState::new(panel, controller));

    if cfg.dashboard.enabled {
        dashboard::spawn_dashboard(state.clone(), cfg.dashboard.port).await?;
    } else {
        info!("Dashboard disabled; loops can only be started from config");
    }

    // -- Run until interrupted -------------------------------------------

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");

    state.controller.lock().await.shutdown().await;
    info!("Premium Trader shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("premium_trader=info"));

    let json_logging = std::env::var("PREMIUM_TRADER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
