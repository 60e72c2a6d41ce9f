//! Buy ticks and automation loops end to end.

use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use premium_trader::engine::actuator::Purchaser;
use premium_trader::engine::auto_buy::{AutoBuyer, BuyOutcome};
use premium_trader::engine::controller::{AutomationController, LoopKind, LoopPhase, TickAction};
use premium_trader::engine::display::DisplayRefresher;
use premium_trader::engine::extractor::ReadingsExtractor;
use premium_trader::engine::retry::RetryPolicy;
use premium_trader::page::simulated::{ExchangeSeed, SimulatedExchange};
use premium_trader::page::{MarketPage, PageSelectors};
use premium_trader::panel::ControlPanel;
use premium_trader::types::{Commodity, ThresholdInputs, TraderError};

use crate::mock_page::{ControlScript, PageAction, ScriptedPage};

fn panel(buy_threshold: f64) -> Arc<ControlPanel> {
    Arc::new(ControlPanel::new(ThresholdInputs::from_values(
        Some(buy_threshold),
        Some(150.0),
        Some(500.0),
    )))
}

fn auto_buyer(page: Arc<dyn MarketPage>, panel: Arc<ControlPanel>) -> AutoBuyer {
    let selectors = PageSelectors::default();
    let purchaser = Purchaser::new(page.clone(), selectors.clone(), RetryPolicy::default());
    AutoBuyer::new(page, selectors, purchaser, panel)
}

// ---------------------------------------------------------------------------
// Buy ticks
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn disabled_buy_control_skips_whole_tick() {
    let page = ScriptedPage::market([(200.0, 5000.0); 3], 10_000.0, 5);
    let s = PageSelectors::default();
    page.set_control(
        &s.compute_offer,
        ControlScript {
            hidden_for: 0,
            disabled: true,
        },
    );

    let buyer = auto_buyer(Arc::new(page.clone()), panel(150.0));
    let err = buyer.run_tick().await.unwrap_err();

    assert_eq!(err, TraderError::SkippedByPolicy);
    assert!(page.actions().is_empty());
    assert_eq!(page.queries(&s.confirm), 0);
}

#[tokio::test(start_paused = true)]
async fn buys_only_the_buyable_commodity() {
    let page = ScriptedPage::market(
        [(100.0, 2000.0), (200.0, 5000.0), (120.0, 100.0)],
        10_000.0,
        5,
    );
    let s = PageSelectors::default();

    let buyer = auto_buyer(Arc::new(page.clone()), panel(150.0));
    let report = buyer.run_tick().await.unwrap();

    assert_eq!(report.purchased(), 1);
    assert_eq!(
        page.actions(),
        vec![
            PageAction::SetValue {
                selector: s.offer_input_for(Commodity::Stone),
                value: "100".into(),
            },
            PageAction::Click { selector: s.compute_offer.clone() },
            PageAction::Click { selector: s.confirm.clone() },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn exhausted_retry_does_not_block_next_commodity() {
    let page = ScriptedPage::market(
        [(200.0, 1000.0), (180.0, 1000.0), (100.0, 1000.0)],
        10_000.0,
        5,
    );
    let s = PageSelectors::default();
    // wood burns through all ten confirm polls; stone finds it on the next
    page.set_control(
        &s.confirm,
        ControlScript {
            hidden_for: 10,
            disabled: false,
        },
    );

    let buyer = auto_buyer(Arc::new(page.clone()), panel(150.0));
    let report = buyer.run_tick().await.unwrap();

    assert!(matches!(
        &report.outcomes[0],
        (Commodity::Wood, BuyOutcome::Failed(TraderError::RetryExhausted { attempts: 10, .. }))
    ));
    assert!(matches!(
        &report.outcomes[1],
        (Commodity::Stone, BuyOutcome::Purchased(r)) if r.offer_amount == 90.0
    ));
    assert!(matches!(&report.outcomes[2], (Commodity::Iron, BuyOutcome::NotBuyable)));
    assert_eq!(page.queries(&s.confirm), 11);
    assert_eq!(page.clicks(&s.confirm), 1);
    assert_eq!(page.clicks(&s.compute_offer), 2);
}

#[tokio::test(start_paused = true)]
async fn missing_offer_input_fails_only_that_commodity() {
    let page = ScriptedPage::market([(200.0, 1000.0); 3], 10_000.0, 5);
    let s = PageSelectors::default();
    page.remove_input(&s.offer_input_for(Commodity::Wood));

    let buyer = auto_buyer(Arc::new(page.clone()), panel(150.0));
    let report = buyer.run_tick().await.unwrap();

    assert!(matches!(
        &report.outcomes[0],
        (Commodity::Wood, BuyOutcome::Failed(TraderError::Page(_)))
    ));
    assert_eq!(report.purchased(), 2);
    assert_eq!(report.failed(), 1);
}

#[tokio::test(start_paused = true)]
async fn unreadable_commodity_is_skipped() {
    let page = ScriptedPage::market([(200.0, 1000.0); 3], 10_000.0, 5);
    let s = PageSelectors::default();
    page.remove_text(&s.price_for(Commodity::Iron));

    let buyer = auto_buyer(Arc::new(page.clone()), panel(150.0));
    let report = buyer.run_tick().await.unwrap();

    assert!(matches!(
        &report.outcomes[2],
        (Commodity::Iron, BuyOutcome::Failed(TraderError::Extraction { .. }))
    ));
    assert_eq!(report.purchased(), 2);
}

// ---------------------------------------------------------------------------
// Loops
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn auto_buy_loop_against_simulated_exchange() {
    let sim = Arc::new(SimulatedExchange::new(ExchangeSeed::default(), PageSelectors::default()));
    let page: Arc<dyn MarketPage> = sim.clone();
    let panel = panel(150.0);

    let refresher = DisplayRefresher::new(
        page.clone(),
        ReadingsExtractor::new(PageSelectors::default()),
        panel.clone(),
    );
    let refresher: Arc<dyn TickAction> = Arc::new(refresher);
    let buyer: Arc<dyn TickAction> = Arc::new(auto_buyer(page, panel.clone()));
    let mut controller = AutomationController::new(
        panel.clone(),
        (Duration::from_secs(5), refresher),
        (Duration::from_secs(5), buyer),
    );

    assert_eq!(controller.toggle(LoopKind::AutoBuy).await, LoopPhase::Enabled);
    // tick at 5s; wood done at 7s, iron at 9s
    time::sleep(Duration::from_millis(9_500)).await;
    assert_eq!(sim.purchases(), 2);
    assert_eq!(sim.stock(Commodity::Wood), Some(8_580.0));

    assert_eq!(controller.toggle(LoopKind::AutoBuy).await, LoopPhase::Disabled);
    time::sleep(Duration::from_secs(60)).await;
    assert_eq!(sim.purchases(), 2);
    assert_eq!(panel.view().await.auto_buy_label, "Toggle Auto Buy (OFF)");
}

#[tokio::test(start_paused = true)]
async fn price_refresh_loop_keeps_stale_cells_on_failure() {
    let rows = [(100.0, 2000.0), (200.0, 5000.0), (150.0, 750.0)];
    let page = ScriptedPage::market(rows, 10_000.0, 5);
    let s = PageSelectors::default();
    let panel = panel(150.0);

    let refresher = DisplayRefresher::new(
        Arc::new(page.clone()),
        ReadingsExtractor::new(PageSelectors::default()),
        panel.clone(),
    );
    let refresher: Arc<dyn TickAction> = Arc::new(refresher);
    let buyer: Arc<dyn TickAction> = Arc::new(auto_buyer(Arc::new(page.clone()), panel.clone()));
    let mut controller = AutomationController::new(
        panel.clone(),
        (Duration::from_secs(5), refresher),
        (Duration::from_secs(60), buyer),
    );

    controller.toggle(LoopKind::PriceRefresh).await;
    time::sleep(Duration::from_millis(5_500)).await;

    let view = panel.view().await;
    assert_eq!(view.rows[0].price, "100");
    assert_eq!(view.rows[0].sellable, "Yes");
    assert_eq!(view.rows[0].sell_quantity, "18");
    assert_eq!(view.rows[1].buyable, "Yes");

    page.set_text(&s.price_for(Commodity::Wood), "110");
    time::sleep(Duration::from_secs(5)).await;
    assert_eq!(panel.view().await.rows[0].price, "110");

    page.remove_text(&s.capacity);
    time::sleep(Duration::from_secs(5)).await;
    let stale = panel.view().await;
    assert_eq!(stale.rows[0].price, "110");
    assert_eq!(controller.phase(LoopKind::PriceRefresh), LoopPhase::Enabled);

    // the buy loop never ran
    assert!(page.actions().is_empty());
    controller.shutdown().await;
}
