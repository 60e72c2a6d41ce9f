//! Automation loop controller.
//!
//! Two independent timer loops (price refresh, auto-buy), each a two-state
//! machine flipped only by its own toggle. Disabling a loop stops future
//! ticks; a tick already running completes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::panel::ControlPanel;

// ---------------------------------------------------------------------------
// Loop identity and phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopKind {
    PriceRefresh,
    AutoBuy,
}

impl LoopKind {
    fn title(&self) -> &'static str {
        match self {
            LoopKind::PriceRefresh => "Toggle Prices Update",
            LoopKind::AutoBuy => "Toggle Auto Buy",
        }
    }

    /// Toggle label for a phase, e.g. `Toggle Auto Buy (ON)`.
    pub fn label(&self, phase: LoopPhase) -> String {
        format!("{} ({})", self.title(), phase.flag())
    }
}

impl std::fmt::Display for LoopKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopKind::PriceRefresh => write!(f, "price-refresh"),
            LoopKind::AutoBuy => write!(f, "auto-buy"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopPhase {
    Disabled,
    Enabled,
}

impl LoopPhase {
    pub fn flag(&self) -> &'static str {
        match self {
            LoopPhase::Disabled => "OFF",
            LoopPhase::Enabled => "ON",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            LoopPhase::Disabled => LoopPhase::Enabled,
            LoopPhase::Enabled => LoopPhase::Disabled,
        }
    }
}

// ---------------------------------------------------------------------------
// Tick action
// ---------------------------------------------------------------------------

/// Work performed on every firing of a loop. Failures are handled inside
/// the action; they never reach the timer.
#[async_trait]
pub trait TickAction: Send + Sync {
    async fn tick(&self);
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A running loop timer.
pub struct TimerHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Start firing `action` every `period`, first firing after one period.
    /// A zero period is raised to one millisecond.
    pub fn spawn(kind: LoopKind, period: Duration, action: Arc<dyn TickAction>) -> Self {
        let period = period.max(MIN_PERIOD);
        let (stop, mut stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        debug!(%kind, "Tick");
                        action.tick().await;
                    }
                }
            }
            debug!(%kind, "Timer stopped");
        });
        Self { stop, task }
    }

    /// Signal the timer to stop. Returns the task so callers may wait for
    /// an in-flight tick to finish.
    pub fn cancel(self) -> JoinHandle<()> {
        drop(self.stop);
        self.task
    }
}

// ---------------------------------------------------------------------------
// Loop state
// ---------------------------------------------------------------------------

/// Enable flag plus the timer it owns. `enabled` holds iff a timer is stored.
pub struct LoopState {
    enabled: bool,
    timer: Option<TimerHandle>,
}

impl LoopState {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            timer: None,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        if self.enabled {
            LoopPhase::Enabled
        } else {
            LoopPhase::Disabled
        }
    }

    /// Flip the state. `start` is only called on `Disabled → Enabled`.
    /// On `Enabled → Disabled` the cancelled timer task is returned.
    pub fn toggled(self, start: impl FnOnce() -> TimerHandle) -> (Self, Option<JoinHandle<()>>) {
        match self.timer {
            Some(timer) => (LoopState::disabled(), Some(timer.cancel())),
            None => (
                LoopState {
                    enabled: true,
                    timer: Some(start()),
                },
                None,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

struct ManagedLoop {
    kind: LoopKind,
    period: Duration,
    action: Arc<dyn TickAction>,
    state: LoopState,
}

impl ManagedLoop {
    fn new(kind: LoopKind, period: Duration, action: Arc<dyn TickAction>) -> Self {
        Self {
            kind,
            period,
            action,
            state: LoopState::disabled(),
        }
    }

    fn toggle(&mut self) -> Option<JoinHandle<()>> {
        let current = std::mem::replace(&mut self.state, LoopState::disabled());
        let (kind, period, action) = (self.kind, self.period, self.action.clone());
        let (next, stopped) = current.toggled(|| TimerHandle::spawn(kind, period, action));
        self.state = next;
        stopped
    }
}

/// Owns both loops. The only way to change a loop's state is `toggle`.
pub struct AutomationController {
    panel: Arc<ControlPanel>,
    price_refresh: ManagedLoop,
    auto_buy: ManagedLoop,
}

impl AutomationController {
    pub fn new(
        panel: Arc<ControlPanel>,
        price_refresh: (Duration, Arc<dyn TickAction>),
        auto_buy: (Duration, Arc<dyn TickAction>),
    ) -> Self {
        Self {
            panel,
            price_refresh: ManagedLoop::new(
                LoopKind::PriceRefresh,
                price_refresh.0,
                price_refresh.1,
            ),
            auto_buy: ManagedLoop::new(LoopKind::AutoBuy, auto_buy.0, auto_buy.1),
        }
    }

    fn managed(&mut self, kind: LoopKind) -> &mut ManagedLoop {
        match kind {
            LoopKind::PriceRefresh => &mut self.price_refresh,
            LoopKind::AutoBuy => &mut self.auto_buy,
        }
    }

    pub fn phase(&self, kind: LoopKind) -> LoopPhase {
        match kind {
            LoopKind::PriceRefresh => self.price_refresh.state.phase(),
            LoopKind::AutoBuy => self.auto_buy.state.phase(),
        }
    }

    /// Flip one loop and update its toggle label. Returns the new phase.
    pub async fn toggle(&mut self, kind: LoopKind) -> LoopPhase {
        let managed = self.managed(kind);
        managed.toggle();
        let phase = managed.state.phase();
        let period_ms = managed.period.as_millis() as u64;

        self.panel.set_toggle_label(kind, phase).await;
        info!(%kind, phase = phase.flag(), period_ms, "Loop toggled");
        phase
    }

    /// Disable both loops and wait for any in-flight tick to finish.
    pub async fn shutdown(&mut self) {
        for kind in [LoopKind::PriceRefresh, LoopKind::AutoBuy] {
            if self.phase(kind) == LoopPhase::Enabled {
                if let Some(task) = self.managed(kind).toggle() {
                    let _ = task.await;
                }
                self.panel.set_toggle_label(kind, LoopPhase::Disabled).await;
            }
        }
        info!("Automation loops stopped");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
