//! Bounded polling for interactive page controls.
//!
//! Controls such as the confirm button appear some time after the action
//! that triggers them. `await_interactive_element` polls for a control that
//! exists and is not disabled, giving up after a fixed number of polls.

use serde::Deserialize;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::page::MarketPage;
use crate::types::{Element, TraderError};

/// Polling cadence and attempt ceiling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            max_attempts: 10,
        }
    }
}

impl RetryPolicy {
    /// Delay between polls, never less than one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Wait for an element matching `selector` that is present and enabled.
///
/// The first poll happens one interval after the call. The poll timer is
/// owned by this future and dropped on every exit path.
pub async fn await_interactive_element(
    page: &dyn MarketPage,
    selector: &str,
    policy: &RetryPolicy,
) -> Result<Element, TraderError> {
    let period = policy.poll_interval();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for attempt in 1..=policy.max_attempts {
        ticker.tick().await;
        match page.query(selector).await {
            Some(element) if element.is_interactive() => {
                debug!(selector, attempt, "Element ready");
                return Ok(element);
            }
            Some(_) => trace!(selector, attempt, "Element present but disabled"),
            None => trace!(selector, attempt, "Element not found"),
        }
    }

    Err(TraderError::RetryExhausted {
        selector: selector.to_string(),
        attempts: policy.max_attempts,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
