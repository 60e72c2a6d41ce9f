//! Scripted page for integration testing.
//!
//! Provides a deterministic `MarketPage` whose fields, controls and
//! control timing are set from test code, and which records every
//! write and click in order.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use premium_trader::page::{MarketPage, PageSelectors};
use premium_trader::types::{Commodity, Element};

/// An action the agent performed on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    SetValue {
        selector: String,
        value: String,
    },
    Click { selector: String },
}

/// When a control becomes visible, and whether it is disabled.
#[derive(Debug, Clone)]
pub struct ControlScript {
    /// Number of queries that find nothing before the control shows up.
    pub hidden_for: u32,
    pub disabled: bool,
}

impl ControlScript {
    pub fn ready() -> Self {
        Self {
            hidden_for: 0,
            disabled: false,
        }
    }
}

#[derive(Default)]
struct Inner {
    texts: HashMap<String, String>,
    inputs: Vec<String>,
    controls: HashMap<String, ControlScript>,
    queries: HashMap<String, u32>,
    actions: Vec<PageAction>,
}

/// A scripted exchange page. All state is in-memory.
#[derive(Clone, Default)]
pub struct ScriptedPage {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedPage {
    /// A page showing the given (price, stock) per commodity, with every
    /// offer input present and the buy and confirm controls ready.
    pub fn market(rows: [(f64, f64); 3], capacity: f64, merchants: u64) -> Self {
        let page = Self::default();
        let s = PageSelectors::default();
        for (commodity, (price, stock)) in Commodity::ALL.into_iter().zip(rows) {
            page.set_text(&s.price_for(commodity), &price.to_string());
            page.set_text(&s.stock_for(commodity), &stock.to_string());
            page.inner.lock().unwrap().inputs.push(s.offer_input_for(commodity));
        }
        page.set_text(&s.capacity, &capacity.to_string());
        page.set_text(&s.merchants, &merchants.to_string());
        page.set_control(&s.compute_offer, ControlScript::ready());
        page.set_control(&s.confirm, ControlScript::ready());
        page
    }

    pub fn set_text(&self, selector: &str, value: &str) {
        self.inner.lock().unwrap().texts.insert(selector.to_string(), value.to_string());
    }

    pub fn remove_text(&self, selector: &str) {
        self.inner.lock().unwrap().texts.remove(selector);
    }

    pub fn set_control(&self, selector: &str, script: ControlScript) {
        self.inner.lock().unwrap().controls.insert(selector.to_string(), script);
    }

    pub fn remove_input(&self, selector: &str) {
        self.inner.lock().unwrap().inputs.retain(|s| s != selector);
    }

    pub fn queries(&self, selector: &str) -> u32 {
        self.inner.lock().unwrap().queries.get(selector).copied().unwrap_or(0)
    }

    pub fn actions(&self) -> Vec<PageAction> {
        self.inner.lock().unwrap().actions.clone()
    }

    pub fn clicks(&self, selector: &str) -> usize {
        self.actions()
            .iter()
            .filter(|a| matches!(a, PageAction::Click { selector: s } if s == selector))
            .count()
    }
}

#[async_trait]
impl MarketPage for ScriptedPage {
    async fn text(&self, selector: &str) -> Option<String> {
        self.inner.lock().unwrap().texts.get(selector).cloned()
    }

    async fn query(&self, selector: &str) -> Option<Element> {
        let mut inner = self.inner.lock().unwrap();
        let seen = {
            let count = inner.queries.entry(selector.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        let script = inner.controls.get(selector)?;
        if seen <= script.hidden_for {
            return None;
        }
        Some(Element::new(selector, script.disabled))
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.inputs.iter().any(|s| s == selector) {
            return Err(anyhow!("No input matches {selector}"));
        }
        inner.actions.push(PageAction::SetValue {
            selector: selector.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn click(&self, element: &Element) -> Result<()> {
        self.inner.lock().unwrap().actions.push(PageAction::Click {
            selector: element.selector.clone(),
        });
        Ok(())
    }
}
