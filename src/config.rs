//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section except `[agent]` may be omitted and falls back to
//! defaults matching the live exchange page.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::engine::retry::RetryPolicy;
use crate::page::simulated::ExchangeSeed;
use crate::page::PageSelectors;
use crate::types::ThresholdInputs;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "PREMIUM_TRADER_CONFIG";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub agent: AgentConfig,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub page: PageSelectors,
    #[serde(default)]
    pub simulation: ExchangeSeed,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default = "default_price_refresh_ms")]
    pub price_refresh_interval_ms: u64,
    #[serde(default = "default_auto_buy_ms")]
    pub auto_buy_interval_ms: u64,
    /// Enable the price-refresh loop at startup, as if toggled once.
    #[serde(default)]
    pub start_price_refresh: bool,
    /// Enable the auto-buy loop at startup, as if toggled once.
    #[serde(default)]
    pub start_auto_buy: bool,
}

fn default_price_refresh_ms() -> u64 {
    5_000
}

fn default_auto_buy_ms() -> u64 {
    60_000
}

impl AgentConfig {
    pub fn price_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.price_refresh_interval_ms)
    }

    pub fn auto_buy_interval(&self) -> Duration {
        Duration::from_millis(self.auto_buy_interval_ms)
    }
}

/// Initial threshold inputs. Unset values start empty, which disables
/// every decision until the user fills them in.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ThresholdsConfig {
    pub buy_threshold: Option<f64>,
    pub sell_threshold: Option<f64>,
    pub keep_resources: Option<f64>,
}

impl ThresholdsConfig {
    pub fn to_inputs(&self) -> ThresholdInputs {
        ThresholdInputs::from_values(self.buy_threshold, self.sell_threshold, self.keep_resources)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8090,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the timers cannot run with.
    fn validate(&self) -> Result<()> {
        let intervals = [
            ("agent.price_refresh_interval_ms", self.agent.price_refresh_interval_ms),
            ("agent.auto_buy_interval_ms", self.agent.auto_buy_interval_ms),
            ("retry.poll_interval_ms", self.retry.poll_interval_ms),
        ];
        for (key, value) in intervals {
            anyhow::ensure!(value > 0, "{key} must be greater than zero");
        }
        Ok(())
    }

    /// Config file path: `PREMIUM_TRADER_CONFIG` or `config.toml`.
    pub fn default_path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string())
    }
}
