//! Premium Trader: threshold-driven auto-buy agent for a premium
//! resource exchange.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod page;
pub mod strategy;
pub mod engine;
pub mod panel;
pub mod dashboard;
