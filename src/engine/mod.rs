//! Core engine: extraction, bounded retries, purchase actuation, and the
//! two automation loops that drive them.

pub mod extractor;
pub mod retry;
pub mod actuator;
pub mod display;
pub mod auto_buy;
pub mod controller;
