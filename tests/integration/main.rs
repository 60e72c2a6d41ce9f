//! Integration tests: full ticks and loops against scripted and simulated
//! exchange pages.

mod automation;
mod mock_page;
