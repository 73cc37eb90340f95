pub mod actions;
pub mod deal_builders;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use deal_builders::{card, cards, DealBuilder};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
