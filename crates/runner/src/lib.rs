//! Agora Runner - Marketplace Scenario Orchestration
//!
//! Wires the marketplace engine to the in-memory collaborator simulators
//! and drives end-to-end flows:
//!
//! - **Bootstrap**: open participant accounts, mint spaces, start the engine
//! - **Scenario**: a fixed-price sale and a full auction, settled against
//!   the frozen clock and reported with market statistics

pub mod bootstrap;
pub mod scenario;

// Re-export main types
pub use bootstrap::{BootstrapConfig, MarketSetup, bootstrap};
pub use scenario::{ScenarioReport, run_demo};
