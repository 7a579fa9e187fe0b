//! Agora Valuation
//!
//! Produces price estimates for space tokens and keeps them calibrated
//! against market history:
//! - **Feature extraction**: space attributes to a normalized vector
//! - **Appraisal**: weighted scoring, market adjustment, location factor,
//!   capped feature premium, and a confidence score
//! - **Market statistics**: rolling per-category windows, running averages,
//!   and trend coefficients fed by marketplace settlements
//!
//! Valuation is a pure read path: `assess` never fails and never mutates.
//! The statistics store is the single feedback channel, updated exactly once
//! per completed sale via [`MarketStatsStore::apply`].

pub mod engine;
pub mod features;
pub mod stats;

pub use engine::{Appraiser, Valuation, ValuationWeights};
pub use features::FeatureVector;
pub use stats::{MarketSnapshot, MarketStatsStore};
