//! Agora Marketplace Engine
//!
//! Owns listings and auctions for space tokens, enforcing:
//! - **State machine**: Listing `Active -> Sold | Cancelled` (terminal),
//!   Auction `Active -> Settled`
//! - **Escrow**: buyer payments and bids are captured on an escrow account
//!   and only disbursed at settlement; outbid bidders are refunded before
//!   the next bid is accepted
//! - **Fees**: settlement splits the price into seller proceeds and a
//!   platform fee at the rate in force at settlement time
//! - **Atomicity**: fund movements and ownership transfer either all
//!   complete or are compensated in reverse; the Sold transition, audit
//!   record, and market-statistics feedback happen only after full success
//!
//! ## Architecture
//!
//! ```text
//!  callers ──► ┌───────────────────────────────────────────┐
//!              │            MarketplaceEngine              │
//!              │  per-listing Mutex ── per-asset flag      │
//!              │  ┌──────────────┐   ┌──────────────────┐  │
//!              │  │ state machine │   │    FundPlan      │  │
//!              │  │ (validation)  │──►│ escrow+rollback  │  │
//!              │  └──────────────┘   └────────┬─────────┘  │
//!              └───────────────────────────────┼────────────┘
//!                     ▲               ▲        │ settlement
//!          Appraiser ─┘   AssetRegistry/Funds ─┘
//!                                              ▼
//!                                    MarketStatsStore
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod escrow;
pub mod events;

// Re-export main types
pub use config::MarketplaceConfig;
pub use engine::MarketplaceEngine;
pub use error::{MarketError, Result};
pub use events::MarketEvent;
