//! Demo scenario - one fixed-price sale and one full auction

use chrono::Duration;
use log::info;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use agora_core::{
    AccessTier, LocationProfile, SpaceAttributes, StyleCategory, TrafficHistory,
    VerificationStatus, ZoneTraffic,
};
use agora_marketplace::Result;
use agora_valuation::MarketSnapshot;

use crate::bootstrap::MarketSetup;

/// What the demo did, for printing at the end
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub sales: usize,
    pub total_volume: Decimal,
    pub platform_revenue: Decimal,
    pub cyberpunk_market: MarketSnapshot,
}

/// Run a fixed-price sale and an auction end to end
///
/// Alice sells a verified cyberpunk tower to Bob at a fixed price, then
/// auctions a second space that Bob and Carol bid on; the frozen clock is
/// advanced past the end time and the auction settles to the highest bidder.
pub async fn run_demo(setup: &MarketSetup) -> Result<ScenarioReport> {
    let alice = setup.account("alice");
    let bob = setup.account("bob");
    let carol = setup.account("carol");

    // === Fixed-price sale ===
    let tower = setup.registry.mint(
        alice,
        SpaceAttributes {
            style: StyleCategory::Cyberpunk,
            feature_tags: vec!["skyline".to_string(), "holodeck".to_string()],
            traffic: TrafficHistory::new(vec![120, 180, 150, 210, 190, 240, 260]),
            location: Some(LocationProfile {
                zone_traffic: ZoneTraffic::High,
                has_view: true,
                accessibility: AccessTier::Premium,
            }),
            verification: Some(VerificationStatus::Verified),
            ..Default::default()
        },
    );

    let listing = setup
        .engine
        .create_listing(tower, alice, dec!(1000))
        .await?;
    info!(
        "tower listed at {} (appraised {})",
        listing.price, listing.appraised_value
    );
    setup.engine.buy_listing(listing.id, bob, dec!(1000)).await?;

    // === Auction ===
    let garden = setup.registry.mint(
        alice,
        SpaceAttributes {
            style: StyleCategory::Cyberpunk,
            feature_tags: vec!["waterfront".to_string()],
            ..Default::default()
        },
    );
    let auction_listing = setup
        .engine
        .create_auction(garden, alice, dec!(200), dec!(300), Duration::hours(6))
        .await?;

    setup
        .engine
        .place_bid(auction_listing.id, bob, dec!(200))
        .await?;
    setup
        .engine
        .place_bid(auction_listing.id, carol, dec!(320))
        .await?;

    setup.clock.advance(Duration::hours(7));
    let settlement = setup.engine.end_auction(auction_listing.id, carol).await?;
    if let Some(tx) = &settlement {
        info!("auction won by {} at {}", tx.buyer, tx.price);
    }

    let history = setup.engine.full_history().await;
    let total_volume: Decimal = history.iter().map(|tx| tx.price).sum();
    let report = ScenarioReport {
        sales: history.len(),
        total_volume,
        platform_revenue: setup.funds.balance(setup.operator),
        cyberpunk_market: setup.stats.snapshot(StyleCategory::Cyberpunk),
    };
    Ok(report)
}
