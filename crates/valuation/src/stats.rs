//! Rolling market statistics per style category
//!
//! Fed exclusively by marketplace settlement events, consumed by the
//! appraiser. Each category keeps a bounded window of recent sale prices,
//! an incrementally-maintained running average, and deterministic demand
//! and supply levels derived from observed flow.

use std::collections::VecDeque;

use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agora_core::{SettlementEvent, StyleCategory};

/// Capacity of the recent-transaction window, FIFO-evicted
pub const WINDOW_CAP: usize = 100;
/// Minimum samples before a trend is reported; below this it is neutral 0
pub const TREND_MIN_SAMPLES: usize = 10;
/// How many entries each side of the trend comparison uses
const TREND_SPAN: usize = 5;
/// Active listings per category that add one full unit of supply level
const SUPPLY_SCALE: f64 = 10.0;
/// Demand EWMA target; repeated settlements pull demand toward this level
const DEMAND_CEILING: f64 = 2.0;
/// Demand EWMA step per settlement
const DEMAND_ALPHA: f64 = 0.1;

/// Point-in-time view of one category's market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Running average over the recent-transaction window
    pub average_price: Decimal,
    /// Signed fractional change between the two most recent 5-sample means
    pub trend: Decimal,
    /// Number of transactions currently in the window
    pub sample_count: usize,
    /// Demand level; 1.0 for a category with no observed settlements
    pub demand_level: f64,
    /// Supply level; grows with the category's active listings
    pub supply_level: f64,
}

impl Default for MarketSnapshot {
    fn default() -> Self {
        Self {
            average_price: Decimal::ZERO,
            trend: Decimal::ZERO,
            sample_count: 0,
            demand_level: 1.0,
            supply_level: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
struct CategoryStats {
    window: VecDeque<Decimal>,
    running_total: Decimal,
    demand: f64,
    active_listings: u32,
}

impl Default for CategoryStats {
    fn default() -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_CAP),
            running_total: Decimal::ZERO,
            demand: 1.0,
            active_listings: 0,
        }
    }
}

impl CategoryStats {
    fn record(&mut self, price: Decimal) {
        if self.window.len() == WINDOW_CAP {
            if let Some(evicted) = self.window.pop_front() {
                self.running_total -= evicted;
            }
        }
        self.window.push_back(price);
        self.running_total += price;
        self.demand += DEMAND_ALPHA * (DEMAND_CEILING - self.demand);
    }

    fn average(&self) -> Decimal {
        if self.window.is_empty() {
            Decimal::ZERO
        } else {
            self.running_total / Decimal::from(self.window.len() as u64)
        }
    }

    fn trend(&self) -> Decimal {
        if self.window.len() < TREND_MIN_SAMPLES {
            return Decimal::ZERO;
        }
        let recent_mean = self.span_mean(self.window.len() - TREND_SPAN);
        let previous_mean = self.span_mean(self.window.len() - 2 * TREND_SPAN);
        if previous_mean.is_zero() {
            return Decimal::ZERO;
        }
        (recent_mean - previous_mean) / previous_mean
    }

    fn span_mean(&self, start: usize) -> Decimal {
        let sum: Decimal = self.window.iter().skip(start).take(TREND_SPAN).sum();
        sum / Decimal::from(TREND_SPAN as u64)
    }

    fn supply_level(&self) -> f64 {
        1.0 + self.active_listings as f64 / SUPPLY_SCALE
    }
}

/// Per-category market statistics, updated only via settlement callbacks
///
/// Created once at engine start and shared by reference; there is no ambient
/// singleton. Categories are sharded in a `DashMap`, so updates to different
/// styles never contend.
#[derive(Debug, Default)]
pub struct MarketStatsStore {
    categories: DashMap<StyleCategory, CategoryStats>,
}

impl MarketStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed sale for a category
    pub fn record_transaction(&self, category: StyleCategory, price: Decimal) {
        let mut entry = self.categories.entry(category).or_default();
        entry.record(price);
        debug!(
            "market stats: {} price={} window={} avg={}",
            category,
            price,
            entry.window.len(),
            entry.average()
        );
    }

    /// Settlement callback from the marketplace engine
    pub fn apply(&self, event: &SettlementEvent) {
        self.record_transaction(event.category, event.price);
    }

    /// A listing for this category went Active
    pub fn listing_opened(&self, category: StyleCategory) {
        let mut entry = self.categories.entry(category).or_default();
        entry.active_listings += 1;
    }

    /// A listing for this category left Active (sold or cancelled)
    pub fn listing_closed(&self, category: StyleCategory) {
        let mut entry = self.categories.entry(category).or_default();
        entry.active_listings = entry.active_listings.saturating_sub(1);
    }

    /// Signed fractional trend; neutral 0 below the sample floor
    pub fn trend(&self, category: StyleCategory) -> Decimal {
        self.categories
            .get(&category)
            .map(|entry| entry.trend())
            .unwrap_or(Decimal::ZERO)
    }

    /// Point-in-time snapshot; untouched categories report neutral levels
    pub fn snapshot(&self, category: StyleCategory) -> MarketSnapshot {
        match self.categories.get(&category) {
            Some(entry) => MarketSnapshot {
                average_price: entry.average(),
                trend: entry.trend(),
                sample_count: entry.window.len(),
                demand_level: entry.demand,
                supply_level: entry.supply_level(),
            },
            None => MarketSnapshot::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn running_average_tracks_window() {
        let store = MarketStatsStore::new();
        store.record_transaction(StyleCategory::Modern, dec!(100));
        store.record_transaction(StyleCategory::Modern, dec!(200));
        store.record_transaction(StyleCategory::Modern, dec!(300));

        let snapshot = store.snapshot(StyleCategory::Modern);
        assert_eq!(snapshot.average_price, dec!(200));
        assert_eq!(snapshot.sample_count, 3);
    }

    #[test]
    fn window_evicts_fifo_at_capacity() {
        let store = MarketStatsStore::new();
        for _ in 0..WINDOW_CAP {
            store.record_transaction(StyleCategory::Natural, dec!(100));
        }
        // The next record pushes out one old 100
        store.record_transaction(StyleCategory::Natural, dec!(200));

        let snapshot = store.snapshot(StyleCategory::Natural);
        assert_eq!(snapshot.sample_count, WINDOW_CAP);
        // (99 * 100 + 200) / 100 = 101
        assert_eq!(snapshot.average_price, dec!(101));
    }

    #[test]
    fn trend_neutral_below_sample_floor() {
        let store = MarketStatsStore::new();
        for _ in 0..(TREND_MIN_SAMPLES - 1) {
            store.record_transaction(StyleCategory::Fantasy, dec!(500));
        }
        assert_eq!(store.trend(StyleCategory::Fantasy), dec!(0));
    }

    #[test]
    fn trend_compares_recent_and_preceding_means() {
        let store = MarketStatsStore::new();
        for _ in 0..5 {
            store.record_transaction(StyleCategory::Cyberpunk, dec!(100));
        }
        for _ in 0..5 {
            store.record_transaction(StyleCategory::Cyberpunk, dec!(150));
        }
        // Recent mean 150 vs preceding mean 100 = +50%
        assert_eq!(store.trend(StyleCategory::Cyberpunk), dec!(0.5));
    }

    #[test]
    fn untouched_category_snapshot_is_neutral() {
        let store = MarketStatsStore::new();
        let snapshot = store.snapshot(StyleCategory::Minimalist);
        assert_eq!(snapshot.sample_count, 0);
        assert_eq!(snapshot.trend, dec!(0));
        assert_eq!(snapshot.demand_level, 1.0);
        assert_eq!(snapshot.supply_level, 1.0);
    }

    #[test]
    fn settlements_raise_demand_listings_raise_supply() {
        let store = MarketStatsStore::new();
        store.listing_opened(StyleCategory::Modern);
        store.listing_opened(StyleCategory::Modern);
        let before = store.snapshot(StyleCategory::Modern);
        assert!(before.supply_level > 1.0);

        store.apply(&SettlementEvent {
            category: StyleCategory::Modern,
            price: dec!(250),
            timestamp: Utc::now(),
        });
        let after = store.snapshot(StyleCategory::Modern);
        assert!(after.demand_level > before.demand_level);

        store.listing_closed(StyleCategory::Modern);
        store.listing_closed(StyleCategory::Modern);
        assert_eq!(store.snapshot(StyleCategory::Modern).supply_level, 1.0);
    }
}
