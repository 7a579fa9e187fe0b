//! The appraiser: multi-factor price estimation
//!
//! Combines the extracted feature vector, a fixed factor-weight table, and
//! a market snapshot into a point estimate with a confidence score. Scoring
//! runs in f64 (log and square-root scaling), the final value converts to
//! `Decimal` at the boundary and is rounded to 2 decimal places.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use agora_core::SpaceAttributes;

use crate::features::FeatureVector;
use crate::stats::MarketSnapshot;

/// Anchor price for a space scoring 1.0 across all factors
const BASE_PRICE: f64 = 1000.0;
/// Floor applied to the supply level before dividing
const SUPPLY_FLOOR: f64 = 0.1;
/// Bounds on the combined market adjustment multiplier
const MARKET_ADJUSTMENT_BOUNDS: (f64, f64) = (0.25, 4.0);
/// Additive premium per recognized feature tag
const PREMIUM_PER_TAG: f64 = 0.04;
/// Ceiling on the total feature premium, guarding against tag spam
const MAX_FEATURE_PREMIUM: f64 = 0.2;
/// Every estimate is floored at this value
const MIN_VALUE: Decimal = dec!(1);

/// Tags that carry a market premium; anything else contributes nothing
const PREMIUM_TAGS: [&str; 6] = [
    "holodeck",
    "portal_hub",
    "waterfront",
    "skyline",
    "landmark",
    "soundstage",
];

/// Confidence starts here and is discounted by the penalties below
const BASE_CONFIDENCE: f64 = 0.95;
const THIN_HISTORY_PENALTY: f64 = 0.15;
const EXTREME_TREND_PENALTY: f64 = 0.10;
const UNVERIFIED_TAGS_PENALTY: f64 = 0.10;
const SPARSE_TRAFFIC_PENALTY: f64 = 0.10;
/// Category samples below this count as thin history
const THIN_HISTORY_FLOOR: usize = 10;
/// Absolute trend beyond this counts as an extreme swing
const EXTREME_TREND: f64 = 0.5;
/// Unverified spaces with at least this many tags are penalized
const UNVERIFIED_TAG_FLOOR: usize = 4;
/// Traffic histories below this many samples count as sparse
const SPARSE_TRAFFIC_FLOOR: usize = 5;

/// Factor weights for the base value; the five weights sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationWeights {
    pub location: f64,
    pub design: f64,
    pub traffic: f64,
    pub features: f64,
    pub scarcity: f64,
}

impl Default for ValuationWeights {
    fn default() -> Self {
        Self {
            location: 0.30,
            design: 0.25,
            traffic: 0.20,
            features: 0.15,
            scarcity: 0.10,
        }
    }
}

impl ValuationWeights {
    fn sum(&self) -> f64 {
        self.location + self.design + self.traffic + self.features + self.scarcity
    }
}

/// Appraisal output; a pure function of its inputs, never persisted as
/// authoritative state. Listings snapshot `value` at creation time only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Final point estimate
    pub value: Decimal,
    /// Weighted feature value before market and location adjustments
    pub base_value: Decimal,
    /// Demand/supply ratio times the trend multiplier, clamped
    pub market_adjustment: f64,
    /// Multiplicative premium or discount from the location profile
    pub location_factor: f64,
    /// Additive fraction from premium feature tags, capped
    pub feature_premium: f64,
    /// Informational score in [0, 1]; never blocks an operation
    pub confidence: f64,
}

/// The valuation engine
///
/// Stateless apart from its weight table; market context arrives per call as
/// a [`MarketSnapshot`].
#[derive(Debug, Clone)]
pub struct Appraiser {
    weights: ValuationWeights,
}

impl Appraiser {
    pub fn new() -> Self {
        Self {
            weights: ValuationWeights::default(),
        }
    }

    /// Create with a custom weight table; weights must sum to 1.0
    pub fn with_weights(weights: ValuationWeights) -> Self {
        debug_assert!((weights.sum() - 1.0).abs() < 1e-9);
        Self { weights }
    }

    /// Assess a space against the current market
    ///
    /// Total: malformed or missing attributes fall back to neutral defaults
    /// rather than failing, since listing creation always needs an estimate.
    pub fn assess(&self, attrs: &SpaceAttributes, market: &MarketSnapshot) -> Valuation {
        let fv = FeatureVector::extract(attrs);

        let base = self.base_value(&fv);
        let market_adjustment = Self::market_adjustment(market);
        let location_factor = attrs.location.map(|p| p.factor()).unwrap_or(1.0);
        let feature_premium = Self::feature_premium(attrs);

        let raw = base * market_adjustment * location_factor * (1.0 + feature_premium);
        let value = Decimal::from_f64(raw)
            .unwrap_or(MIN_VALUE)
            .round_dp(2)
            .max(MIN_VALUE);

        let confidence = Self::confidence(attrs, market);

        debug!(
            "assessed {} space: value={} base={:.2} adj={:.3} loc={:.3} premium={:.3} conf={:.2}",
            attrs.style, value, base, market_adjustment, location_factor, feature_premium, confidence
        );

        Valuation {
            value,
            base_value: Decimal::from_f64(base).unwrap_or(MIN_VALUE).round_dp(2),
            market_adjustment,
            location_factor,
            feature_premium,
            confidence,
        }
    }

    /// Weighted factor score scaled by size, rooms, and objects
    ///
    /// The size multiplier keeps the diminishing-returns shape of the
    /// feature vector: log-scaled volume plus sqrt-scaled counts.
    fn base_value(&self, fv: &FeatureVector) -> f64 {
        // Spaces without a declared location score it from their footprint
        let location_score = 0.5 * (fv.size + fv.rooms);

        let weighted = self.weights.location * location_score
            + self.weights.design * fv.design
            + self.weights.traffic * fv.traffic
            + self.weights.features * fv.features
            + self.weights.scarcity * fv.scarcity;

        let size_multiplier = 0.5 + fv.size + 0.25 * (fv.rooms + fv.objects);

        BASE_PRICE * weighted * size_multiplier
    }

    fn market_adjustment(market: &MarketSnapshot) -> f64 {
        let trend = market.trend.to_f64().unwrap_or(0.0);
        let ratio = market.demand_level / market.supply_level.max(SUPPLY_FLOOR);
        let (lo, hi) = MARKET_ADJUSTMENT_BOUNDS;
        (ratio * (1.0 + trend)).clamp(lo, hi)
    }

    fn feature_premium(attrs: &SpaceAttributes) -> f64 {
        let premium_tags = attrs
            .feature_tags
            .iter()
            .filter(|tag| PREMIUM_TAGS.contains(&tag.to_lowercase().as_str()))
            .count();
        (premium_tags as f64 * PREMIUM_PER_TAG).min(MAX_FEATURE_PREMIUM)
    }

    fn confidence(attrs: &SpaceAttributes, market: &MarketSnapshot) -> f64 {
        let mut confidence = BASE_CONFIDENCE;

        if market.sample_count < THIN_HISTORY_FLOOR {
            confidence -= THIN_HISTORY_PENALTY;
        }
        if market.trend.to_f64().unwrap_or(0.0).abs() > EXTREME_TREND {
            confidence -= EXTREME_TREND_PENALTY;
        }
        if !attrs.is_verified() && attrs.feature_tags.len() >= UNVERIFIED_TAG_FLOOR {
            confidence -= UNVERIFIED_TAGS_PENALTY;
        }
        if attrs.traffic.sample_count() < SPARSE_TRAFFIC_FLOOR {
            confidence -= SPARSE_TRAFFIC_PENALTY;
        }

        confidence.clamp(0.0, 1.0)
    }
}

impl Default for Appraiser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{
        AccessTier, LocationProfile, StyleCategory, TrafficHistory, VerificationStatus, ZoneTraffic,
    };

    fn neutral_market() -> MarketSnapshot {
        MarketSnapshot::default()
    }

    #[test]
    fn assessment_is_deterministic() {
        let appraiser = Appraiser::new();
        let attrs = SpaceAttributes::default();
        let market = neutral_market();

        let first = appraiser.assess(&attrs, &market);
        let second = appraiser.assess(&attrs, &market);
        assert_eq!(first, second);
    }

    #[test]
    fn value_floored_at_minimum() {
        let appraiser = Appraiser::new();
        let mut attrs = SpaceAttributes::default();
        attrs.dimensions = agora_core::Dimensions::new(0.0, 0.0, 0.0);
        attrs.room_count = 0;
        attrs.object_count = 0;
        attrs.traffic = TrafficHistory::new(vec![0; 10]);

        let valuation = appraiser.assess(&attrs, &neutral_market());
        assert!(valuation.value >= dec!(1));
    }

    #[test]
    fn high_demand_low_supply_raises_value() {
        let appraiser = Appraiser::new();
        let attrs = SpaceAttributes::default();

        let hot = MarketSnapshot {
            demand_level: 2.0,
            supply_level: 0.5,
            ..Default::default()
        };
        let cold = MarketSnapshot {
            demand_level: 0.5,
            supply_level: 2.0,
            ..Default::default()
        };

        let hot_value = appraiser.assess(&attrs, &hot);
        let cold_value = appraiser.assess(&attrs, &cold);
        assert!(hot_value.value > cold_value.value);
        assert!(hot_value.market_adjustment <= MARKET_ADJUSTMENT_BOUNDS.1);
        assert!(cold_value.market_adjustment >= MARKET_ADJUSTMENT_BOUNDS.0);
    }

    #[test]
    fn near_zero_supply_is_floored_not_divergent() {
        let market = MarketSnapshot {
            demand_level: 1.0,
            supply_level: 0.0,
            ..Default::default()
        };
        let adjustment = Appraiser::market_adjustment(&market);
        assert!(adjustment <= MARKET_ADJUSTMENT_BOUNDS.1);
    }

    #[test]
    fn location_profile_multiplies_value() {
        let appraiser = Appraiser::new();
        let mut attrs = SpaceAttributes::default();
        attrs.location = Some(LocationProfile {
            zone_traffic: ZoneTraffic::High,
            has_view: true,
            accessibility: AccessTier::Premium,
        });
        let with_location = appraiser.assess(&attrs, &neutral_market());

        attrs.location = None;
        let without_location = appraiser.assess(&attrs, &neutral_market());

        assert!(with_location.value > without_location.value);
        assert_eq!(without_location.location_factor, 1.0);
    }

    #[test]
    fn feature_premium_caps_under_tag_spam() {
        let appraiser = Appraiser::new();
        let mut attrs = SpaceAttributes::default();
        attrs.feature_tags = vec![
            "holodeck".into(),
            "portal_hub".into(),
            "waterfront".into(),
            "skyline".into(),
            "landmark".into(),
            "soundstage".into(),
        ];
        let valuation = appraiser.assess(&attrs, &neutral_market());
        assert_eq!(valuation.feature_premium, MAX_FEATURE_PREMIUM);

        // Unrecognized tags contribute nothing
        attrs.feature_tags = vec!["shiny".into(), "bespoke".into(), "artisanal".into()];
        let spam = appraiser.assess(&attrs, &neutral_market());
        assert_eq!(spam.feature_premium, 0.0);
    }

    #[test]
    fn confidence_discounts_stack_and_clamp() {
        let appraiser = Appraiser::new();

        // Worst case: no traffic, unverified with many tags, thin volatile market
        let mut weak = SpaceAttributes::default();
        weak.feature_tags = (0..6).map(|i| format!("tag-{i}")).collect();
        let volatile = MarketSnapshot {
            sample_count: 3,
            trend: dec!(0.8),
            ..Default::default()
        };
        let weak_valuation = appraiser.assess(&weak, &volatile);

        // Strong case: verified, traffic-rich, deep calm market
        let mut strong = SpaceAttributes::default();
        strong.verification = Some(VerificationStatus::Verified);
        strong.traffic = TrafficHistory::new(vec![100; 30]);
        let calm = MarketSnapshot {
            sample_count: 50,
            trend: dec!(0.05),
            ..Default::default()
        };
        let strong_valuation = appraiser.assess(&strong, &calm);

        assert!(weak_valuation.confidence < strong_valuation.confidence);
        assert_eq!(strong_valuation.confidence, BASE_CONFIDENCE);
        assert!((0.0..=1.0).contains(&weak_valuation.confidence));
    }

    #[test]
    fn rarer_styles_appraise_higher() {
        let appraiser = Appraiser::new();
        let fantasy = SpaceAttributes::with_style(StyleCategory::Fantasy);
        let modern = SpaceAttributes::with_style(StyleCategory::Modern);

        let fantasy_value = appraiser.assess(&fantasy, &neutral_market());
        let modern_value = appraiser.assess(&modern, &neutral_market());
        assert!(fantasy_value.value > modern_value.value);
    }
}
