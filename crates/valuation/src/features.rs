//! Feature extraction from space attributes
//!
//! Converts raw attributes into a fixed-size vector of scores, each
//! normalized to [0, 1]. Extraction is deterministic and total: attributes
//! that are absent fall back to the documented neutral defaults instead of
//! failing, so every space gets a usable vector.

use agora_core::SpaceAttributes;

/// Neutral score used when an attribute carries no signal
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Volume at which the size score saturates (a 1024m cube)
const MAX_VOLUME: f64 = 1024.0 * 1024.0 * 1024.0;
/// Room count at which the room score saturates
const MAX_ROOMS: f64 = 64.0;
/// Object count at which the object score saturates
const MAX_OBJECTS: f64 = 512.0;
/// Mean daily visits at which the traffic score saturates
const TRAFFIC_SCALE: f64 = 1000.0;
/// Tag count at which the feature score saturates
const MAX_FEATURE_TAGS: f64 = 16.0;

/// Fixed-size numeric description of a space, every component in [0, 1]
///
/// Size uses logarithmic scaling and room/object counts square-root scaling,
/// so doubling a space's volume or furniture does not double its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Log-scaled enclosed volume
    pub size: f64,
    /// Square-root-scaled room count
    pub rooms: f64,
    /// Square-root-scaled object count
    pub objects: f64,
    /// Style rarity
    pub design: f64,
    /// Mean daily visits over recorded history
    pub traffic: f64,
    /// Declared feature tag density
    pub features: f64,
    /// Rarity blended with verification presence
    pub scarcity: f64,
}

impl FeatureVector {
    /// Extract the feature vector for a space
    pub fn extract(attrs: &SpaceAttributes) -> Self {
        let volume = attrs.dimensions.volume().max(0.0);
        let size = ((1.0 + volume).ln() / (1.0 + MAX_VOLUME).ln()).clamp(0.0, 1.0);

        let rooms = ((attrs.room_count as f64).sqrt() / MAX_ROOMS.sqrt()).clamp(0.0, 1.0);
        let objects = ((attrs.object_count as f64).sqrt() / MAX_OBJECTS.sqrt()).clamp(0.0, 1.0);

        let design = attrs.style.rarity();

        let traffic = match attrs.traffic.mean_daily_visits() {
            Some(mean) => (mean / TRAFFIC_SCALE).clamp(0.0, 1.0),
            None => NEUTRAL_SCORE,
        };

        let features = (attrs.feature_tags.len() as f64 / MAX_FEATURE_TAGS).clamp(0.0, 1.0);

        let verified = if attrs.is_verified() { 1.0 } else { 0.0 };
        let scarcity = (0.7 * design + 0.3 * verified).clamp(0.0, 1.0);

        Self {
            size,
            rooms,
            objects,
            design,
            traffic,
            features,
            scarcity,
        }
    }

    /// The vector as a fixed-length array, in declaration order
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.size,
            self.rooms,
            self.objects,
            self.design,
            self.traffic,
            self.features,
            self.scarcity,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{Dimensions, StyleCategory, TrafficHistory, VerificationStatus};

    #[test]
    fn all_components_normalized() {
        let mut attrs = SpaceAttributes::default();
        attrs.dimensions = Dimensions::new(5000.0, 5000.0, 5000.0);
        attrs.room_count = 10_000;
        attrs.object_count = 100_000;
        attrs.feature_tags = (0..50).map(|i| format!("tag-{i}")).collect();
        attrs.traffic = TrafficHistory::new(vec![1_000_000; 30]);

        let fv = FeatureVector::extract(&attrs);
        for component in fv.as_array() {
            assert!((0.0..=1.0).contains(&component), "out of range: {component}");
        }
    }

    #[test]
    fn doubling_volume_does_not_double_size_score() {
        let mut small = SpaceAttributes::default();
        small.dimensions = Dimensions::new(100.0, 50.0, 100.0);
        let mut big = small.clone();
        big.dimensions = Dimensions::new(200.0, 50.0, 100.0);

        let fv_small = FeatureVector::extract(&small);
        let fv_big = FeatureVector::extract(&big);
        assert!(fv_big.size > fv_small.size);
        assert!(fv_big.size < 2.0 * fv_small.size);
    }

    #[test]
    fn doubling_objects_does_not_double_object_score() {
        let mut base = SpaceAttributes::default();
        base.object_count = 50;
        let mut doubled = base.clone();
        doubled.object_count = 100;

        let fv_base = FeatureVector::extract(&base);
        let fv_doubled = FeatureVector::extract(&doubled);
        assert!(fv_doubled.objects > fv_base.objects);
        assert!(fv_doubled.objects < 2.0 * fv_base.objects);
    }

    #[test]
    fn missing_traffic_scores_neutral() {
        let attrs = SpaceAttributes::default();
        let fv = FeatureVector::extract(&attrs);
        assert_eq!(fv.traffic, NEUTRAL_SCORE);
    }

    #[test]
    fn verification_raises_scarcity() {
        let unverified = SpaceAttributes::with_style(StyleCategory::Cyberpunk);
        let mut verified = unverified.clone();
        verified.verification = Some(VerificationStatus::Verified);

        let fv_unverified = FeatureVector::extract(&unverified);
        let fv_verified = FeatureVector::extract(&verified);
        assert!(fv_verified.scarcity > fv_unverified.scarcity);
    }
}
