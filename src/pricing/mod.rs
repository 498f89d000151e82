//! Synthetic price and size derivation.
//!
//! `appraise` is pure and total: every factor tolerates missing or
//! malformed inputs by falling back to a fixed default, and the weighted
//! composite is clamped before it is mapped onto the price band. The only
//! time dependence is the hype factor, so callers pass `now` explicitly.

pub mod factors;
pub mod seed;

use chrono::{DateTime, Utc};

use crate::domain::{Neo, Valuation};
use factors::clamp01;

pub const PRICE_FLOOR: i64 = 100;
pub const PRICE_SPAN: f64 = 800.0;

/// Factor weights. Note they add up to 0.98, so the ceiling is 884.
pub const WEIGHT_SIZE: f64 = 0.25;
pub const WEIGHT_BRIGHTNESS: f64 = 0.10;
pub const WEIGHT_RARITY: f64 = 0.10;
pub const WEIGHT_HYPE: f64 = 0.15;
pub const WEIGHT_ACCESSIBILITY: f64 = 0.15;
pub const WEIGHT_VELOCITY: f64 = 0.10;
pub const WEIGHT_HAZARD: f64 = 0.10;
pub const WEIGHT_RANDOMNESS: f64 = 0.03;

/// Per-factor scores, exposed for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorBreakdown {
    pub size: f64,
    pub brightness: f64,
    pub rarity: f64,
    pub hype: f64,
    pub accessibility: f64,
    pub velocity: f64,
    pub hazard: f64,
    pub randomness: f64,
}

impl FactorBreakdown {
    pub fn weighted_sum(&self) -> f64 {
        WEIGHT_SIZE * self.size
            + WEIGHT_BRIGHTNESS * self.brightness
            + WEIGHT_RARITY * self.rarity
            + WEIGHT_HYPE * self.hype
            + WEIGHT_ACCESSIBILITY * self.accessibility
            + WEIGHT_VELOCITY * self.velocity
            + WEIGHT_HAZARD * self.hazard
            + WEIGHT_RANDOMNESS * self.randomness
    }
}

pub fn factor_breakdown(neo: &Neo, now: DateTime<Utc>) -> FactorBreakdown {
    let reference = factors::reference_approach(&neo.close_approach_data, now);

    FactorBreakdown {
        size: factors::size_factor(neo),
        brightness: factors::brightness_factor(neo),
        rarity: factors::rarity_factor(neo),
        hype: factors::hype_factor(reference.map(|(_, at)| at), now),
        accessibility: factors::accessibility_factor(neo),
        velocity: factors::velocity_factor(reference.map(|(a, _)| a)),
        hazard: factors::hazard_factor(neo),
        randomness: seed::identity_unit(neo.neo_reference_id.as_deref(), neo.name.as_deref()),
    }
}

/// Price in [100, 900] for a record as seen at `now`.
pub fn price(neo: &Neo, now: DateTime<Utc>) -> i64 {
    let score = clamp01(factor_breakdown(neo, now).weighted_sum());
    PRICE_FLOOR + (PRICE_SPAN * score).round() as i64
}

/// Average kilometre diameter in metres. No pricing defaults apply here:
/// without a kilometre block the size is unknown and reported as 0.
pub fn size_meters(neo: &Neo) -> f64 {
    let Some(range) = neo.diameter_km() else {
        return 0.0;
    };
    let min = range.estimated_diameter_min.filter(|v| v.is_finite());
    let max = range.estimated_diameter_max.filter(|v| v.is_finite());
    match (min, max) {
        (Some(min), Some(max)) => (min + max) / 2.0 * 1000.0,
        (Some(only), None) | (None, Some(only)) => only * 1000.0,
        (None, None) => 0.0,
    }
}

pub fn appraise(neo: &Neo, now: DateTime<Utc>) -> Valuation {
    Valuation {
        price: price(neo, now),
        size: size_meters(neo),
    }
}
