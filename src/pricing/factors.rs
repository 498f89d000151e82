//! Individual pricing factors, each normalized to [0, 1].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::domain::neo::parse_numeric;
use crate::domain::{CloseApproach, Neo};

pub const DEFAULT_MIN_DIAMETER_KM: f64 = 0.05;
pub const DEFAULT_MAGNITUDE_H: f64 = 22.0;
pub const DEFAULT_HORIZON_DAYS: f64 = 365.0;
pub const DEFAULT_MOID_AU: f64 = 0.25;
pub const DEFAULT_INCLINATION_DEG: f64 = 10.0;
pub const DEFAULT_VELOCITY_KM_S: f64 = 10.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Clamp to [0, 1]; NaN maps to 0.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Average kilometre diameter with pricing defaults applied.
pub fn average_diameter_km(neo: &Neo) -> f64 {
    let range = neo.diameter_km();
    let min = range
        .and_then(|r| r.estimated_diameter_min)
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_MIN_DIAMETER_KM);
    let max = range
        .and_then(|r| r.estimated_diameter_max)
        .filter(|v| v.is_finite())
        .unwrap_or(min);
    (min + max) / 2.0
}

pub fn size_factor(neo: &Neo) -> f64 {
    clamp01((1.0 + average_diameter_km(neo) * 100.0).log10() / 2.0)
}

pub fn brightness_factor(neo: &Neo) -> f64 {
    let h = neo
        .absolute_magnitude_h
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_MAGNITUDE_H);
    clamp01((25.0 - h) / 10.0)
}

pub fn rarity_factor(neo: &Neo) -> f64 {
    let class = neo
        .orbit_class_type()
        .map(|c| c.trim().to_ascii_uppercase())
        .unwrap_or_default();
    if class.starts_with("AMO") {
        0.8
    } else if class.starts_with("ATE") {
        0.7
    } else {
        0.6
    }
}

/// Parse an approach timestamp, preferring the full date-time field.
pub fn approach_time(approach: &CloseApproach) -> Option<DateTime<Utc>> {
    let full = approach
        .close_approach_date_full
        .as_deref()
        .and_then(|s| NaiveDateTime::parse_from_str(s.trim(), "%Y-%b-%d %H:%M").ok());
    let naive = full.or_else(|| {
        approach
            .close_approach_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })?;
    Some(naive.and_utc())
}

/// The approach event that drives hype and velocity: the nearest upcoming
/// one, or the latest past one when nothing is upcoming.
pub fn reference_approach(
    approaches: &[CloseApproach],
    now: DateTime<Utc>,
) -> Option<(&CloseApproach, DateTime<Utc>)> {
    let dated = approaches
        .iter()
        .filter_map(|a| approach_time(a).map(|t| (a, t)));

    let mut next_future: Option<(&CloseApproach, DateTime<Utc>)> = None;
    let mut latest_past: Option<(&CloseApproach, DateTime<Utc>)> = None;
    for (approach, at) in dated {
        if at >= now {
            if next_future.map_or(true, |(_, best)| at < best) {
                next_future = Some((approach, at));
            }
        } else if latest_past.map_or(true, |(_, best)| at > best) {
            latest_past = Some((approach, at));
        }
    }
    next_future.or(latest_past)
}

pub fn hype_factor(reference: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let days = reference
        .map(|at| (at - now).num_milliseconds() as f64 / MS_PER_DAY)
        .unwrap_or(DEFAULT_HORIZON_DAYS);
    clamp01((-days.abs() / 180.0).exp())
}

pub fn accessibility_factor(neo: &Neo) -> f64 {
    let orbit = neo.orbital_data.as_ref();
    let moid = orbit
        .and_then(|o| o.minimum_orbit_intersection.as_deref())
        .and_then(parse_numeric)
        .unwrap_or(DEFAULT_MOID_AU);
    let inclination = orbit
        .and_then(|o| o.inclination.as_deref())
        .and_then(parse_numeric)
        .unwrap_or(DEFAULT_INCLINATION_DEG);

    let moid_difficulty = 1.0 - clamp01(moid / 0.5);
    let inclination_difficulty = clamp01(inclination / 30.0);
    0.6 * moid_difficulty + 0.4 * inclination_difficulty
}

pub fn velocity_factor(reference: Option<&CloseApproach>) -> f64 {
    let v = reference
        .and_then(CloseApproach::velocity_km_s)
        .unwrap_or(DEFAULT_VELOCITY_KM_S);
    clamp01((v - 5.0) / 30.0)
}

pub fn hazard_factor(neo: &Neo) -> f64 {
    if neo.is_potentially_hazardous_asteroid {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn approach(date: &str, full: Option<&str>) -> CloseApproach {
        CloseApproach {
            close_approach_date: Some(date.to_string()),
            close_approach_date_full: full.map(str::to_string),
            epoch_date_close_approach: None,
            relative_velocity: None,
            miss_distance: None,
            orbiting_body: None,
        }
    }

    #[test]
    fn test_clamp01_handles_nan_and_extremes() {
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(-3.0), 0.0);
        assert_eq!(clamp01(f64::INFINITY), 1.0);
        assert_eq!(clamp01(0.25), 0.25);
    }

    #[test]
    fn test_approach_time_prefers_full_timestamp() {
        let a = approach("2024-01-15", Some("2024-Jan-15 12:30"));
        let t = approach_time(&a).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap());

        let b = approach("2024-01-15", Some("not a date"));
        let t = approach_time(&b).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_reference_approach_prefers_nearest_future() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let approaches = vec![
            approach("2024-05-01", None),
            approach("2024-09-01", None),
            approach("2024-07-01", None),
        ];
        let (_, at) = reference_approach(&approaches, now).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_reference_approach_falls_back_to_latest_past() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let approaches = vec![approach("2020-01-01", None), approach("2023-03-01", None)];
        let (_, at) = reference_approach(&approaches, now).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_hype_decays_with_distance_in_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(hype_factor(Some(now), now), 1.0);
        let default = hype_factor(None, now);
        assert!((default - (-365.0f64 / 180.0).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_velocity_defaults_when_unresolvable() {
        assert!((velocity_factor(None) - 5.0 / 30.0).abs() < 1e-12);
    }
}
