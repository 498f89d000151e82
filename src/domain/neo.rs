//! Raw near-Earth object records as published by the upstream feed.
//!
//! Field names mirror the feed's JSON so records round-trip verbatim into
//! the catalog's JSON columns. Numeric quantities that the feed publishes as
//! strings stay strings here; the pricing layer parses them leniently.

use serde::{Deserialize, Serialize};

/// One near-Earth object as returned by the range or detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neo {
    pub id: String,
    #[serde(default)]
    pub neo_reference_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nasa_jpl_url: Option<String>,
    #[serde(default)]
    pub absolute_magnitude_h: Option<f64>,
    #[serde(default)]
    pub estimated_diameter: Option<EstimatedDiameter>,
    #[serde(default)]
    pub is_potentially_hazardous_asteroid: bool,
    #[serde(default)]
    pub close_approach_data: Vec<CloseApproach>,
    #[serde(default)]
    pub is_sentry_object: bool,
    #[serde(default)]
    pub orbital_data: Option<OrbitalData>,
}

/// Min/max diameter pair for one unit system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiameterRange {
    #[serde(default)]
    pub estimated_diameter_min: Option<f64>,
    #[serde(default)]
    pub estimated_diameter_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedDiameter {
    #[serde(default)]
    pub kilometers: Option<DiameterRange>,
    #[serde(default)]
    pub meters: Option<DiameterRange>,
    #[serde(default)]
    pub miles: Option<DiameterRange>,
    #[serde(default)]
    pub feet: Option<DiameterRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseApproach {
    #[serde(default)]
    pub close_approach_date: Option<String>,
    #[serde(default)]
    pub close_approach_date_full: Option<String>,
    #[serde(default)]
    pub epoch_date_close_approach: Option<i64>,
    #[serde(default)]
    pub relative_velocity: Option<RelativeVelocity>,
    #[serde(default)]
    pub miss_distance: Option<MissDistance>,
    #[serde(default)]
    pub orbiting_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeVelocity {
    #[serde(default)]
    pub kilometers_per_second: Option<String>,
    #[serde(default)]
    pub kilometers_per_hour: Option<String>,
    #[serde(default)]
    pub miles_per_hour: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissDistance {
    #[serde(default)]
    pub astronomical: Option<String>,
    #[serde(default)]
    pub lunar: Option<String>,
    #[serde(default)]
    pub kilometers: Option<String>,
    #[serde(default)]
    pub miles: Option<String>,
}

/// Extended orbit determination block from the per-object detail endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrbitalData {
    #[serde(default)]
    pub orbit_id: Option<String>,
    #[serde(default)]
    pub orbit_determination_date: Option<String>,
    #[serde(default)]
    pub first_observation_date: Option<String>,
    #[serde(default)]
    pub last_observation_date: Option<String>,
    #[serde(default)]
    pub data_arc_in_days: Option<i64>,
    #[serde(default)]
    pub observations_used: Option<i64>,
    #[serde(default)]
    pub orbit_uncertainty: Option<String>,
    #[serde(default)]
    pub minimum_orbit_intersection: Option<String>,
    #[serde(default)]
    pub jupiter_tisserand_invariant: Option<String>,
    #[serde(default)]
    pub epoch_osculation: Option<String>,
    #[serde(default)]
    pub eccentricity: Option<String>,
    #[serde(default)]
    pub semi_major_axis: Option<String>,
    #[serde(default)]
    pub inclination: Option<String>,
    #[serde(default)]
    pub ascending_node_longitude: Option<String>,
    #[serde(default)]
    pub orbital_period: Option<String>,
    #[serde(default)]
    pub perihelion_distance: Option<String>,
    #[serde(default)]
    pub perihelion_argument: Option<String>,
    #[serde(default)]
    pub aphelion_distance: Option<String>,
    #[serde(default)]
    pub perihelion_time: Option<String>,
    #[serde(default)]
    pub mean_anomaly: Option<String>,
    #[serde(default)]
    pub mean_motion: Option<String>,
    #[serde(default)]
    pub equinox: Option<String>,
    #[serde(default)]
    pub orbit_class: Option<OrbitClass>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitClass {
    #[serde(default)]
    pub orbit_class_type: Option<String>,
    #[serde(default)]
    pub orbit_class_description: Option<String>,
    #[serde(default)]
    pub orbit_class_range: Option<String>,
}

impl Neo {
    /// Kilometre diameter block, if the feed supplied one.
    pub fn diameter_km(&self) -> Option<&DiameterRange> {
        self.estimated_diameter
            .as_ref()
            .and_then(|d| d.kilometers.as_ref())
    }

    /// Orbit class code (e.g. "APO"), if orbital detail is attached.
    pub fn orbit_class_type(&self) -> Option<&str> {
        self.orbital_data
            .as_ref()
            .and_then(|o| o.orbit_class.as_ref())
            .and_then(|c| c.orbit_class_type.as_deref())
    }
}

impl CloseApproach {
    /// Miss distance in kilometres, ignoring unparseable values.
    pub fn miss_distance_km(&self) -> Option<f64> {
        self.miss_distance
            .as_ref()
            .and_then(|m| m.kilometers.as_deref())
            .and_then(parse_numeric)
    }

    /// Relative velocity in km/s, ignoring unparseable values.
    pub fn velocity_km_s(&self) -> Option<f64> {
        self.relative_velocity
            .as_ref()
            .and_then(|v| v.kilometers_per_second.as_deref())
            .and_then(parse_numeric)
    }
}

/// Minimum miss distance across all recorded approaches, or +inf when none
/// has a usable kilometre value.
pub fn closest_approach_km(approaches: &[CloseApproach]) -> f64 {
    approaches
        .iter()
        .filter_map(CloseApproach::miss_distance_km)
        .fold(f64::INFINITY, f64::min)
}

/// Parse a feed numeric-string, rejecting NaN and infinities.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
