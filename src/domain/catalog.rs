//! Materialized catalog items and their ownership annotation.

use serde::{Deserialize, Serialize};

use super::neo::{closest_approach_km, CloseApproach, EstimatedDiameter, Neo, OrbitalData};

/// Derived commerce attributes for one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Integer price in [100, 900].
    pub price: i64,
    /// Average diameter in metres.
    pub size: f64,
}

/// A priced, materialized record keyed by the upstream id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub neo_reference_id: String,
    pub name: String,
    pub nasa_jpl_url: String,
    pub absolute_magnitude_h: Option<f64>,
    pub estimated_diameter: Option<EstimatedDiameter>,
    pub is_potentially_hazardous_asteroid: bool,
    pub is_sentry_object: bool,
    pub close_approach_data: Vec<CloseApproach>,
    pub orbital_data: Option<OrbitalData>,
    pub price: i64,
    pub size: f64,
}

impl CatalogItem {
    /// Assemble an item from a raw record and its valuation.
    ///
    /// Missing string identifiers fall back to the natural key so the
    /// required columns are always populated.
    pub fn from_neo(neo: Neo, valuation: Valuation) -> Self {
        let neo_reference_id = neo.neo_reference_id.unwrap_or_else(|| neo.id.clone());
        let name = neo.name.unwrap_or_else(|| neo.id.clone());
        Self {
            id: neo.id,
            neo_reference_id,
            name,
            nasa_jpl_url: neo.nasa_jpl_url.unwrap_or_default(),
            absolute_magnitude_h: neo.absolute_magnitude_h,
            estimated_diameter: neo.estimated_diameter,
            is_potentially_hazardous_asteroid: neo.is_potentially_hazardous_asteroid,
            is_sentry_object: neo.is_sentry_object,
            close_approach_data: neo.close_approach_data,
            orbital_data: neo.orbital_data,
            price: valuation.price,
            size: valuation.size,
        }
    }

    pub fn orbit_class_type(&self) -> Option<&str> {
        self.orbital_data
            .as_ref()
            .and_then(|o| o.orbit_class.as_ref())
            .and_then(|c| c.orbit_class_type.as_deref())
    }

    /// Closest-approach distance in km; +inf without approach data.
    pub fn closest_approach_km(&self) -> f64 {
        closest_approach_km(&self.close_approach_data)
    }
}

/// Current owner of a catalog item, supplied by the user-records component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub user_id: String,
    pub display_name: String,
}

/// A catalog item annotated with its owner for the read path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub owner: Option<Owner>,
}
