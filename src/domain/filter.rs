//! Catalog filter vocabulary and its store-level projection.
//!
//! A [`FilterSpec`] carries every dimension a client can ask for. Only part
//! of it can be answered by the store; [`CatalogPredicate`] is that part.
//! Distance bounds and sorting are applied in memory by the query service
//! because the closest-approach distance is a minimum over a nested array.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HazardFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "hazardous")]
    Hazardous,
    #[serde(rename = "not-hazardous")]
    NotHazardous,
}

impl FromStr for HazardFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(HazardFilter::All),
            "hazardous" => Ok(HazardFilter::Hazardous),
            "not-hazardous" => Ok(HazardFilter::NotHazardous),
            other => Err(format!(
                "hazardous must be all, hazardous, or not-hazardous, got {}",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[serde(rename = "size-asc")]
    SizeAsc,
    #[serde(rename = "size-desc")]
    SizeDesc,
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "distance-asc")]
    DistanceAsc,
    #[serde(rename = "distance-desc")]
    DistanceDesc,
}

impl SortBy {
    /// Parse a client sort token. `"None"` (or an empty string) means keep
    /// store order.
    pub fn parse_token(s: &str) -> Result<Option<SortBy>, String> {
        let sort = match s {
            "" | "None" => return Ok(None),
            "size-asc" => SortBy::SizeAsc,
            "size-desc" => SortBy::SizeDesc,
            "price-asc" => SortBy::PriceAsc,
            "price-desc" => SortBy::PriceDesc,
            "distance-asc" => SortBy::DistanceAsc,
            "distance-desc" => SortBy::DistanceDesc,
            other => return Err(format!("unknown sortBy: {}", other)),
        };
        Ok(Some(sort))
    }
}

/// All optional client filter dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub hazardous: HazardFilter,
    pub size_min: Option<f64>,
    pub size_max: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    pub orbit_types: Vec<String>,
    pub sort_by: Option<SortBy>,
}

impl FilterSpec {
    /// Reject contradictory or non-numeric bounds before any I/O happens.
    pub fn validate(&self) -> Result<(), String> {
        check_range("size", self.size_min, self.size_max)?;
        check_range("price", self.price_min, self.price_max)?;
        check_range("distance", self.distance_min, self.distance_max)?;
        Ok(())
    }

    /// Whether an in-memory distance pass is needed.
    pub fn has_distance_bounds(&self) -> bool {
        self.distance_min.is_some() || self.distance_max.is_some()
    }

    /// Inclusive distance bound check; +inf passes a lone lower bound.
    pub fn distance_matches(&self, distance_km: f64) -> bool {
        self.distance_min.map_or(true, |min| distance_km >= min)
            && self.distance_max.map_or(true, |max| distance_km <= max)
    }
}

fn check_range(name: &str, min: Option<f64>, max: Option<f64>) -> Result<(), String> {
    for (label, bound) in [("Min", min), ("Max", max)] {
        if let Some(v) = bound {
            if v.is_nan() {
                return Err(format!("{}{} must be a number", name, label));
            }
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(format!("{}Min must not exceed {}Max", name, name));
        }
    }
    Ok(())
}

/// Store-expressible subset of a [`FilterSpec`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPredicate {
    pub hazardous: Option<bool>,
    pub size_min: Option<f64>,
    pub size_max: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub orbit_types: Vec<String>,
}

impl From<&FilterSpec> for CatalogPredicate {
    fn from(filters: &FilterSpec) -> Self {
        let hazardous = match filters.hazardous {
            HazardFilter::All => None,
            HazardFilter::Hazardous => Some(true),
            HazardFilter::NotHazardous => Some(false),
        };
        let orbit_types = filters
            .orbit_types
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            hazardous,
            size_min: filters.size_min,
            size_max: filters.size_max,
            price_min: filters.price_min,
            price_max: filters.price_max,
            orbit_types,
        }
    }
}
