use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::domain::{CatalogEntry, FilterSpec, HazardFilter, PageRequest, PagedResult, SortBy};
use crate::error::AppError;

const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub hazardous: Option<String>,
    pub size_min: Option<f64>,
    pub size_max: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    /// Comma-separated orbit class codes, e.g. `APO,AMO`.
    pub orbit_types: Option<String>,
    pub sort_by: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> Result<PageRequest, AppError> {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .map_err(AppError::BadRequest)
    }

    pub fn filters(&self) -> Result<FilterSpec, AppError> {
        let hazardous = match self.hazardous.as_deref() {
            None | Some("") => HazardFilter::All,
            Some(raw) => raw.parse().map_err(AppError::BadRequest)?,
        };
        let sort_by = match self.sort_by.as_deref() {
            None => None,
            Some(raw) => SortBy::parse_token(raw).map_err(AppError::BadRequest)?,
        };
        let orbit_types = self
            .orbit_types
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(FilterSpec {
            hazardous,
            size_min: self.size_min,
            size_max: self.size_max,
            price_min: self.price_min,
            price_max: self.price_max,
            distance_min: self.distance_min,
            distance_max: self.distance_max,
            orbit_types,
            sort_by,
        })
    }
}

pub async fn list_neos(
    Query(params): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<PagedResult<CatalogEntry>>, AppError> {
    let page = params.page_request()?;
    let filters = params.filters()?;

    let result = state.query.list(page, &filters).await?;
    Ok(Json(result))
}

pub async fn get_neo(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CatalogEntry>, AppError> {
    let entry = state.query.get_by_id(&id).await?;
    Ok(Json(entry))
}
