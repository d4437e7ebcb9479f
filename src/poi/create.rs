//! User-submitted POIs.

use chrono::Utc;
use tracing::info;

use crate::models::{NewPoi, Poi, PoiError};
use crate::pip::FeatureIndex;

/// One past the largest id in use
pub fn next_id(pois: &[Poi]) -> i64 {
    pois.iter().map(|p| p.id).max().map_or(1, |id| id + 1)
}

/// Validate a submitted POI, attach it to its municipality and append it.
pub fn create_poi(new: NewPoi, pois: &mut Vec<Poi>, index: &FeatureIndex) -> Result<Poi, PoiError> {
    let mut poi = new.into_poi(next_id(pois), Utc::now())?;
    poi.municipality_code = index.locate(poi.location).map(|f| f.code.clone());

    info!(
        "Created POI {} ({}) in {}",
        poi.id,
        poi.category,
        poi.municipality_code.as_deref().unwrap_or("no municipality")
    );

    pois.push(poi.clone());
    Ok(poi)
}
