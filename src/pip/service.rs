//! Point location over an ordered feature sequence.

use geo::Coord;
use rayon::prelude::*;
use tracing::debug;

use super::geometry::geometry_contains;
use crate::models::{Feature, GeoPoint, Poi};

/// Return the first feature, in sequence order, whose geometry contains the point.
///
/// Linear scan; no spatial priority beyond input order.
pub fn locate(point: GeoPoint, features: &[Feature]) -> Option<&Feature> {
    if !point.is_finite() {
        return None;
    }
    let coord: Coord<f64> = point.into();
    features
        .iter()
        .find(|f| geometry_contains(&f.geometry, coord))
}

/// Locate many points in parallel, returning the matching feature code per point
pub fn assign_points(points: &[GeoPoint], features: &[Feature]) -> Vec<Option<String>> {
    points
        .par_iter()
        .map(|p| locate(*p, features).map(|f| f.code.clone()))
        .collect()
}

/// Attach the containing municipality code to every POI.
///
/// Returns the number of POIs that fell inside some feature.
pub fn assign_pois(pois: &mut [Poi], features: &[Feature]) -> usize {
    let points: Vec<GeoPoint> = pois.iter().map(|p| p.location).collect();
    let codes = assign_points(&points, features);

    let mut matched = 0;
    for (poi, code) in pois.iter_mut().zip(codes) {
        if code.is_some() {
            matched += 1;
        }
        poi.municipality_code = code;
    }

    debug!("Assigned {} of {} POIs to a municipality", matched, pois.len());
    matched
}
