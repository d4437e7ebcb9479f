//! Geographic primitives shared by the locator, POI filtering and routing.

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geographic point (WGS84 degrees, GeoJSON axis order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(c: Coord<f64>) -> Self {
        Self { lon: c.x, lat: c.y }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BboxError {
    #[error("bbox must be minLon,minLat,maxLon,maxLat (got {0} parts)")]
    Arity(usize),
    #[error("bbox component '{0}' is not a number")]
    NotANumber(String),
    #[error("bbox minimum corner lies above its maximum corner")]
    Inverted,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBbox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBbox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Parse bbox string "minLon,minLat,maxLon,maxLat"
    pub fn parse(s: &str) -> Result<Self, BboxError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxError::Arity(parts.len()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| BboxError::NotANumber(part.to_string()))?;
        }

        let [min_lon, min_lat, max_lon, max_lat] = values;
        if min_lon > max_lon || min_lat > max_lat {
            return Err(BboxError::Inverted);
        }

        Ok(Self::new(min_lon, min_lat, max_lon, max_lat))
    }

    /// Inclusive containment test
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lon >= self.min_lon
            && point.lon <= self.max_lon
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let bbox = GeoBbox::parse("-46.7, -23.7, -46.4, -23.5").unwrap();
        assert_eq!(bbox, GeoBbox::new(-46.7, -23.7, -46.4, -23.5));
        assert!(bbox.contains(&GeoPoint::new(-46.5, -23.6)));
        assert!(!bbox.contains(&GeoPoint::new(-46.3, -23.6)));
    }

    #[test]
    fn test_parse_bbox_errors() {
        assert_eq!(GeoBbox::parse("1,2,3"), Err(BboxError::Arity(3)));
        assert_eq!(
            GeoBbox::parse("1,2,x,4"),
            Err(BboxError::NotANumber("x".to_string()))
        );
        assert_eq!(GeoBbox::parse("5,0,1,1"), Err(BboxError::Inverted));
    }
}
