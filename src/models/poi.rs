//! Point of interest records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::GeoPoint;

/// A point of interest (hospital, school, park, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poi {
    pub id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Category as tagged at the source (e.g. "hospital", "park")
    pub category: String,

    pub location: GeoPoint,

    /// Code of the municipality containing the POI, once assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Poi {
    pub fn new(id: i64, category: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id,
            name: None,
            category: category.into(),
            location,
            municipality_code: None,
            created_at: None,
        }
    }

    /// Display name, falling back to the category
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.category)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PoiError {
    #[error("latitude and longitude must be finite numbers")]
    NonFiniteLocation,
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A POI submitted by a user, before it gets an id
#[derive(Debug, Clone, Deserialize)]
pub struct NewPoi {
    #[serde(default, alias = "tipo")]
    pub category: Option<String>,
    #[serde(default, alias = "nome")]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewPoi {
    pub fn location(&self) -> Result<GeoPoint, PoiError> {
        let point = GeoPoint::new(self.longitude, self.latitude);
        if !point.is_finite() {
            return Err(PoiError::NonFiniteLocation);
        }
        if !(-90.0..=90.0).contains(&point.lat) {
            return Err(PoiError::LatitudeOutOfRange(point.lat));
        }
        if !(-180.0..=180.0).contains(&point.lon) {
            return Err(PoiError::LongitudeOutOfRange(point.lon));
        }
        Ok(point)
    }

    /// Build the stored record. A blank category becomes "other".
    pub fn into_poi(self, id: i64, created_at: DateTime<Utc>) -> Result<Poi, PoiError> {
        let location = self.location()?;
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("other")
            .to_string();

        Ok(Poi {
            id,
            name: self
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            category,
            location,
            municipality_code: None,
            created_at: Some(created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_poi(lon: f64, lat: f64) -> NewPoi {
        NewPoi {
            category: Some(" hospital ".to_string()),
            name: Some("Hospital Central".to_string()),
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn test_into_poi() {
        let now = Utc::now();
        let poi = new_poi(-46.49, -23.51).into_poi(12, now).unwrap();
        assert_eq!(poi.id, 12);
        assert_eq!(poi.category, "hospital");
        assert_eq!(poi.display_name(), "Hospital Central");
        assert_eq!(poi.location, GeoPoint::new(-46.49, -23.51));
        assert_eq!(poi.created_at, Some(now));
        assert_eq!(poi.municipality_code, None);
    }

    #[test]
    fn test_rejects_bad_location() {
        let now = Utc::now();
        assert_eq!(
            new_poi(f64::NAN, 0.0).into_poi(1, now).unwrap_err(),
            PoiError::NonFiniteLocation
        );
        assert_eq!(
            new_poi(0.0, f64::INFINITY).into_poi(1, now).unwrap_err(),
            PoiError::NonFiniteLocation
        );
        assert_eq!(
            new_poi(0.0, 91.0).into_poi(1, now).unwrap_err(),
            PoiError::LatitudeOutOfRange(91.0)
        );
        assert_eq!(
            new_poi(-181.0, 0.0).into_poi(1, now).unwrap_err(),
            PoiError::LongitudeOutOfRange(-181.0)
        );
    }

    #[test]
    fn test_deserialize_source_field_names() {
        let new: NewPoi = serde_json::from_str(
            r#"{"tipo":"park","nome":"  ","latitude":-23.5,"longitude":-46.6}"#,
        )
        .unwrap();
        let poi = new.into_poi(1, Utc::now()).unwrap();
        assert_eq!(poi.category, "park");
        assert_eq!(poi.name, None);
    }

    #[test]
    fn test_blank_category_is_other() {
        let new = NewPoi {
            category: None,
            name: None,
            latitude: 0.0,
            longitude: 0.0,
        };
        assert_eq!(new.into_poi(1, Utc::now()).unwrap().category, "other");
    }
}
