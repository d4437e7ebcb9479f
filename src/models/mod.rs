//! Core data models for the dashboard components.

pub mod feature;
pub mod indicator;
pub mod place;
pub mod poi;

pub use feature::{AreaGeometry, Feature, FeatureCollection, PropertyKeys};
pub use indicator::{Indicator, IndicatorSample, IndicatorTable, PaletteFamily, SampleValue};
pub use place::{BboxError, GeoBbox, GeoPoint};
pub use poi::{NewPoi, Poi, PoiError};
