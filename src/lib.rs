//! Choromap - municipality lookup and choropleth classification for a GIS dashboard
//!
//! This library provides the point-in-polygon locator, the indicator
//! classifier and supporting models for the query and inspect binaries.

pub mod classify;
pub mod config;
pub mod data;
pub mod models;
pub mod pip;
pub mod poi;
pub mod routing;

pub use classify::{Colorizer, LegendEntry};
pub use models::{Feature, FeatureCollection, GeoPoint, Indicator, SampleValue};
pub use pip::{locate, FeatureIndex};
