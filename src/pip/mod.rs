//! Point-in-Polygon (PIP) municipality lookup.
//!
//! Matches a map click (or any point) to the first feature containing it,
//! either by linear scan or through an R-tree prefilter.

mod geometry;
mod index;
mod service;

pub use geometry::{geometry_contains, multi_polygon_contains, polygon_contains, ring_contains};
pub use index::FeatureIndex;
pub use service::{assign_pois, assign_points, locate};
