//! Walking / driving route summaries between two points.
//!
//! Route geometry comes from OpenRouteService; distances and travel times
//! are derived locally.

mod client;
mod summary;

pub use client::{OrsClient, Route, RouteError, RouteProfile, DEFAULT_ORS_URL};
pub use summary::{
    format_distance, format_duration, haversine_distance, path_length_meters, travel_seconds,
    RouteSummary, DRIVING_SPEED_KMH, WALKING_SPEED_KMH,
};
