//! OpenRouteService directions client.

use geo::{Coord, LineString};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::models::GeoPoint;

pub const DEFAULT_ORS_URL: &str = "https://api.openrouteservice.org";

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no OpenRouteService API key configured")]
    MissingApiKey,
    #[error("invalid routing URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("routing request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("routing service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid routing response: {0}")]
    InvalidResponse(&'static str),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteProfile {
    #[default]
    #[serde(rename = "foot-walking")]
    FootWalking,
    #[serde(rename = "driving-car")]
    DrivingCar,
}

impl RouteProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteProfile::FootWalking => "foot-walking",
            RouteProfile::DrivingCar => "driving-car",
        }
    }
}

/// Route geometry plus the service's own totals when present
#[derive(Debug, Clone)]
pub struct Route {
    pub line: LineString<f64>,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
struct DirectionsFeature {
    geometry: Option<DirectionsGeometry>,
    #[serde(default)]
    properties: Option<DirectionsProperties>,
}

#[derive(Debug, Deserialize)]
struct DirectionsGeometry {
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct DirectionsProperties {
    summary: Option<DirectionsSummary>,
}

#[derive(Debug, Deserialize)]
struct DirectionsSummary {
    distance: Option<f64>,
    duration: Option<f64>,
}

pub struct OrsClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl OrsClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, RouteError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RouteError::MissingApiKey);
        }

        let client = Client::builder()
            .user_agent(concat!("choromap/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            api_key,
        })
    }

    /// Directions endpoint URL for a profile and pair of points
    pub fn directions_url(
        &self,
        profile: RouteProfile,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Url, RouteError> {
        let mut url = self
            .base_url
            .join(&format!("v2/directions/{}", profile.as_str()))?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("start", &format!("{},{}", origin.lon, origin.lat))
            .append_pair("end", &format!("{},{}", destination.lon, destination.lat));
        Ok(url)
    }

    pub async fn fetch_route(
        &self,
        profile: RouteProfile,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Route, RouteError> {
        let url = self.directions_url(profile, origin, destination)?;
        debug!(
            "Requesting {} route from ({}, {}) to ({}, {})",
            profile.as_str(),
            origin.lon,
            origin.lat,
            destination.lon,
            destination.lat
        );

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Routing service returned {}: {}", status, body);
            return Err(RouteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: DirectionsResponse = response.json().await?;
        parse_route(body)
    }
}

fn parse_route(body: DirectionsResponse) -> Result<Route, RouteError> {
    let feature = body
        .features
        .into_iter()
        .next()
        .ok_or(RouteError::InvalidResponse("no route feature"))?;
    let geometry = feature
        .geometry
        .ok_or(RouteError::InvalidResponse("route has no geometry"))?;

    let coords: Vec<Coord<f64>> = geometry
        .coordinates
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| Coord { x: c[0], y: c[1] })
        .collect();
    if coords.len() < 2 {
        return Err(RouteError::InvalidResponse("route has fewer than two positions"));
    }

    let summary = feature.properties.and_then(|p| p.summary);
    Ok(Route {
        line: LineString::new(coords),
        distance_m: summary.as_ref().and_then(|s| s.distance),
        duration_s: summary.as_ref().and_then(|s| s.duration),
    })
}
