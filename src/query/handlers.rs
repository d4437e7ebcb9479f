//! HTTP handlers for the query server.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use choromap::classify::{
    choropleth, format_indicator_value, ClassifierConfig, Colorizer, FeatureColor, HdiClass,
    LegendEntry, Method, PaletteName, MAX_CLASSES,
};
use choromap::models::{
    Feature, GeoPoint, Indicator, IndicatorSample, IndicatorTable, NewPoi, Poi, SampleValue,
};
use choromap::pip::FeatureIndex;
use choromap::poi::{create_poi, CategoryStyle, CategoryStyleTable, PoiFilter};
use choromap::routing::{OrsClient, RouteProfile, RouteSummary};

const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_POI_PAGE_SIZE: usize = 200;
const MAX_PAGE_SIZE: usize = 500;

/// Application state shared across handlers
pub struct AppState {
    pub index: FeatureIndex,
    pub indicators: IndicatorTable,
    pub pois: RwLock<Vec<Poi>>,
    pub styles: CategoryStyleTable,
    pub classifier: ClassifierConfig,
    pub ors: Option<OrsClient>,
}

type ApiError = (StatusCode, String);

fn bad_request(msg: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, msg.into())
}

fn not_found(msg: impl Into<String>) -> ApiError {
    (StatusCode::NOT_FOUND, msg.into())
}

#[derive(Deserialize)]
pub struct PageParams {
    #[serde(default)]
    skip: usize,
    limit: Option<usize>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    features: usize,
    indicator_rows: usize,
    pois: usize,
    routing: bool,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        features: state.index.features().len(),
        indicator_rows: state.indicators.len(),
        pois: state.pois.read().await.len(),
        routing: state.ors.is_some(),
    })
}

#[derive(Deserialize)]
pub struct LocateQueryParams {
    #[serde(rename = "point.lon")]
    point_lon: f64,
    #[serde(rename = "point.lat")]
    point_lat: f64,
}

#[derive(Serialize)]
pub struct IndicatorValue {
    indicator: Indicator,
    value: SampleValue,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hdi_class: Option<HdiClass>,
}

#[derive(Serialize)]
pub struct LocatedFeature {
    code: String,
    name: String,
    properties: Map<String, Value>,
    indicators: Vec<IndicatorValue>,
}

#[derive(Serialize)]
pub struct LocateResponse {
    feature: Option<LocatedFeature>,
}

impl LocatedFeature {
    fn new(feature: &Feature, state: &AppState) -> Self {
        let locale = state.classifier.locale;
        let indicators = Indicator::known()
            .into_iter()
            .map(|indicator| {
                let value = state.indicators.value(&feature.code, &indicator);
                let hdi_class = match indicator {
                    Indicator::Hdi => value.as_number().map(HdiClass::from_value),
                    _ => None,
                };
                IndicatorValue {
                    text: format_indicator_value(&value, &indicator, locale),
                    indicator,
                    value,
                    hdi_class,
                }
            })
            .collect();

        Self {
            code: feature.code.clone(),
            name: feature.name.clone(),
            properties: feature.properties.clone(),
            indicators,
        }
    }
}

/// Municipality containing a point, with its indicator values
pub async fn locate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateQueryParams>,
) -> Json<LocateResponse> {
    let point = GeoPoint::new(params.point_lon, params.point_lat);
    let feature = state
        .index
        .locate(point)
        .map(|f| LocatedFeature::new(f, &state));

    debug!(
        "Locate ({}, {}) -> {:?}",
        point.lon,
        point.lat,
        feature.as_ref().map(|f| &f.code)
    );

    Json(LocateResponse { feature })
}

#[derive(Serialize)]
pub struct MunicipalitySummary {
    code: String,
    name: String,
}

#[derive(Serialize)]
pub struct MunicipalityList {
    total: usize,
    items: Vec<MunicipalitySummary>,
}

/// Municipalities in load order, paginated
pub async fn municipalities_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Json<MunicipalityList> {
    let features = state.index.features();
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    Json(MunicipalityList {
        total: features.len(),
        items: features
            .iter()
            .skip(params.skip)
            .take(limit)
            .map(|f| MunicipalitySummary {
                code: f.code.clone(),
                name: f.name.clone(),
            })
            .collect(),
    })
}

/// One municipality by code, with its indicator values
pub async fn municipality_handler(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<LocatedFeature>, ApiError> {
    let feature = state
        .index
        .by_code(&code)
        .ok_or_else(|| not_found(format!("municipality '{}' not found", code)))?;
    Ok(Json(LocatedFeature::new(feature, &state)))
}

#[derive(Serialize)]
pub struct IndicatorResponse {
    indicator: Indicator,
    samples: Vec<IndicatorSample>,
}

/// Raw values of one indicator for every municipality in the table
pub async fn indicator_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<IndicatorResponse> {
    let indicator = Indicator::from_key(&key);
    let samples = state.indicators.samples(&indicator);
    Json(IndicatorResponse { indicator, samples })
}

#[derive(Deserialize)]
pub struct ClassifyQueryParams {
    indicator: String,
    classes: Option<usize>,
    palette: Option<String>,
}

impl ClassifyQueryParams {
    fn config(&self, base: &ClassifierConfig) -> Result<ClassifierConfig, ApiError> {
        let mut config = base.clone();
        if let Some(classes) = self.classes {
            if classes == 0 || classes > MAX_CLASSES {
                return Err(bad_request(format!(
                    "classes must be between 1 and {}",
                    MAX_CLASSES
                )));
            }
            config.classes = classes;
        }
        if let Some(palette) = &self.palette {
            config.palette = Some(palette.parse::<PaletteName>().map_err(bad_request)?);
        }
        Ok(config)
    }
}

#[derive(Serialize)]
pub struct LegendResponse {
    indicator: Indicator,
    method: Method,
    breaks: Vec<f64>,
    legend: Vec<LegendEntry>,
}

impl LegendResponse {
    fn from_colorizer(colorizer: &Colorizer) -> Self {
        Self {
            indicator: colorizer.indicator().clone(),
            method: colorizer.method(),
            breaks: colorizer.breaks().to_vec(),
            legend: colorizer.legend().to_vec(),
        }
    }
}

/// Legend for an indicator over the whole loaded map
pub async fn legend_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClassifyQueryParams>,
) -> Result<Json<LegendResponse>, ApiError> {
    let config = params.config(&state.classifier)?;
    let indicator = Indicator::from_key(&params.indicator);

    let values: Vec<SampleValue> = state
        .index
        .features()
        .iter()
        .map(|f| state.indicators.value(&f.code, &indicator))
        .collect();
    let colorizer = Colorizer::build(&indicator, &values, &config);

    Ok(Json(LegendResponse::from_colorizer(&colorizer)))
}

#[derive(Serialize)]
pub struct ChoroplethResponse {
    #[serde(flatten)]
    legend: LegendResponse,
    features: Vec<FeatureColor>,
}

/// Fill color for every municipality
pub async fn choropleth_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClassifyQueryParams>,
) -> Result<Json<ChoroplethResponse>, ApiError> {
    let config = params.config(&state.classifier)?;
    let indicator = Indicator::from_key(&params.indicator);

    let result = choropleth(state.index.features(), &state.indicators, &indicator, &config);

    Ok(Json(ChoroplethResponse {
        legend: LegendResponse::from_colorizer(&result.colorizer),
        features: result.colors,
    }))
}

#[derive(Deserialize)]
pub struct PoiQueryParams {
    /// Bounding box: "minLon,minLat,maxLon,maxLat"
    bbox: Option<String>,
    category: Option<String>,
    #[serde(default)]
    skip: usize,
    limit: Option<usize>,
}

#[derive(Serialize)]
pub struct PoiResult<'a> {
    #[serde(flatten)]
    poi: &'a Poi,
    style: &'a CategoryStyle,
}

#[derive(Serialize)]
pub struct PoiResponse<'a> {
    total: usize,
    features: Vec<PoiResult<'a>>,
}

/// POIs filtered by category and bbox
pub async fn pois_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PoiQueryParams>,
) -> Result<Json<Value>, ApiError> {
    let filter = PoiFilter::from_params(params.category.as_deref(), params.bbox.as_deref())
        .map_err(|e| bad_request(e.to_string()))?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_POI_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);

    let pois = state.pois.read().await;
    let (total, page) = filter.page(&pois, params.skip, limit);
    let response = PoiResponse {
        total,
        features: page
            .into_iter()
            .map(|poi| PoiResult {
                poi,
                style: state.styles.style_for(&poi.category),
            })
            .collect(),
    };

    serde_json::to_value(&response)
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[derive(Serialize)]
pub struct CreatedPoi {
    #[serde(flatten)]
    poi: Poi,
    style: CategoryStyle,
}

/// Add a user-submitted POI
pub async fn create_poi_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewPoi>,
) -> Result<(StatusCode, Json<CreatedPoi>), ApiError> {
    let poi = {
        let mut pois = state.pois.write().await;
        create_poi(new, &mut pois, &state.index).map_err(|e| bad_request(e.to_string()))?
    };
    let style = state.styles.style_for(&poi.category).clone();

    Ok((StatusCode::CREATED, Json(CreatedPoi { poi, style })))
}

#[derive(Serialize)]
pub struct CategoryStyleEntry<'a> {
    category: &'a str,
    #[serde(flatten)]
    style: &'a CategoryStyle,
}

#[derive(Serialize)]
pub struct StylesResponse<'a> {
    categories: Vec<CategoryStyleEntry<'a>>,
    default: &'a CategoryStyle,
}

/// Marker style of every known POI category plus the fallback
pub async fn poi_styles_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let styles = &state.styles;
    let response = StylesResponse {
        categories: styles
            .categories()
            .map(|category| CategoryStyleEntry {
                category,
                style: styles.style_for(category),
            })
            .collect(),
        default: styles.default_style(),
    };
    serde_json::to_value(&response)
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[derive(Deserialize)]
pub struct RouteQueryParams {
    #[serde(rename = "start.lon")]
    start_lon: f64,
    #[serde(rename = "start.lat")]
    start_lat: f64,
    #[serde(rename = "end.lon")]
    end_lon: f64,
    #[serde(rename = "end.lat")]
    end_lat: f64,
    #[serde(default)]
    profile: RouteProfile,
}

#[derive(Serialize)]
pub struct RouteResponse {
    profile: RouteProfile,
    summary: RouteSummary,
    /// Travel time reported by the routing service for this profile
    #[serde(skip_serializing_if = "Option::is_none")]
    service_duration_s: Option<f64>,
    /// Route positions as [lon, lat]
    coordinates: Vec<[f64; 2]>,
}

/// Route between two points with distance and walking/driving times
pub async fn route_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RouteQueryParams>,
) -> Result<Json<RouteResponse>, ApiError> {
    let ors = state.ors.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "routing is not configured".to_string(),
    ))?;

    let origin = GeoPoint::new(params.start_lon, params.start_lat);
    let destination = GeoPoint::new(params.end_lon, params.end_lat);
    if !origin.is_finite() || !destination.is_finite() {
        return Err(bad_request("route endpoints must be finite coordinates"));
    }

    let route = ors
        .fetch_route(params.profile, origin, destination)
        .await
        .map_err(|e| {
            tracing::error!("Route lookup failed: {}", e);
            (StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    let summary = match route.distance_m {
        Some(d) => RouteSummary::from_distance(d),
        None => RouteSummary::from_line(&route.line),
    };

    Ok(Json(RouteResponse {
        profile: params.profile,
        summary,
        service_duration_s: route.duration_s,
        coordinates: route.line.coords().map(|c| [c.x, c.y]).collect(),
    }))
}
