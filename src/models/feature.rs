//! Municipality features loaded from GeoJSON.

use anyhow::anyhow;
use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use geojson::feature::Id;
use geojson::GeoJson;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Areal geometry of a feature
#[derive(Debug, Clone, PartialEq)]
pub enum AreaGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl AreaGeometry {
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            AreaGeometry::Polygon(p) => p.bounding_rect(),
            AreaGeometry::MultiPolygon(mp) => mp.bounding_rect(),
        }
    }
}

impl From<Polygon<f64>> for AreaGeometry {
    fn from(p: Polygon<f64>) -> Self {
        AreaGeometry::Polygon(p)
    }
}

impl From<MultiPolygon<f64>> for AreaGeometry {
    fn from(mp: MultiPolygon<f64>) -> Self {
        AreaGeometry::MultiPolygon(mp)
    }
}

/// A municipality (or any other area) with its geometry and raw properties.
///
/// Features are immutable once loaded.
#[derive(Debug, Clone)]
pub struct Feature {
    /// GeoJSON feature `id`, if present
    pub id: Option<Value>,

    /// Unique code (e.g. the IBGE municipality code)
    pub code: String,

    /// Display name
    pub name: String,

    pub geometry: AreaGeometry,

    /// All properties as found in the source document
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(code: impl Into<String>, name: impl Into<String>, geometry: AreaGeometry) -> Self {
        Self {
            id: None,
            code: code.into(),
            name: name.into(),
            geometry,
            properties: Map::new(),
        }
    }
}

/// Property keys consulted, in order, when reading a feature's code and name
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PropertyKeys {
    pub code: Vec<String>,
    pub name: Vec<String>,
}

impl Default for PropertyKeys {
    fn default() -> Self {
        Self {
            code: vec!["code".into(), "ibge_code".into(), "id".into()],
            name: vec!["name".into(), "nome".into()],
        }
    }
}

/// Ordered collection of features. Order is significant for lookups.
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Parse a GeoJSON FeatureCollection.
    ///
    /// Features without areal geometry or without a code are skipped.
    pub fn from_geojson_str(text: &str, keys: &PropertyKeys) -> anyhow::Result<Self> {
        let collection = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(fc) => fc,
            _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
        };
        Ok(Self::from_geojson(collection, keys))
    }

    pub fn from_geojson(collection: geojson::FeatureCollection, keys: &PropertyKeys) -> Self {
        let total = collection.features.len();

        let mut features = Vec::with_capacity(total);
        for (idx, gf) in collection.features.into_iter().enumerate() {
            let geometry = match gf.geometry.and_then(|g| convert_geometry(g.value)) {
                Some(g) => g,
                None => {
                    debug!("Skipping feature #{}: no polygonal geometry", idx);
                    continue;
                }
            };

            let id = gf.id.map(|id| match id {
                Id::String(s) => Value::String(s),
                Id::Number(n) => Value::Number(n),
            });
            let properties = gf.properties.unwrap_or_default();

            let code = match first_text(&properties, &keys.code)
                .or_else(|| id.as_ref().and_then(value_text))
            {
                Some(c) => c,
                None => {
                    debug!("Skipping feature #{}: no code property", idx);
                    continue;
                }
            };

            let name = first_text(&properties, &keys.name).unwrap_or_else(|| code.clone());

            features.push(Feature {
                id,
                code,
                name,
                geometry,
                properties,
            });
        }

        info!("Loaded {} of {} features", features.len(), total);

        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn first_text(properties: &Map<String, Value>, keys: &[String]) -> Option<String> {
    keys.iter()
        .filter_map(|k| properties.get(k))
        .find_map(value_text)
}

/// Render a property value as a trimmed, non-empty string
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().filter(|f| f.fract() == 0.0).map_or_else(
                || n.to_string(),
                |f| format!("{:.0}", f),
            ),
        },
        _ => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Positions shorter than two numbers are dropped
pub(crate) fn convert_position(position: &[f64]) -> Option<Coord<f64>> {
    match position {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn convert_ring(positions: Vec<Vec<f64>>) -> LineString<f64> {
    positions
        .iter()
        .filter_map(|p| convert_position(p))
        .collect::<Vec<_>>()
        .into()
}

fn convert_polygon(rings: Vec<Vec<Vec<f64>>>) -> Option<Polygon<f64>> {
    let mut rings = rings.into_iter().map(convert_ring);
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

fn convert_geometry(value: geojson::Value) -> Option<AreaGeometry> {
    match value {
        geojson::Value::Polygon(rings) => convert_polygon(rings).map(Into::into),
        geojson::Value::MultiPolygon(polygons) => {
            let polygons: Vec<Polygon<f64>> =
                polygons.into_iter().filter_map(convert_polygon).collect();
            if polygons.is_empty() {
                None
            } else {
                Some(MultiPolygon::new(polygons).into())
            }
        }
        _ => None,
    }
}
