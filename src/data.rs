//! Loading of boundary, indicator and POI files.

use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geojson::feature::Id;
use geojson::GeoJson;
use serde_json::Value;
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::models::feature::convert_position;
use crate::models::{
    FeatureCollection, GeoPoint, Indicator, IndicatorTable, Poi, PropertyKeys, SampleValue,
};

/// Tag keys that carry a POI's category, in priority order
const CATEGORY_KEYS: [&str; 9] = [
    "category", "tipo", "amenity", "leisure", "shop", "tourism", "healthcare", "office", "craft",
];

pub fn load_boundaries<P: AsRef<Path>>(path: P, keys: &PropertyKeys) -> Result<FeatureCollection> {
    let path = path.as_ref();
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open boundaries file: {:?}", path))?;
    let geojson = GeoJson::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse boundaries file: {:?}", path))?;

    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(FeatureCollection::from_geojson(fc, keys)),
        _ => Err(anyhow!("Boundaries file {:?} is not a FeatureCollection", path)),
    }
}

pub fn load_indicators<P: AsRef<Path>>(path: P, code_column: &str) -> Result<IndicatorTable> {
    let path = path.as_ref();
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open indicators file: {:?}", path))?;
    read_indicators(file, code_column)
}

/// Read an indicator CSV. Every column other than `code_column` is an indicator.
pub fn read_indicators<R: Read>(reader: R, code_column: &str) -> Result<IndicatorTable> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let code_idx = headers
        .iter()
        .position(|h| h == code_column)
        .ok_or_else(|| anyhow!("Code column '{}' not found in CSV", code_column))?;

    let columns: Vec<(usize, Indicator)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != code_idx)
        .map(|(i, h)| (i, Indicator::from_key(h)))
        .collect();

    let mut table = IndicatorTable::new();
    for result in rdr.records() {
        let record = result?;
        let code = record.get(code_idx).unwrap_or("");
        if code.is_empty() {
            continue;
        }

        for (idx, indicator) in &columns {
            let raw = record.get(*idx).unwrap_or("");
            let value = if raw.is_empty() {
                SampleValue::Null
            } else {
                raw.parse::<f64>()
                    .map(SampleValue::Number)
                    .unwrap_or_else(|_| SampleValue::Text(raw.to_string()))
            };
            table.insert(code, indicator.clone(), value);
        }
    }

    info!(
        "Loaded indicators for {} municipalities ({} columns)",
        table.len(),
        columns.len()
    );
    Ok(table)
}

pub fn load_pois<P: AsRef<Path>>(path: P) -> Result<Vec<Poi>> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read POI file: {:?}", path))?;
    parse_pois(&text).with_context(|| format!("Failed to parse POI file: {:?}", path))
}

/// Parse POIs from a GeoJSON FeatureCollection of points
pub fn parse_pois(text: &str) -> Result<Vec<Poi>> {
    let collection = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };
    let total = collection.features.len();

    let mut pois = Vec::with_capacity(total);
    for (idx, feature) in collection.features.into_iter().enumerate() {
        let location = match feature.geometry.map(|g| g.value) {
            Some(geojson::Value::Point(position)) => match convert_position(&position) {
                Some(coord) => GeoPoint::from(coord),
                None => {
                    debug!("Skipping POI #{}: short position", idx);
                    continue;
                }
            },
            _ => {
                debug!("Skipping POI #{}: not a point", idx);
                continue;
            }
        };
        let props = feature.properties.unwrap_or_default();

        let feature_id = match feature.id {
            Some(Id::Number(n)) => n.as_i64(),
            _ => None,
        };
        let id = props
            .get("id")
            .and_then(Value::as_i64)
            .or(feature_id)
            .unwrap_or(idx as i64);

        let category = CATEGORY_KEYS
            .iter()
            .filter_map(|k| props.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .find(|c| !c.is_empty())
            .unwrap_or("other");

        let mut poi = Poi::new(id, category, location);
        poi.name = ["name", "nome"]
            .iter()
            .filter_map(|k| props.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .find(|n| !n.is_empty())
            .map(str::to_string);
        pois.push(poi);
    }

    info!("Loaded {} of {} POIs", pois.len(), total);
    Ok(pois)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_indicators() {
        let csv = "ibge_code,idh,saneamento,renda_per_capita\n\
                   3500105, 0.766 ,97.36,\n\
                   3500204,0.700,n/a,457517.7\n\
                   ,0.5,1,1\n";
        let table = read_indicators(csv.as_bytes(), "ibge_code").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.value("3500105", &Indicator::Hdi), SampleValue::Number(0.766));
        assert_eq!(
            table.value("3500105", &Indicator::GdpPerCapita),
            SampleValue::Null
        );
        assert_eq!(
            table.value("3500204", &Indicator::SanitationIndex),
            SampleValue::Text("n/a".to_string())
        );
        assert_eq!(
            table.value("3500204", &Indicator::GdpPerCapita),
            SampleValue::Number(457517.7)
        );
    }

    #[test]
    fn test_read_indicators_missing_code_column() {
        let csv = "code,idh\n1,0.5\n";
        assert!(read_indicators(csv.as_bytes(), "ibge_code").is_err());
    }

    #[test]
    fn test_parse_pois() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":7,"geometry":{"type":"Point","coordinates":[-46.49,-23.51]},
             "properties":{"nome":"Hospital Central","amenity":"hospital"}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[-46.5,-23.6]},
             "properties":{"id":9,"tipo":"park","name":"  "}},
            {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]},
             "properties":{}}
        ]}"#;
        let pois = parse_pois(text).unwrap();
        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].id, 7);
        assert_eq!(pois[0].category, "hospital");
        assert_eq!(pois[0].name.as_deref(), Some("Hospital Central"));
        assert_eq!(pois[1].id, 9);
        assert_eq!(pois[1].category, "park");
        assert_eq!(pois[1].name, None);
        assert_eq!(pois[1].display_name(), "park");
    }

    #[test]
    fn test_parse_pois_requires_feature_collection() {
        assert!(parse_pois(r#"{"type":"Point","coordinates":[0,0]}"#).is_err());
    }

    #[test]
    fn test_load_boundaries_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"type":"FeatureCollection","features":[{{"type":"Feature",
                "properties":{{"ibge_code":"1","nome":"Um"}},
                "geometry":{{"type":"Polygon","coordinates":[[[0,0],[0,1],[1,1],[0,0]]]}}}}]}}"#
        )
        .unwrap();
        let fc = load_boundaries(file.path(), &PropertyKeys::default()).unwrap();
        assert_eq!(fc.len(), 1);
        assert_eq!(fc.features[0].name, "Um");
    }
}
