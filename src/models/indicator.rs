//! Socioeconomic indicator keys and raw sample values.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Indicator shown on the choropleth.
///
/// Unknown keys are kept as [`Indicator::Other`] and classified generically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// Human development index (0-1)
    Hdi,
    HdiIncome,
    HdiEducation,
    HdiLongevity,
    /// Share of households with sanitation (percent)
    SanitationIndex,
    /// GDP per capita (currency)
    GdpPerCapita,
    Other(String),
}

/// Which sequential ramp an indicator is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteFamily {
    Currency,
    Percentage,
    Generic,
}

impl Indicator {
    /// Parse an indicator key. Source dataset column names are accepted as aliases.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "hdi" | "idh" => Indicator::Hdi,
            "hdi_income" | "idh_renda" => Indicator::HdiIncome,
            "hdi_education" | "idh_educacao" => Indicator::HdiEducation,
            "hdi_longevity" | "idh_longevidade" => Indicator::HdiLongevity,
            "sanitation_index" | "saneamento" => Indicator::SanitationIndex,
            "gdp_per_capita" | "renda_per_capita" | "pib_per_capita" => Indicator::GdpPerCapita,
            other => Indicator::Other(other.to_string()),
        }
    }

    /// Canonical key
    pub fn key(&self) -> &str {
        match self {
            Indicator::Hdi => "hdi",
            Indicator::HdiIncome => "hdi_income",
            Indicator::HdiEducation => "hdi_education",
            Indicator::HdiLongevity => "hdi_longevity",
            Indicator::SanitationIndex => "sanitation_index",
            Indicator::GdpPerCapita => "gdp_per_capita",
            Indicator::Other(key) => key,
        }
    }

    /// Get all known indicators
    pub fn known() -> [Indicator; 6] {
        [
            Indicator::Hdi,
            Indicator::HdiIncome,
            Indicator::HdiEducation,
            Indicator::HdiLongevity,
            Indicator::SanitationIndex,
            Indicator::GdpPerCapita,
        ]
    }

    /// HDI and its sub-indices
    pub fn is_hdi_family(&self) -> bool {
        matches!(
            self,
            Indicator::Hdi | Indicator::HdiIncome | Indicator::HdiEducation | Indicator::HdiLongevity
        )
    }

    pub fn palette_family(&self) -> PaletteFamily {
        match self {
            Indicator::GdpPerCapita => PaletteFamily::Currency,
            Indicator::SanitationIndex => PaletteFamily::Percentage,
            _ => PaletteFamily::Generic,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Indicator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Indicator {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(Indicator::from_key(&key))
    }
}

/// A raw indicator value as delivered by the data source
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Number(f64),
    Text(String),
    #[default]
    Null,
}

impl SampleValue {
    /// Finite numeric value, if any. Text is trimmed and parsed; empty text is no data.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SampleValue::Number(v) => Some(*v),
            SampleValue::Text(s) => s.trim().parse::<f64>().ok(),
            SampleValue::Null => None,
        }
        .filter(|v| v.is_finite())
    }
}

impl From<f64> for SampleValue {
    fn from(v: f64) -> Self {
        SampleValue::Number(v)
    }
}

impl From<Option<f64>> for SampleValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(SampleValue::Null, SampleValue::Number)
    }
}

impl From<&str> for SampleValue {
    fn from(s: &str) -> Self {
        SampleValue::Text(s.to_string())
    }
}

impl From<String> for SampleValue {
    fn from(s: String) -> Self {
        SampleValue::Text(s)
    }
}

/// A feature code paired with its (possibly missing) indicator value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSample {
    pub code: String,
    pub value: SampleValue,
}

/// Indicator values per feature code
#[derive(Debug, Clone, Default)]
pub struct IndicatorTable {
    rows: HashMap<String, HashMap<Indicator, SampleValue>>,
}

impl IndicatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, indicator: Indicator, value: SampleValue) {
        self.rows
            .entry(code.into())
            .or_default()
            .insert(indicator, value);
    }

    /// Raw value for a feature, `Null` when the row or column is missing
    pub fn value(&self, code: &str, indicator: &Indicator) -> SampleValue {
        self.rows
            .get(code)
            .and_then(|row| row.get(indicator))
            .cloned()
            .unwrap_or_default()
    }

    /// All values for one indicator, in feature-code order
    pub fn samples(&self, indicator: &Indicator) -> Vec<IndicatorSample> {
        let mut samples: Vec<IndicatorSample> = self
            .rows
            .iter()
            .map(|(code, row)| IndicatorSample {
                code: code.clone(),
                value: row.get(indicator).cloned().unwrap_or_default(),
            })
            .collect();
        samples.sort_by(|a, b| a.code.cmp(&b.code));
        samples
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_aliases() {
        assert_eq!(Indicator::from_key("idh"), Indicator::Hdi);
        assert_eq!(Indicator::from_key("HDI"), Indicator::Hdi);
        assert_eq!(Indicator::from_key("saneamento"), Indicator::SanitationIndex);
        assert_eq!(Indicator::from_key("renda_per_capita"), Indicator::GdpPerCapita);
        assert_eq!(
            Indicator::from_key("population"),
            Indicator::Other("population".to_string())
        );
    }

    #[test]
    fn test_known_keys_roundtrip() {
        for indicator in Indicator::known() {
            assert_eq!(Indicator::from_key(indicator.key()), indicator);
        }
    }

    #[test]
    fn test_sample_value_coercion() {
        assert_eq!(SampleValue::from(2.5).as_number(), Some(2.5));
        assert_eq!(SampleValue::from(" 97.36 ").as_number(), Some(97.36));
        assert_eq!(SampleValue::from("").as_number(), None);
        assert_eq!(SampleValue::from("n/a").as_number(), None);
        assert_eq!(SampleValue::from(f64::NAN).as_number(), None);
        assert_eq!(SampleValue::from("inf").as_number(), None);
        assert_eq!(SampleValue::Null.as_number(), None);
    }

    #[test]
    fn test_indicator_table() {
        let mut table = IndicatorTable::new();
        table.insert("b", Indicator::Hdi, 0.7.into());
        table.insert("a", Indicator::Hdi, 0.8.into());
        table.insert("a", Indicator::SanitationIndex, "97.3".into());

        assert_eq!(table.len(), 2);
        assert_eq!(table.value("a", &Indicator::Hdi), SampleValue::Number(0.8));
        assert_eq!(table.value("b", &Indicator::SanitationIndex), SampleValue::Null);
        assert_eq!(table.value("zz", &Indicator::Hdi), SampleValue::Null);

        let codes: Vec<String> = table
            .samples(&Indicator::Hdi)
            .into_iter()
            .map(|s| s.code)
            .collect();
        assert_eq!(codes, vec!["a", "b"]);
    }

    #[test]
    fn test_sample_value_from_json() {
        let values: Vec<SampleValue> = serde_json::from_str(r#"[1, "2", null]"#).unwrap();
        assert_eq!(
            values,
            vec![
                SampleValue::Number(1.0),
                SampleValue::Text("2".to_string()),
                SampleValue::Null
            ]
        );
    }
}
