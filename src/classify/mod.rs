//! Choropleth classification of indicator values.
//!
//! HDI uses fixed development bands; every other indicator gets quantile
//! breaks derived from the samples, in log space when the distribution is
//! heavily right-skewed.

mod colorizer;
mod format;
mod palette;
mod quantile;

pub use colorizer::{
    ClassifierConfig, Colorizer, HdiClass, LegendEntry, Method, DEFAULT_CLASSES,
    DEFAULT_LOG_OFFSET, DEFAULT_SKEW_RATIO, HDI_THRESHOLDS, MAX_CLASSES, NO_DATA_LABEL,
};
pub use format::{format_fixed, format_indicator_value, format_number, NumberLocale, NO_VALUE};
pub use palette::{Color, PaletteName, NO_DATA};
pub use quantile::{
    is_right_skewed, log_quantile_breaks, median, numeric_sorted, quantile, quantile_breaks,
};

use serde::Serialize;

use crate::models::{Feature, Indicator, IndicatorTable, SampleValue};

/// Fill color of one feature in a rendering pass
#[derive(Debug, Clone, Serialize)]
pub struct FeatureColor {
    pub code: String,
    pub color: Color,
    pub value: SampleValue,
}

/// Result of classifying an indicator over a set of features
pub struct Choropleth {
    pub colorizer: Colorizer,
    pub colors: Vec<FeatureColor>,
}

/// Classify `indicator` over the values of the given features and color each one.
///
/// Only the features present contribute samples, so breaks follow what is on
/// the map. Features without a row in `table` render as no data.
pub fn choropleth(
    features: &[Feature],
    table: &IndicatorTable,
    indicator: &Indicator,
    config: &ClassifierConfig,
) -> Choropleth {
    let values: Vec<SampleValue> = features
        .iter()
        .map(|f| table.value(&f.code, indicator))
        .collect();

    let colorizer = Colorizer::build(indicator, &values, config);

    let colors = features
        .iter()
        .zip(values)
        .map(|(f, value)| FeatureColor {
            code: f.code.clone(),
            color: colorizer.color_for(&value),
            value,
        })
        .collect();

    Choropleth { colorizer, colors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};

    fn feature(code: &str) -> Feature {
        let ring: LineString<f64> = vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)].into();
        Feature::new(code, code, Polygon::new(ring, vec![]).into())
    }

    #[test]
    fn test_choropleth_colors_every_feature() {
        let features: Vec<Feature> = ["a", "b", "c", "d"].iter().map(|c| feature(c)).collect();
        let mut table = IndicatorTable::new();
        table.insert("a", Indicator::Hdi, 0.82.into());
        table.insert("b", Indicator::Hdi, 0.55.into());
        table.insert("c", Indicator::Hdi, "".into());

        let result = choropleth(&features, &table, &Indicator::Hdi, &ClassifierConfig::default());
        let colors: Vec<Color> = result.colors.iter().map(|fc| fc.color).collect();
        assert_eq!(
            colors,
            vec![
                HdiClass::VeryHigh.color(),
                HdiClass::Low.color(),
                NO_DATA,
                NO_DATA
            ]
        );
        assert_eq!(result.colorizer.method(), Method::FixedHdi);
    }

    #[test]
    fn test_choropleth_samples_only_present_features() {
        let features = vec![feature("a"), feature("b")];
        let mut table = IndicatorTable::new();
        table.insert("a", Indicator::GdpPerCapita, 10.0.into());
        table.insert("b", Indicator::GdpPerCapita, 20.0.into());
        table.insert("off_map", Indicator::GdpPerCapita, 1_000_000.0.into());

        let result = choropleth(
            &features,
            &table,
            &Indicator::GdpPerCapita,
            &ClassifierConfig::default(),
        );
        assert_eq!(result.colorizer.breaks().last(), Some(&20.0));
    }
}
