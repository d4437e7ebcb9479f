//! Choropleth colorizer: class breaks, per-value colors and the legend.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::{format_fixed, format_number, NumberLocale};
use super::palette::{Color, PaletteName, NO_DATA};
use super::quantile::{is_right_skewed, log_quantile_breaks, numeric_sorted, quantile_breaks};
use crate::models::{Indicator, SampleValue};

pub const DEFAULT_CLASSES: usize = 5;
/// Upper bound on the number of classes, wherever it comes from
pub const MAX_CLASSES: usize = 12;
pub const DEFAULT_SKEW_RATIO: f64 = 10.0;
pub const DEFAULT_LOG_OFFSET: f64 = 1.0;

/// Label of the trailing "no data" legend entry
pub const NO_DATA_LABEL: &str = "No data";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Number of classes; 0 falls back to the default, values above
    /// `MAX_CLASSES` are capped
    pub classes: usize,
    pub palette: Option<PaletteName>,
    /// max/median ratio above which log-quantile breaks are used
    pub skew_ratio: f64,
    /// Offset added before taking logs
    pub log_offset: f64,
    pub locale: NumberLocale,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            classes: DEFAULT_CLASSES,
            palette: None,
            skew_ratio: DEFAULT_SKEW_RATIO,
            log_offset: DEFAULT_LOG_OFFSET,
            locale: NumberLocale::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn classes(&self) -> usize {
        match self.classes {
            0 => DEFAULT_CLASSES,
            n => n.min(MAX_CLASSES),
        }
    }
}

/// Fixed HDI development bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HdiClass {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Lower bounds of Medium, High and Very High
pub const HDI_THRESHOLDS: [f64; 3] = [0.600, 0.700, 0.800];

impl HdiClass {
    pub fn all() -> [HdiClass; 4] {
        [HdiClass::Low, HdiClass::Medium, HdiClass::High, HdiClass::VeryHigh]
    }

    pub fn from_value(value: f64) -> Self {
        if value >= HDI_THRESHOLDS[2] {
            HdiClass::VeryHigh
        } else if value >= HDI_THRESHOLDS[1] {
            HdiClass::High
        } else if value >= HDI_THRESHOLDS[0] {
            HdiClass::Medium
        } else {
            HdiClass::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HdiClass::Low => "Low",
            HdiClass::Medium => "Medium",
            HdiClass::High => "High",
            HdiClass::VeryHigh => "Very High",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            HdiClass::Low => Color::hex(0xe67e22),
            HdiClass::Medium => Color::hex(0xc6a600),
            HdiClass::High => Color::hex(0x0a9d58),
            HdiClass::VeryHigh => Color::hex(0x0b5ed7),
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// How the breaks were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    #[serde(rename = "hdi")]
    FixedHdi,
    #[serde(rename = "quantiles")]
    Quantiles,
    #[serde(rename = "log-quantiles")]
    LogQuantiles,
    /// No usable samples or zero spread; one color for every value
    #[serde(rename = "uniform")]
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
}

#[derive(Debug, Clone)]
enum Scheme {
    Hdi,
    Breaks { breaks: Vec<f64>, colors: Vec<Color> },
    Uniform { color: Color },
}

/// Maps indicator values onto ordered color classes.
///
/// Holds no state beyond what it was built from; building twice from the same
/// inputs classifies every value identically.
#[derive(Debug, Clone)]
pub struct Colorizer {
    indicator: Indicator,
    method: Method,
    scheme: Scheme,
    legend: Vec<LegendEntry>,
}

impl Colorizer {
    /// Build a colorizer for `indicator` from the raw sample values
    pub fn build(indicator: &Indicator, values: &[SampleValue], config: &ClassifierConfig) -> Self {
        if *indicator == Indicator::Hdi {
            return Self::hdi(config.locale);
        }

        let classes = config.classes();
        let palette = config
            .palette
            .unwrap_or_else(|| PaletteName::for_family(indicator.palette_family()));
        let colors = palette.ramp(classes);
        let middle = colors[colors.len() / 2];

        let nums = numeric_sorted(values);
        let (first, last) = match (nums.first(), nums.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => {
                debug!("No numeric samples for '{}', using uniform color", indicator);
                return Self::uniform(indicator, middle, None, config.locale);
            }
        };

        let mut method = Method::Quantiles;
        let mut breaks = None;
        if is_right_skewed(&nums, config.skew_ratio) {
            breaks = log_quantile_breaks(&nums, classes, config.log_offset);
            if breaks.is_some() {
                method = Method::LogQuantiles;
            }
        }
        let breaks = breaks.unwrap_or_else(|| quantile_breaks(&nums, classes));

        if first == last || breaks.len() < 2 || breaks.iter().any(|b| !b.is_finite()) {
            debug!("Breaks for '{}' collapsed, using uniform color", indicator);
            return Self::uniform(indicator, middle, Some(first), config.locale);
        }

        debug!(
            "Classified '{}' with {:?} over {} samples: {:?}",
            indicator,
            method,
            nums.len(),
            breaks
        );

        let legend = breaks_legend(&breaks, &colors, config.locale);
        Self {
            indicator: indicator.clone(),
            method,
            scheme: Scheme::Breaks { breaks, colors },
            legend,
        }
    }

    fn hdi(locale: NumberLocale) -> Self {
        let fmt = |v: f64| format_fixed(v, 3, locale);
        let [medium, high, very_high] = HDI_THRESHOLDS;

        let bands = [
            (HdiClass::Low, format!("< {}", fmt(medium)), None, Some(medium)),
            (
                HdiClass::Medium,
                format!("{} — {}", fmt(medium), fmt(high - 0.001)),
                Some(medium),
                Some(high),
            ),
            (
                HdiClass::High,
                format!("{} — {}", fmt(high), fmt(very_high - 0.001)),
                Some(high),
                Some(very_high),
            ),
            (HdiClass::VeryHigh, format!("≥ {}", fmt(very_high)), Some(very_high), None),
        ];

        let mut legend: Vec<LegendEntry> = bands
            .into_iter()
            .map(|(class, range, from, to)| LegendEntry {
                label: format!("{} ({})", class.label(), range),
                color: class.color(),
                from,
                to,
            })
            .collect();
        legend.push(no_data_entry());

        Self {
            indicator: Indicator::Hdi,
            method: Method::FixedHdi,
            scheme: Scheme::Hdi,
            legend,
        }
    }

    fn uniform(
        indicator: &Indicator,
        color: Color,
        value: Option<f64>,
        locale: NumberLocale,
    ) -> Self {
        let mut legend = Vec::new();
        if let Some(v) = value {
            legend.push(LegendEntry {
                label: format_number(v, locale),
                color,
                from: Some(v),
                to: Some(v),
            });
        }
        legend.push(no_data_entry());

        Self {
            indicator: indicator.clone(),
            method: Method::Uniform,
            scheme: Scheme::Uniform { color },
            legend,
        }
    }

    /// Class index of a value, `None` for no data.
    ///
    /// Classes are half-open `[break[i], break[i+1])`; the top class is closed
    /// so it holds the sample maximum. Values outside the sampled range clamp
    /// to the first or last class.
    pub fn class_of(&self, value: &SampleValue) -> Option<usize> {
        let v = value.as_number()?;
        Some(match &self.scheme {
            Scheme::Hdi => HdiClass::from_value(v).index(),
            Scheme::Uniform { .. } => 0,
            Scheme::Breaks { breaks, .. } => {
                let top = breaks.len() - 2;
                (0..top)
                    .find(|&i| v < breaks[i + 1] && v >= breaks[i])
                    .unwrap_or(if v < breaks[0] { 0 } else { top })
            }
        })
    }

    pub fn color_for(&self, value: &SampleValue) -> Color {
        let class = match self.class_of(value) {
            Some(c) => c,
            None => return NO_DATA,
        };
        match &self.scheme {
            Scheme::Hdi => HdiClass::all()[class].color(),
            Scheme::Breaks { colors, .. } => colors[class],
            Scheme::Uniform { color } => *color,
        }
    }

    /// Convenience for plain numbers; non-finite input is no data
    pub fn color_for_number(&self, value: f64) -> Color {
        self.color_for(&SampleValue::Number(value))
    }

    /// HDI band of a value when this colorizer uses the fixed HDI scheme
    pub fn hdi_class(&self, value: &SampleValue) -> Option<HdiClass> {
        match self.scheme {
            Scheme::Hdi => value.as_number().map(HdiClass::from_value),
            _ => None,
        }
    }

    /// Class boundaries: N+1 values for sample-derived classes, the three
    /// fixed thresholds for HDI, empty when uniform.
    pub fn breaks(&self) -> &[f64] {
        match &self.scheme {
            Scheme::Hdi => &HDI_THRESHOLDS,
            Scheme::Breaks { breaks, .. } => breaks,
            Scheme::Uniform { .. } => &[],
        }
    }

    /// One entry per class (low to high) followed by the "no data" entry
    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn indicator(&self) -> &Indicator {
        &self.indicator
    }

    pub fn class_count(&self) -> usize {
        self.legend.len() - 1
    }
}

fn no_data_entry() -> LegendEntry {
    LegendEntry {
        label: NO_DATA_LABEL.to_string(),
        color: NO_DATA,
        from: None,
        to: None,
    }
}

fn breaks_legend(breaks: &[f64], colors: &[Color], locale: NumberLocale) -> Vec<LegendEntry> {
    let fmt = |v: f64| format_number(v, locale);
    let classes = breaks.len() - 1;

    let mut legend: Vec<LegendEntry> = breaks
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let (lo, hi) = (w[0], w[1]);
            let label = if classes == 1 {
                format!("{} — {}", fmt(lo), fmt(hi))
            } else if i == 0 {
                format!("< {}", fmt(hi))
            } else if i == classes - 1 {
                format!("≥ {}", fmt(lo))
            } else {
                format!("{} — {}", fmt(lo), fmt(hi))
            };
            LegendEntry {
                label,
                color: colors[i],
                from: Some(lo),
                to: Some(hi),
            }
        })
        .collect();
    legend.push(no_data_entry());
    legend
}
