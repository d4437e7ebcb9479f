//! Locale-aware number formatting for legends and tooltips.

use serde::{Deserialize, Serialize};

use crate::models::{Indicator, PaletteFamily, SampleValue};

/// Placeholder rendered for missing values
pub const NO_VALUE: &str = "—";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberLocale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "pt-BR")]
    PtBr,
}

impl NumberLocale {
    pub fn thousands_separator(&self) -> char {
        match self {
            NumberLocale::EnUs => ',',
            NumberLocale::PtBr => '.',
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            NumberLocale::EnUs => '.',
            NumberLocale::PtBr => ',',
        }
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Format with exactly `decimals` fraction digits and grouped thousands
pub fn format_fixed(value: f64, decimals: usize, locale: NumberLocale) -> String {
    if !value.is_finite() {
        return NO_VALUE.to_string();
    }
    let text = format!("{:.*}", decimals, value.abs());
    let negative = value < 0.0 && text.chars().any(|c| c.is_ascii_digit() && c != '0');

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part, locale.thousands_separator()));
    if let Some(frac) = frac_part {
        out.push(locale.decimal_separator());
        out.push_str(frac);
    }
    out
}

/// Legend number: integers from 1000 up, otherwise at most two decimals
pub fn format_number(value: f64, locale: NumberLocale) -> String {
    if value.is_finite() && value.abs() >= 1000.0 {
        return format_fixed(value.round(), 0, locale);
    }

    let text = format_fixed(value, 2, locale);
    let decimal = locale.decimal_separator();
    if !text.contains(decimal) {
        return text;
    }
    let trimmed = text.trim_end_matches('0').trim_end_matches(decimal);
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Tooltip text for an indicator value
pub fn format_indicator_value(
    value: &SampleValue,
    indicator: &Indicator,
    locale: NumberLocale,
) -> String {
    let v = match value.as_number() {
        Some(v) => v,
        None => return NO_VALUE.to_string(),
    };

    if indicator.is_hdi_family() {
        return format_fixed(v, 3, locale);
    }

    match indicator.palette_family() {
        PaletteFamily::Percentage => format!("{}%", format_fixed(v, 2, locale)),
        PaletteFamily::Currency | PaletteFamily::Generic => format_number(v, locale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_small() {
        assert_eq!(format_number(0.0, NumberLocale::EnUs), "0");
        assert_eq!(format_number(5.5, NumberLocale::EnUs), "5.5");
        assert_eq!(format_number(2.345678, NumberLocale::EnUs), "2.35");
        assert_eq!(format_number(2.345678, NumberLocale::PtBr), "2,35");
        assert_eq!(format_number(999.5, NumberLocale::EnUs), "999.5");
        assert_eq!(format_number(-0.001, NumberLocale::EnUs), "0");
        assert_eq!(format_number(-12.5, NumberLocale::EnUs), "-12.5");
    }

    #[test]
    fn test_format_number_thousands() {
        assert_eq!(format_number(1000.0, NumberLocale::EnUs), "1,000");
        assert_eq!(format_number(457517.7, NumberLocale::EnUs), "457,518");
        assert_eq!(format_number(457517.7, NumberLocale::PtBr), "457.518");
        assert_eq!(format_number(-1234567.0, NumberLocale::EnUs), "-1,234,567");
        assert_eq!(format_number(999.999, NumberLocale::EnUs), "1,000");
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(0.8, 3, NumberLocale::EnUs), "0.800");
        assert_eq!(format_fixed(12345.678, 2, NumberLocale::PtBr), "12.345,68");
        assert_eq!(format_fixed(f64::NAN, 2, NumberLocale::EnUs), NO_VALUE);
    }

    #[test]
    fn test_format_indicator_value() {
        let en = NumberLocale::EnUs;
        assert_eq!(
            format_indicator_value(&0.8054.into(), &Indicator::Hdi, en),
            "0.805"
        );
        assert_eq!(
            format_indicator_value(&97.36.into(), &Indicator::SanitationIndex, en),
            "97.36%"
        );
        assert_eq!(
            format_indicator_value(&"457517.7".into(), &Indicator::GdpPerCapita, en),
            "457,518"
        );
        assert_eq!(
            format_indicator_value(&SampleValue::Null, &Indicator::GdpPerCapita, en),
            NO_VALUE
        );
    }
}
