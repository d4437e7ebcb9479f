//! Sequential color ramps for choropleth classes.
//!
//! Every ramp runs light to dark; low classes get the light end.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::PaletteFamily;

/// An sRGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn hex(value: u32) -> Self {
        Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Parse `#rgb` or `#rrggbb`
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.trim().strip_prefix('#')?;
        match digits.len() {
            6 => u32::from_str_radix(digits, 16).ok().map(Self::hex),
            3 => {
                let v = u32::from_str_radix(digits, 16).ok()?;
                let expand = |n: u32| (n * 17) as u8;
                Some(Self::rgb(
                    expand((v >> 8) & 0xf),
                    expand((v >> 4) & 0xf),
                    expand(v & 0xf),
                ))
            }
            _ => None,
        }
    }

    /// Relative luminance weights applied to the sRGB channels
    pub fn luminance(&self) -> f64 {
        0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64
    }

    /// Linear blend towards `other`; `t` in [0, 1]
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color '{}'", s)))
    }
}

/// Color used for missing / non-numeric values
pub const NO_DATA: Color = Color::hex(0x999999);

const BLUES: [Color; 7] = [
    Color::hex(0xf7fbff),
    Color::hex(0xdeebf7),
    Color::hex(0xc6dbef),
    Color::hex(0x9ecae1),
    Color::hex(0x6baed6),
    Color::hex(0x3182bd),
    Color::hex(0x08519c),
];

const GREENS: [Color; 7] = [
    Color::hex(0xf7fcf5),
    Color::hex(0xe5f5e0),
    Color::hex(0xc7e9c0),
    Color::hex(0xa1d99b),
    Color::hex(0x74c476),
    Color::hex(0x31a354),
    Color::hex(0x006d2c),
];

const ORANGES: [Color; 7] = [
    Color::hex(0xfff5eb),
    Color::hex(0xfee6ce),
    Color::hex(0xfdd0a2),
    Color::hex(0xfdae6b),
    Color::hex(0xfd8d3c),
    Color::hex(0xf16913),
    Color::hex(0xd94801),
];

const PURPLES: [Color; 7] = [
    Color::hex(0xfcfbfd),
    Color::hex(0xefedf5),
    Color::hex(0xdadaeb),
    Color::hex(0xbcbddc),
    Color::hex(0x9e9ac8),
    Color::hex(0x756bb1),
    Color::hex(0x54278f),
];

const REDS: [Color; 7] = [
    Color::hex(0xfff5f0),
    Color::hex(0xfee0d2),
    Color::hex(0xfcbba1),
    Color::hex(0xfc9272),
    Color::hex(0xfb6a4a),
    Color::hex(0xef3b2c),
    Color::hex(0xcb181d),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteName {
    Blues,
    Greens,
    Oranges,
    Purples,
    Reds,
}

impl PaletteName {
    /// Default ramp for an indicator family
    pub fn for_family(family: PaletteFamily) -> Self {
        match family {
            PaletteFamily::Currency => PaletteName::Blues,
            PaletteFamily::Percentage => PaletteName::Greens,
            PaletteFamily::Generic => PaletteName::Purples,
        }
    }

    pub fn stops(&self) -> &'static [Color] {
        match self {
            PaletteName::Blues => &BLUES,
            PaletteName::Greens => &GREENS,
            PaletteName::Oranges => &ORANGES,
            PaletteName::Purples => &PURPLES,
            PaletteName::Reds => &REDS,
        }
    }

    /// Colors for `classes` ordered classes, light to dark.
    ///
    /// Up to the ramp length the darkest stops are used; beyond it the ramp
    /// is interpolated.
    pub fn ramp(&self, classes: usize) -> Vec<Color> {
        let stops = self.stops();
        let classes = classes.max(1);

        if classes <= stops.len() {
            return stops[stops.len() - classes..].to_vec();
        }

        let last = (stops.len() - 1) as f64;
        (0..classes)
            .map(|i| {
                let pos = last * i as f64 / (classes - 1) as f64;
                let base = (pos.floor() as usize).min(stops.len() - 2);
                stops[base].lerp(&stops[base + 1], pos - base as f64)
            })
            .collect()
    }
}

impl FromStr for PaletteName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blues" => Ok(PaletteName::Blues),
            "greens" => Ok(PaletteName::Greens),
            "oranges" => Ok(PaletteName::Oranges),
            "purples" => Ok(PaletteName::Purples),
            "reds" => Ok(PaletteName::Reds),
            other => Err(format!("unknown palette '{}'", other)),
        }
    }
}
