//! Marker styles per POI category.

use serde::{Deserialize, Serialize};

use crate::classify::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub label: String,
    pub color: Color,
}

impl CategoryStyle {
    pub fn new(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// Immutable category → style table with an explicit fallback entry.
///
/// Built once and shared by reference; lookups never fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStyleTable {
    entries: Vec<(String, CategoryStyle)>,
    default: CategoryStyle,
}

impl CategoryStyleTable {
    pub fn new(entries: Vec<(String, CategoryStyle)>, default: CategoryStyle) -> Self {
        let entries = entries
            .into_iter()
            .map(|(category, style)| (category.trim().to_ascii_lowercase(), style))
            .collect();
        Self { entries, default }
    }

    /// Style for a category (case-insensitive), or the default entry
    pub fn style_for(&self, category: &str) -> &CategoryStyle {
        let category = category.trim();
        self.entries
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(category))
            .map(|(_, style)| style)
            .unwrap_or(&self.default)
    }

    pub fn default_style(&self) -> &CategoryStyle {
        &self.default
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }
}

impl Default for CategoryStyleTable {
    fn default() -> Self {
        let entry = |category: &str, label: &str, color: u32| {
            (category.to_string(), CategoryStyle::new(label, Color::hex(color)))
        };
        Self::new(
            vec![
                entry("school", "School", 0x1f77b4),
                entry("hospital", "Hospital", 0xd62728),
                entry("clinic", "Clinic", 0xff9896),
                entry("police", "Police", 0x393b79),
                entry("park", "Park", 0x2ca02c),
                entry("social_facility", "Social facility", 0x9467bd),
                entry("sanitation_facility", "Sanitation facility", 0x17becf),
            ],
            CategoryStyle::new("Other", Color::hex(0x7f7f7f)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_category() {
        let table = CategoryStyleTable::default();
        assert_eq!(table.style_for("hospital").label, "Hospital");
        assert_eq!(table.style_for(" HOSPITAL ").label, "Hospital");
    }

    #[test]
    fn test_unknown_category_gets_default() {
        let table = CategoryStyleTable::default();
        assert_eq!(table.style_for("bakery"), table.default_style());
        assert_eq!(table.style_for(""), table.default_style());
    }

    #[test]
    fn test_custom_table() {
        let table = CategoryStyleTable::new(
            vec![("Museum".to_string(), CategoryStyle::new("Museum", Color::hex(0x123456)))],
            CategoryStyle::new("Misc", Color::hex(0x000000)),
        );
        assert_eq!(table.style_for("museum").color, Color::hex(0x123456));
        assert_eq!(table.categories().collect::<Vec<_>>(), vec!["museum"]);
        assert_eq!(table.style_for("school").label, "Misc");
    }
}
