//! POI filtering by category and bounding box.

use crate::models::{BboxError, GeoBbox, Poi};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoiFilter {
    pub category: Option<String>,
    pub bbox: Option<GeoBbox>,
}

impl PoiFilter {
    /// Build from query-string style inputs. Empty strings mean "no constraint".
    pub fn from_params(category: Option<&str>, bbox: Option<&str>) -> Result<Self, BboxError> {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let bbox = match bbox.map(str::trim).filter(|b| !b.is_empty()) {
            Some(b) => Some(GeoBbox::parse(b)?),
            None => None,
        };
        Ok(Self { category, bbox })
    }

    pub fn matches(&self, poi: &Poi) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| poi.category.eq_ignore_ascii_case(c));
        let bbox_ok = self.bbox.map_or(true, |b| b.contains(&poi.location));
        category_ok && bbox_ok
    }

    pub fn apply<'a>(&'a self, pois: &'a [Poi]) -> impl Iterator<Item = &'a Poi> + 'a {
        pois.iter().filter(move |p| self.matches(p))
    }

    /// Total number of matches plus the `limit` matches after the first `skip`
    pub fn page<'a>(&'a self, pois: &'a [Poi], skip: usize, limit: usize) -> (usize, Vec<&'a Poi>) {
        let total = self.apply(pois).count();
        let page = self.apply(pois).skip(skip).take(limit).collect();
        (total, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    fn pois() -> Vec<Poi> {
        let mut central = Poi::new(1, "hospital", GeoPoint::new(-46.5, -23.6));
        central.name = Some("Hospital Central".to_string());
        vec![
            central,
            Poi::new(2, "park", GeoPoint::new(-46.5, -23.6)),
            Poi::new(3, "hospital", GeoPoint::new(-40.0, -20.0)),
        ]
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = PoiFilter::from_params(Some(""), None).unwrap();
        assert_eq!(filter, PoiFilter::default());
        assert_eq!(filter.apply(&pois()).count(), 3);
    }

    #[test]
    fn test_category_and_bbox() {
        let all = pois();
        let filter =
            PoiFilter::from_params(Some("Hospital"), Some("-46.7,-23.7,-46.4,-23.5")).unwrap();
        let ids: Vec<i64> = filter.apply(&all).map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_page() {
        let all = pois();
        let filter = PoiFilter::default();

        let (total, page) = filter.page(&all, 1, 1);
        assert_eq!(total, 3);
        assert_eq!(page.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2]);

        let (total, page) = filter.page(&all, 5, 10);
        assert_eq!(total, 3);
        assert!(page.is_empty());

        let hospitals = PoiFilter::from_params(Some("hospital"), None).unwrap();
        let (total, page) = hospitals.page(&all, 0, 1);
        assert_eq!(total, 2);
        assert_eq!(page[0].id, 1);
    }

    #[test]
    fn test_bad_bbox() {
        assert!(PoiFilter::from_params(None, Some("1,2")).is_err());
    }
}
