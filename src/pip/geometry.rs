//! Even-odd (ray casting) containment tests.
//!
//! Points lying exactly on an edge or vertex may be classified either way.
//! Malformed rings (fewer than three distinct vertices) never contain anything.

use geo::{Coord, LineString, MultiPolygon, Polygon};

use crate::models::AreaGeometry;

/// Even-odd test against a single ring.
///
/// A ray is cast in the +x direction at the point's latitude and edge
/// crossings are counted; an odd count means inside. Closure and winding
/// are not checked.
pub fn ring_contains(ring: &LineString<f64>, point: Coord<f64>) -> bool {
    let mut coords: &[Coord<f64>] = &ring.0;
    if coords.len() > 1 && coords.first() == coords.last() {
        coords = &coords[..coords.len() - 1];
    }
    if coords.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = coords.len() - 1;
    for i in 0..coords.len() {
        let a = coords[i];
        let b = coords[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Inside the exterior ring and outside every hole
pub fn polygon_contains(polygon: &Polygon<f64>, point: Coord<f64>) -> bool {
    ring_contains(polygon.exterior(), point)
        && !polygon
            .interiors()
            .iter()
            .any(|hole| ring_contains(hole, point))
}

/// Inside at least one member polygon (holes apply to their own polygon only)
pub fn multi_polygon_contains(multi: &MultiPolygon<f64>, point: Coord<f64>) -> bool {
    multi.iter().any(|polygon| polygon_contains(polygon, point))
}

pub fn geometry_contains(geometry: &AreaGeometry, point: Coord<f64>) -> bool {
    match geometry {
        AreaGeometry::Polygon(p) => polygon_contains(p, point),
        AreaGeometry::MultiPolygon(mp) => multi_polygon_contains(mp, point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[(f64, f64)]) -> LineString<f64> {
        coords
            .iter()
            .map(|&(x, y)| Coord { x, y })
            .collect::<Vec<_>>()
            .into()
    }

    fn square() -> LineString<f64> {
        ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)])
    }

    fn hole() -> LineString<f64> {
        ring(&[(4.0, 4.0), (4.0, 6.0), (6.0, 6.0), (6.0, 4.0)])
    }

    #[test]
    fn test_square_ring() {
        assert!(ring_contains(&square(), Coord { x: 5.0, y: 5.0 }));
        assert!(!ring_contains(&square(), Coord { x: 15.0, y: 15.0 }));
        assert!(!ring_contains(&square(), Coord { x: -1.0, y: 5.0 }));
    }

    #[test]
    fn test_closed_and_open_rings_agree() {
        let open = square();
        let mut closed = square();
        closed.close();
        for &(x, y) in &[(5.0, 5.0), (0.5, 9.5), (11.0, 5.0), (5.0, -0.1)] {
            let p = Coord { x, y };
            assert_eq!(ring_contains(&open, p), ring_contains(&closed, p));
        }
    }

    #[test]
    fn test_concave_ring() {
        // U shape opening upwards
        let u = ring(&[
            (0.0, 0.0),
            (6.0, 0.0),
            (6.0, 6.0),
            (4.0, 6.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 6.0),
            (0.0, 6.0),
        ]);
        assert!(ring_contains(&u, Coord { x: 1.0, y: 5.0 }));
        assert!(ring_contains(&u, Coord { x: 5.0, y: 5.0 }));
        assert!(!ring_contains(&u, Coord { x: 3.0, y: 5.0 }));
        assert!(ring_contains(&u, Coord { x: 3.0, y: 1.0 }));
    }

    #[test]
    fn test_polygon_with_hole() {
        let without = Polygon::new(square(), vec![]);
        let with = Polygon::new(square(), vec![hole()]);
        let center = Coord { x: 5.0, y: 5.0 };
        assert!(polygon_contains(&without, center));
        assert!(!polygon_contains(&with, center));
        assert!(polygon_contains(&with, Coord { x: 2.0, y: 2.0 }));
    }

    #[test]
    fn test_multi_polygon_hole_not_rescued() {
        let holed = Polygon::new(square(), vec![hole()]);
        let far = Polygon::new(
            ring(&[(20.0, 20.0), (20.0, 30.0), (30.0, 30.0), (30.0, 20.0)]),
            vec![],
        );
        let multi = MultiPolygon::new(vec![holed, far]);

        assert!(multi_polygon_contains(&multi, Coord { x: 1.0, y: 1.0 }));
        assert!(multi_polygon_contains(&multi, Coord { x: 25.0, y: 25.0 }));
        assert!(!multi_polygon_contains(&multi, Coord { x: 5.0, y: 5.0 }));
        assert!(!multi_polygon_contains(&multi, Coord { x: 15.0, y: 15.0 }));
    }

    #[test]
    fn test_malformed_rings_contain_nothing() {
        let p = Coord { x: 0.5, y: 0.5 };
        assert!(!ring_contains(&ring(&[]), p));
        assert!(!ring_contains(&ring(&[(0.0, 0.0)]), p));
        assert!(!ring_contains(&ring(&[(0.0, 0.0), (1.0, 1.0)]), p));
        assert!(!ring_contains(&ring(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]), p));

        let degenerate = ring(&[(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)]);
        assert!(!ring_contains(&degenerate, p));
    }

    #[test]
    fn test_nan_point_is_outside() {
        assert!(!ring_contains(&square(), Coord { x: f64::NAN, y: 5.0 }));
        assert!(!ring_contains(&square(), Coord { x: 5.0, y: f64::NAN }));
    }
}
