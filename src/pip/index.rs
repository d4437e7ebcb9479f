//! R-tree accelerated feature lookup.
//!
//! Candidates come from bounding-box intersection, then the even-odd test is
//! applied in input order so the answer is the same first hit a linear scan
//! would return.

use geo::Coord;
use hashbrown::HashMap;
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use super::geometry::geometry_contains;
use crate::models::{Feature, GeoPoint};

/// Position of a feature in the input sequence plus its envelope
#[derive(Debug, Clone)]
struct IndexedFeature {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over an ordered feature sequence
pub struct FeatureIndex {
    features: Arc<Vec<Feature>>,
    tree: RTree<IndexedFeature>,
    by_code: HashMap<String, usize>,
}

impl FeatureIndex {
    /// Build the index. Features without a bounding box (empty geometry) are
    /// left out since they cannot contain any point.
    pub fn build(features: Arc<Vec<Feature>>) -> Self {
        info!("Building spatial index for {} features...", features.len());

        let indexed: Vec<IndexedFeature> = features
            .iter()
            .enumerate()
            .filter_map(|(position, f)| {
                let rect = f.geometry.bounding_rect()?;
                Some(IndexedFeature {
                    position,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        let mut by_code = HashMap::with_capacity(features.len());
        for (position, f) in features.iter().enumerate() {
            by_code.entry(f.code.clone()).or_insert(position);
        }

        Self {
            features,
            tree,
            by_code,
        }
    }

    /// First feature (in input order) whose geometry contains the point
    pub fn locate(&self, point: GeoPoint) -> Option<&Feature> {
        self.locate_position(point).map(|i| &self.features[i])
    }

    /// Input position of the first containing feature
    pub fn locate_position(&self, point: GeoPoint) -> Option<usize> {
        if !point.is_finite() {
            return None;
        }

        let query = AABB::from_point([point.lon, point.lat]);
        let mut candidates: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|ib| ib.position)
            .collect();
        candidates.sort_unstable();

        let coord: Coord<f64> = point.into();
        candidates
            .into_iter()
            .find(|&i| geometry_contains(&self.features[i].geometry, coord))
    }

    /// Feature with the given code; the first one when codes repeat
    pub fn by_code(&self, code: &str) -> Option<&Feature> {
        self.by_code.get(code.trim()).map(|&i| &self.features[i])
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Get total number of indexed features
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
