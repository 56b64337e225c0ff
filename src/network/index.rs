use geo::{BoundingRect, LineString, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::network::segment::project_onto_segment;
use crate::network::{FeatureId, Network};

/// A line feature lifted into the spatial index.
#[derive(Clone, Debug)]
pub struct IndexedLine {
    pub id: FeatureId,
    pub line: LineString<f64>,
}

impl RTreeObject for IndexedLine {
    type Envelope = AABB<Point<f64>>;

    fn envelope(&self) -> Self::Envelope {
        match self.line.bounding_rect() {
            Some(rect) => AABB::from_corners(Point(rect.min()), Point(rect.max())),
            None => AABB::from_point(Point::new(0.0, 0.0)),
        }
    }
}

impl PointDistance for IndexedLine {
    /// Squared Cartesian distance to the nearest segment of the feature.
    ///
    /// Squared units avoid the square-root per candidate; for degree-based
    /// frames this remains an approximation accepted for small tolerances.
    fn distance_2(&self, point: &Point<f64>) -> f64 {
        self.line
            .lines()
            .map(|segment| project_onto_segment(&segment, *point).0)
            .fold(f64::INFINITY, f64::min)
    }
}

/// R-tree over a network's line features.
///
/// Built once per operation; edits made to the network afterwards (inserted
/// vertices, connectors) are deliberately not reflected here.
pub struct LineIndex {
    tree: RTree<IndexedLine>,
}

impl LineIndex {
    pub fn build(network: &Network) -> Self {
        let entries = network
            .lines()
            .map(|(id, line)| IndexedLine {
                id,
                line: line.clone(),
            })
            .collect::<Vec<_>>();

        LineIndex {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Up to `k` nearest line features within `max_distance`, nearest first.
    ///
    /// Distances are squared-Cartesian approximations; callers re-verify with
    /// [`closest_segment`](crate::network::closest_segment) before acting.
    pub fn nearest(&self, point: Point<f64>, k: usize, max_distance: f64) -> Vec<FeatureId> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&point)
            .take_while(|(_, sq_distance)| *sq_distance <= max_distance * max_distance)
            .take(k)
            .map(|(entry, _)| entry.id)
            .collect()
    }
}
