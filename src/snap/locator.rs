use geo::{Line, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::network::segment::project_onto_segment;
use crate::network::{FeatureGeometry, FeatureSource};

#[derive(Clone, Debug)]
struct IndexedSegment {
    segment: Line<f64>,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<Point<f64>>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.segment.start_point(), self.segment.end_point())
    }
}

impl PointDistance for IndexedSegment {
    fn distance_2(&self, point: &Point<f64>) -> f64 {
        project_onto_segment(&self.segment, *point).0
    }
}

/// Nearest-vertex / nearest-edge queries over one feature source.
///
/// Locators are built once per selected-layer set and queried on every
/// cursor move. A locator can be invalidated when its layer disappears
/// mid-session; an invalid locator answers no queries but never aborts the
/// scan of the remaining layers.
pub struct PointLocator {
    vertices: RTree<Point<f64>>,
    segments: RTree<IndexedSegment>,
    stale: bool,
}

impl PointLocator {
    pub fn build(source: &FeatureSource) -> Self {
        let mut vertices = Vec::new();
        let mut segments = Vec::new();

        for feature in source.iter() {
            match &feature.geometry {
                FeatureGeometry::Line(line) => {
                    vertices.extend(line.points());
                    segments.extend(line.lines().map(|segment| IndexedSegment { segment }));
                }
                FeatureGeometry::Point(point) => vertices.push(*point),
            }
        }

        PointLocator {
            vertices: RTree::bulk_load(vertices),
            segments: RTree::bulk_load(segments),
            stale: false,
        }
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// The nearest feature vertex within `tolerance`, if any.
    pub fn nearest_vertex(&self, point: Point<f64>, tolerance: f64) -> Option<Point<f64>> {
        if self.stale {
            return None;
        }

        self.vertices
            .nearest_neighbor(&point)
            .filter(|vertex| vertex.distance_2(&point) <= tolerance * tolerance)
            .copied()
    }

    /// The nearest point on any feature segment within `tolerance`, if any.
    pub fn nearest_edge(&self, point: Point<f64>, tolerance: f64) -> Option<Point<f64>> {
        if self.stale {
            return None;
        }

        self.segments
            .nearest_neighbor_iter_with_distance_2(&point)
            .next()
            .filter(|(_, sq_distance)| *sq_distance <= tolerance * tolerance)
            .map(|(entry, _)| project_onto_segment(&entry.segment, point).1)
    }
}
