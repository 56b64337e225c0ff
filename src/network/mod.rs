use std::collections::BTreeMap;

use geo::{Coord, LineString, Point};

use crate::geo::Frame;

#[doc(hidden)]
pub mod filter;
#[doc(hidden)]
pub mod index;
#[doc(hidden)]
pub mod segment;
#[doc(hidden)]
#[cfg(test)]
mod test;

#[doc(inline)]
pub use filter::FeatureFilter;
#[doc(inline)]
pub use index::LineIndex;
#[doc(inline)]
pub use segment::{closest_segment, SegmentContext};

/// Position of a source in the caller's selection, doubling as the
/// provenance tag stamped onto merged features.
pub type SourceId = u32;

/// Identifier of a feature within one [`Network`] or [`FeatureSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub enum FeatureGeometry {
    Line(LineString<f64>),
    Point(Point<f64>),
}

/// A single geometry, optionally tagged with the source it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub geometry: FeatureGeometry,
    pub provenance: Option<SourceId>,
}

impl Feature {
    pub fn line(line: LineString<f64>) -> Self {
        Feature {
            geometry: FeatureGeometry::Line(line),
            provenance: None,
        }
    }

    pub fn point(point: Point<f64>) -> Self {
        Feature {
            geometry: FeatureGeometry::Point(point),
            provenance: None,
        }
    }

    pub fn with_provenance(mut self, source: SourceId) -> Self {
        self.provenance = Some(source);
        self
    }

    pub fn as_line(&self) -> Option<&LineString<f64>> {
        match &self.geometry {
            FeatureGeometry::Line(line) => Some(line),
            FeatureGeometry::Point(_) => None,
        }
    }

    pub fn as_point(&self) -> Option<Point<f64>> {
        match &self.geometry {
            FeatureGeometry::Point(point) => Some(*point),
            FeatureGeometry::Line(_) => None,
        }
    }
}

/// An ordered, named collection of geometries sharing one frame.
///
/// Sources are owned by the host's layer catalogue; the engine only reads
/// them for the duration of one operation.
#[derive(Clone, Debug)]
pub struct FeatureSource {
    name: String,
    frame: Frame,
    features: Vec<Feature>,
}

impl FeatureSource {
    pub fn new(name: impl Into<String>, frame: Frame, features: Vec<Feature>) -> Self {
        FeatureSource {
            name: name.into(),
            frame,
            features,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Geometry-only enumeration honouring the filter's spatial rectangle
    /// and row cap, in declaration order.
    pub fn iter_filtered<'a>(
        &'a self,
        filter: &'a FeatureFilter,
    ) -> impl Iterator<Item = &'a Feature> + 'a {
        self.features
            .iter()
            .filter(move |feature| filter.matches(&feature.geometry))
            .take(filter.limit().unwrap_or(usize::MAX))
    }
}

/// The merged, searchable network: a single mutable feature collection whose
/// frame is fixed at creation.
///
/// Built fresh per calculation and discarded afterwards; never persisted.
#[derive(Clone, Debug)]
pub struct Network {
    frame: Frame,
    features: BTreeMap<FeatureId, Feature>,
    next_id: u64,
}

impl Network {
    pub fn new(frame: Frame) -> Self {
        Network {
            frame,
            features: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn add(&mut self, feature: Feature) -> FeatureId {
        let id = FeatureId(self.next_id);
        self.next_id += 1;
        self.features.insert(id, feature);
        id
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &Feature)> {
        self.features.iter().map(|(id, feature)| (*id, feature))
    }

    /// Line features only, the geometry the route graph is built over.
    pub fn lines(&self) -> impl Iterator<Item = (FeatureId, &LineString<f64>)> {
        self.iter()
            .filter_map(|(id, feature)| feature.as_line().map(|line| (id, line)))
    }

    /// Inserts a vertex into a line feature before `vertex_index`.
    ///
    /// Returns `false` when the feature is missing, is not a line, or the
    /// index is out of range.
    pub fn insert_vertex(&mut self, id: FeatureId, vertex_index: usize, at: Point<f64>) -> bool {
        let Some(feature) = self.features.get_mut(&id) else {
            return false;
        };

        match &mut feature.geometry {
            FeatureGeometry::Line(line) if vertex_index <= line.0.len() => {
                line.0.insert(vertex_index, Coord::from(at));
                true
            }
            _ => false,
        }
    }

    /// Adds a two-point connector line feature.
    pub fn connector(
        &mut self,
        a: Point<f64>,
        b: Point<f64>,
        provenance: Option<SourceId>,
    ) -> FeatureId {
        self.add(Feature {
            geometry: FeatureGeometry::Line(LineString::from(vec![a.0, b.0])),
            provenance,
        })
    }

    /// Builds a spatial index over the network's current line features.
    pub fn line_index(&self) -> LineIndex {
        LineIndex::build(self)
    }
}
