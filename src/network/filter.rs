use geo::{Intersects, Rect};

use crate::network::FeatureGeometry;

/// Bounds a source enumeration before any geometry is copied.
///
/// Both limits are optional; the default filter passes everything. The
/// rectangle is expected in the source's own frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FeatureFilter {
    limit: Option<usize>,
    rect: Option<Rect<f64>>,
}

impl FeatureFilter {
    pub fn all() -> Self {
        FeatureFilter::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_rect(mut self, rect: Rect<f64>) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn rect(&self) -> Option<Rect<f64>> {
        self.rect
    }

    pub fn matches(&self, geometry: &FeatureGeometry) -> bool {
        let Some(rect) = self.rect else {
            return true;
        };

        match geometry {
            FeatureGeometry::Line(line) => rect.intersects(line),
            FeatureGeometry::Point(point) => rect.intersects(point),
        }
    }
}
