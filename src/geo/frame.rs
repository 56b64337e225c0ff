use geo::{AffineOps, AffineTransform, Coord, Distance, Euclidean, Point, Rect};
use thiserror::Error;

use crate::geo::units::DistanceUnit;

/// Failure to move a geometry between two frames.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("no transform path between frames `{from}` and `{to}`")]
    NoPath { from: String, to: String },
}

/// A planar coordinate reference frame.
///
/// Frames identify themselves by an authority string (`"EPSG:32634"` style)
/// and carry the unit their axes are expressed in. A frame may additionally
/// hold an affine placement into a shared reference plane; two frames are
/// inter-transformable when their ids match or both placements are known.
///
/// A frame whose unit is `None` is measurable but not convertible: distances
/// come back in its native units and metric conversion is disabled, the same
/// way the host degrades for angular or exotic CRSs.
#[derive(Clone, Debug)]
pub struct Frame {
    id: String,
    description: String,
    ellipsoid: String,
    unit: Option<DistanceUnit>,
    placement: Option<AffineTransform<f64>>,
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Informational summary of a frame, shown verbatim by hosts.
///
/// Every field degrades to `"?"` for an invalid frame so display code never
/// has to branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameDetails {
    pub ellipsoid: String,
    pub id: String,
    pub description: String,
    pub unit_name: String,
}

impl Frame {
    /// A frame with identity placement on the reference plane.
    pub fn planar(id: impl Into<String>, unit: DistanceUnit) -> Self {
        Frame {
            id: id.into(),
            description: String::new(),
            ellipsoid: String::new(),
            unit: Some(unit),
            placement: Some(AffineTransform::identity()),
        }
    }

    /// A frame with no known placement: transformable only onto itself.
    pub fn isolated(id: impl Into<String>, unit: Option<DistanceUnit>) -> Self {
        Frame {
            id: id.into(),
            description: String::new(),
            ellipsoid: String::new(),
            unit,
            placement: None,
        }
    }

    pub fn with_placement(mut self, placement: AffineTransform<f64>) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_ellipsoid(mut self, ellipsoid: impl Into<String>) -> Self {
        self.ellipsoid = ellipsoid.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn unit(&self) -> Option<DistanceUnit> {
        self.unit
    }

    /// A frame without an authority id cannot be measured against.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
    }

    /// Distance between two points of this frame, in the frame's native units.
    ///
    /// Planar stand-in for the host's ellipsoidal measurer: symmetric, and
    /// zero for identical points.
    #[inline]
    pub fn distance(&self, a: Point<f64>, b: Point<f64>) -> f64 {
        Euclidean.distance(a, b)
    }

    /// Converts a native-unit length to meters, or `-1.0` when the frame's
    /// unit is unknown. Callers display this; they must never crash on it.
    pub fn length_in_meters(&self, length: f64) -> f64 {
        match self.unit {
            Some(unit) => length / unit.per_meter(),
            None => -1.0,
        }
    }

    /// Converts a tolerance entered in `value_unit` into this frame's native
    /// units. Identity when the frame's unit is unknown.
    pub fn tolerance_in_frame_units(&self, value: f64, value_unit: DistanceUnit) -> f64 {
        match self.unit {
            Some(unit) => value / value_unit.per_meter() * unit.per_meter(),
            None => value,
        }
    }

    pub fn details(&self) -> FrameDetails {
        if !self.is_valid() {
            return FrameDetails {
                ellipsoid: "?".into(),
                id: "?".into(),
                description: "?".into(),
                unit_name: "?".into(),
            };
        }

        FrameDetails {
            ellipsoid: self.ellipsoid.clone(),
            id: self.id.clone(),
            description: self.description.clone(),
            unit_name: self
                .unit
                .map(|unit| unit.label().to_string())
                .unwrap_or_else(|| "?".into()),
        }
    }
}

/// Moves geometries between [`Frame`]s via the shared reference plane.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransformContext;

impl TransformContext {
    pub fn new() -> Self {
        TransformContext
    }

    /// Whether a transform path exists from `from` to `to`.
    pub fn has_path(&self, from: &Frame, to: &Frame) -> bool {
        from == to || (from.placement.is_some() && self.inverse_placement(to).is_some())
    }

    fn inverse_placement(&self, frame: &Frame) -> Option<AffineTransform<f64>> {
        frame.placement.as_ref().and_then(|t| t.inverse())
    }

    pub fn transform(
        &self,
        point: Point<f64>,
        from: &Frame,
        to: &Frame,
    ) -> Result<Point<f64>, TransformError> {
        if from == to {
            return Ok(point);
        }

        let no_path = || TransformError::NoPath {
            from: from.id.clone(),
            to: to.id.clone(),
        };

        let onto = from.placement.as_ref().ok_or_else(no_path)?;
        let back = self.inverse_placement(to).ok_or_else(no_path)?;

        Ok(point.affine_transform(onto).affine_transform(&back))
    }

    /// Transforms a rectangle corner-wise, re-normalising min/max afterwards.
    pub fn transform_rect(
        &self,
        rect: Rect<f64>,
        from: &Frame,
        to: &Frame,
    ) -> Result<Rect<f64>, TransformError> {
        let min = self.transform(Point(rect.min()), from, to)?;
        let max = self.transform(Point(rect.max()), from, to)?;
        Ok(Rect::new(min.0, max.0))
    }

    pub fn transform_coords<I>(
        &self,
        coords: I,
        from: &Frame,
        to: &Frame,
    ) -> Result<Vec<Coord<f64>>, TransformError>
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        coords
            .into_iter()
            .map(|coord| self.transform(Point(coord), from, to).map(|p| p.0))
            .collect()
    }
}
