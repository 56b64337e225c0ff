use geo::{Line, LineString, Point};

/// Exact closest-point result against one line feature.
///
/// `insert_index` is the vertex position a new vertex must be inserted at to
/// split the matched segment, i.e. the index of the segment's end vertex.
/// `side` reports which side of the segment direction the query point lies
/// on: negative left, positive right, zero on the segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentContext {
    pub sq_distance: f64,
    pub point: Point<f64>,
    pub insert_index: usize,
    pub side: i8,
}

/// Squared distance from `point` to `segment`, with the clamped projection.
#[inline]
pub(crate) fn project_onto_segment(segment: &Line<f64>, point: Point<f64>) -> (f64, Point<f64>) {
    let (ax, ay) = (segment.start.x, segment.start.y);
    let (dx, dy) = (segment.dx(), segment.dy());
    let length_sq = dx * dx + dy * dy;

    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((point.x() - ax) * dx + (point.y() - ay) * dy) / length_sq).clamp(0.0, 1.0)
    };

    let nearest = Point::new(ax + t * dx, ay + t * dy);
    let (ex, ey) = (point.x() - nearest.x(), point.y() - nearest.y());
    (ex * ex + ey * ey, nearest)
}

/// Finds the exact closest point on `line` to `target`.
///
/// Works in squared units throughout so callers can compare against a
/// squared tolerance without a square-root. `epsilon` guards the side
/// classification against near-parallel noise and skips degenerate
/// zero-length segments; returns `None` for lines with no usable segment.
pub fn closest_segment(
    line: &LineString<f64>,
    target: Point<f64>,
    epsilon: f64,
) -> Option<SegmentContext> {
    let mut best: Option<SegmentContext> = None;

    for (index, segment) in line.lines().enumerate() {
        let length_sq = segment.dx() * segment.dx() + segment.dy() * segment.dy();
        if length_sq <= epsilon {
            continue;
        }

        let (sq_distance, point) = project_onto_segment(&segment, target);
        if best.as_ref().is_some_and(|b| b.sq_distance <= sq_distance) {
            continue;
        }

        let cross = segment.dx() * (target.y() - segment.start.y)
            - segment.dy() * (target.x() - segment.start.x);
        let side = if cross.abs() <= epsilon {
            0
        } else if cross > 0.0 {
            -1
        } else {
            1
        };

        best = Some(SegmentContext {
            sq_distance,
            point,
            insert_index: index + 1,
            side,
        });
    }

    best
}
