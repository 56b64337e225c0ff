use geo::{LineString, Point};
use log::warn;

use crate::geo::{Frame, TransformContext};
use crate::network::{Feature, FeatureSource};

/// Collects manually drawn bridge lines as ordered vertex runs.
///
/// The drawing surface is the host's concern; this holds only the committed
/// vertices. Runs of fewer than two vertices are discarded on finish, the
/// way an aborted sketch leaves nothing behind.
#[derive(Clone, Debug)]
pub struct Sketch {
    frame: Frame,
    finished: Vec<Vec<Point<f64>>>,
    active: Option<Vec<Point<f64>>>,
}

impl Sketch {
    pub fn new(frame: Frame) -> Self {
        Sketch {
            frame,
            finished: Vec::new(),
            active: None,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Appends a vertex to the line being drawn, starting one if needed.
    pub fn add_vertex(&mut self, point: Point<f64>) {
        self.active.get_or_insert_with(Vec::new).push(point);
    }

    /// Commits the line being drawn. Single-vertex runs are discarded.
    pub fn finish_line(&mut self) {
        if let Some(line) = self.active.take() {
            if line.len() >= 2 {
                self.finished.push(line);
            }
        }
    }

    pub fn reset(&mut self) {
        self.finished.clear();
        self.active = None;
    }

    pub fn is_empty(&self) -> bool {
        self.finished.is_empty() && self.active.is_none()
    }

    pub fn lines(&self) -> &[Vec<Point<f64>>] {
        &self.finished
    }

    /// Re-expresses every vertex in `to` when the ambient frame changes.
    /// Left untouched, with a warning, when no transform path exists.
    pub fn reproject(&mut self, ctx: &TransformContext, to: &Frame) {
        if &self.frame == to {
            return;
        }
        if !ctx.has_path(&self.frame, to) {
            warn!(
                "sketch not transformable from `{}` to `{}`, keeping coordinates",
                self.frame.id(),
                to.id()
            );
            return;
        }

        for line in self.finished.iter_mut().chain(self.active.iter_mut()) {
            for vertex in line.iter_mut() {
                if let Ok(moved) = ctx.transform(*vertex, &self.frame, to) {
                    *vertex = moved;
                }
            }
        }
        self.frame = to.clone();
    }

    /// Every sketched vertex flattened into a point source, ready to be
    /// bridged under the line tolerance. Duplicates are preserved.
    pub fn candidate_points(&self, name: impl Into<String>) -> FeatureSource {
        let features = self
            .finished
            .iter()
            .flatten()
            .map(|point| Feature::point(*point))
            .collect();

        FeatureSource::new(name, self.frame.clone(), features)
    }

    /// The committed sketch lines as ordinary line features, for callers
    /// that also want the drawn geometry routable.
    pub fn line_features(&self, name: impl Into<String>) -> FeatureSource {
        let features = self
            .finished
            .iter()
            .map(|line| {
                Feature::line(LineString::from(
                    line.iter().map(|p| p.0).collect::<Vec<_>>(),
                ))
            })
            .collect();

        FeatureSource::new(name, self.frame.clone(), features)
    }
}
