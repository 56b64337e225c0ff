//! Unifies N feature sources into one coordinate-consistent [`Network`].
//!
//! The merge is a pure build step: sources are only read, the output network
//! is created fresh and its frame never changes afterwards. Cost is bounded
//! up front through an optional per-source feature cap and an optional
//! extent limit.

use geo::{Point, Rect};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::{Frame, TransformContext};
use crate::network::{Feature, FeatureFilter, FeatureGeometry, FeatureSource, Network, SourceId};


#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no feature sources selected")]
    NoSources,
    #[error("target frame is not valid")]
    InvalidTargetFrame,
}

/// Spatial narrowing applied to every source before copying.
///
/// `ViewScaled` and `WaypointBox` grow their base rectangle by
/// `(max - min) / 2 * factor` on each axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExtentLimit {
    Unlimited,
    View(Rect<f64>),
    ViewScaled(Rect<f64>, f64),
    WaypointBox(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    pub feature_cap: Option<usize>,
    pub extent: ExtentLimit,
    /// Stamp each output feature with the 0-based position of its source in
    /// the input list. This tag is the only linkage same-source bridging
    /// suppression relies on.
    pub tag_provenance: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            feature_cap: None,
            extent: ExtentLimit::Unlimited,
            tag_provenance: false,
        }
    }
}

fn scale_rect(rect: Rect<f64>, factor: f64) -> Rect<f64> {
    let grow_x = rect.width() / 2.0 * factor;
    let grow_y = rect.height() / 2.0 * factor;
    Rect::new(
        (rect.min().x - grow_x, rect.min().y - grow_y),
        (rect.max().x + grow_x, rect.max().y + grow_y),
    )
}

fn bounding_rect(points: &[Point<f64>]) -> Option<Rect<f64>> {
    let first = points.first()?;
    let mut min = first.0;
    let mut max = first.0;

    for point in &points[1..] {
        min.x = min.x.min(point.x());
        min.y = min.y.min(point.y());
        max.x = max.x.max(point.x());
        max.y = max.y.max(point.y());
    }

    Some(Rect::new(min, max))
}

/// The limiting rectangle in the target frame, if any.
fn limit_rect(extent: &ExtentLimit, waypoints: Option<&[Point<f64>]>) -> Option<Rect<f64>> {
    match extent {
        ExtentLimit::Unlimited => None,
        ExtentLimit::View(rect) => Some(*rect),
        ExtentLimit::ViewScaled(rect, factor) => Some(scale_rect(*rect, *factor)),
        ExtentLimit::WaypointBox(factor) => {
            let rect = waypoints.and_then(bounding_rect).map(|rect| scale_rect(rect, *factor));
            if rect.is_none() {
                warn!("waypoint extent limit requested without waypoints, merging unlimited");
            }
            rect
        }
    }
}

/// Merges `sources`, in order, into a fresh network expressed in `target`.
///
/// Sources without a valid frame are skipped with a warning; a feature whose
/// geometry cannot be transformed is skipped alone, never aborting the rest
/// of its source. When provenance tagging is off and a source already shares
/// the target frame its features are copied without transformation.
pub fn merge(
    sources: &[&FeatureSource],
    target: Frame,
    options: &MergeOptions,
    waypoints: Option<&[Point<f64>]>,
) -> Result<Network, MergeError> {
    if sources.is_empty() {
        return Err(MergeError::NoSources);
    }
    if !target.is_valid() {
        return Err(MergeError::InvalidTargetFrame);
    }

    let ctx = TransformContext::new();
    let rect = limit_rect(&options.extent, waypoints);
    let mut network = Network::new(target.clone());

    for (position, source) in sources.iter().enumerate() {
        if !source.frame().is_valid() {
            warn!("source `{}` has no valid frame, skipping", source.name());
            continue;
        }

        // The limiting rectangle lives in the target frame; filtering happens
        // in the source's own frame.
        let mut filter = FeatureFilter::all();
        if let Some(limit) = options.feature_cap {
            filter = filter.with_limit(limit);
        }
        if let Some(rect) = rect {
            match ctx.transform_rect(rect, &target, source.frame()) {
                Ok(local) => filter = filter.with_rect(local),
                Err(error) => {
                    warn!(
                        "extent not transformable into source `{}` ({error}), skipping source",
                        source.name()
                    );
                    continue;
                }
            }
        }

        if !options.tag_provenance && source.frame() == &target {
            // Fast path: geometry is already target-frame, bulk copy.
            let mut copied = 0usize;
            for feature in source.iter_filtered(&filter) {
                network.add(Feature {
                    geometry: feature.geometry.clone(),
                    provenance: None,
                });
                copied += 1;
            }
            debug!("source `{}` copied untransformed ({copied} features)", source.name());
            continue;
        }

        let provenance = options.tag_provenance.then_some(position as SourceId);
        for feature in source.iter_filtered(&filter) {
            let geometry = match transform_geometry(&ctx, &feature.geometry, source.frame(), &target)
            {
                Ok(geometry) => geometry,
                Err(error) => {
                    warn!(
                        "feature of source `{}` not transformable ({error}), skipping feature",
                        source.name()
                    );
                    continue;
                }
            };

            network.add(Feature {
                geometry,
                provenance,
            });
        }
    }

    debug!("merged {} features into `{}`", network.len(), network.frame().id());
    Ok(network)
}

fn transform_geometry(
    ctx: &TransformContext,
    geometry: &FeatureGeometry,
    from: &Frame,
    to: &Frame,
) -> Result<FeatureGeometry, crate::geo::TransformError> {
    match geometry {
        FeatureGeometry::Line(line) => Ok(FeatureGeometry::Line(
            ctx.transform_coords(line.0.iter().copied(), from, to)?.into(),
        )),
        FeatureGeometry::Point(point) => {
            Ok(FeatureGeometry::Point(ctx.transform(*point, from, to)?))
        }
    }
}
