//! Rewrites a merged network so nearby-but-disconnected features become
//! traversable.
//!
//! The shortest-path graph is built strictly from the literal network
//! geometry, so a gap of any width is unroutable until a vertex and a
//! connector feature physically close it. Bridge candidates are points:
//! either placed directly, or the vertices of manually drawn bridge lines.

use itertools::Itertools;
use log::{debug, info, warn};
use smallvec::SmallVec;

use crate::geo::TransformContext;
use crate::network::{
    closest_segment, FeatureId, FeatureSource, Network, SegmentContext, SourceId,
};

#[doc(hidden)]
pub mod sketch;
#[doc(hidden)]
#[cfg(test)]
mod test;

#[doc(inline)]
pub use sketch::Sketch;

/// A bridge point searches at most this many line features around it.
const MAX_NEIGHBOURS: usize = 5;

/// Kept very small so closest-segment checks stay meaningful for frames
/// whose units are degrees; larger values report spurious zero distances
/// for points a few meters off a line.
const EPSILON: f64 = 1e-12;

/// Tolerances are in the network frame's native units.
///
/// With `same_source` disabled, one bridge point may still connect several
/// *distinct* original sources, but at most once per source; this relies on
/// the provenance tags stamped during the merge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BridgeOptions {
    pub point_tolerance: f64,
    pub line_tolerance: f64,
    pub same_source: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        BridgeOptions {
            point_tolerance: 0.0,
            line_tolerance: 0.0,
            same_source: true,
        }
    }
}

/// Candidate sources, in processing order: the bridge-line sketch source
/// first under the line tolerance, then the point sources under the point
/// tolerance.
#[derive(Default)]
pub struct BridgeCandidates<'a> {
    pub line_sketch: Option<&'a FeatureSource>,
    pub point_sources: Vec<&'a FeatureSource>,
}

/// What one bridging pass actually changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeReport {
    pub vertices: usize,
    pub connectors: usize,
}

/// Connects every candidate point to the network within tolerance.
///
/// Per point: query the spatial index for up to [`MAX_NEIGHBOURS`] line
/// features, re-verify each with an exact closest-segment check against the
/// squared tolerance, then insert a vertex into the surviving lines nearest
/// first. Whenever the inserted vertex differs from the candidate point, a
/// connector feature is added carrying the bridged line's provenance.
///
/// A candidate source whose frame cannot reach the network frame is skipped
/// whole, with a warning; bridging continues with the remaining sources.
pub fn build_bridges(
    network: &mut Network,
    candidates: &BridgeCandidates,
    options: &BridgeOptions,
) -> BridgeReport {
    let ctx = TransformContext::new();
    let target_frame = network.frame().clone();

    // Connectors added below are intentionally absent from the index: a
    // later bridge point must not chain onto an earlier bridge.
    let index = network.line_index();
    let mut report = BridgeReport::default();

    let sources = candidates
        .line_sketch
        .iter()
        .map(|source| (*source, options.line_tolerance))
        .chain(
            candidates
                .point_sources
                .iter()
                .map(|source| (*source, options.point_tolerance)),
        );

    for (source, tolerance) in sources {
        if !ctx.has_path(source.frame(), &target_frame) {
            warn!(
                "bridge source `{}` not transformable into `{}`, skipping",
                source.name(),
                target_frame.id()
            );
            continue;
        }

        let sq_tolerance = tolerance * tolerance;
        for feature in source.iter() {
            let Some(origin) = feature.as_point() else {
                continue;
            };
            let Ok(point) = ctx.transform(origin, source.frame(), &target_frame) else {
                warn!("bridge point of `{}` not transformable, skipping", source.name());
                continue;
            };

            let mut survivors: SmallVec<
                [(FeatureId, SegmentContext, Option<SourceId>); MAX_NEIGHBOURS],
            > = SmallVec::new();

            for line_id in index.nearest(point, MAX_NEIGHBOURS, tolerance) {
                let Some(line) = network.get(line_id).and_then(|f| f.as_line()) else {
                    continue;
                };
                let Some(segment) = closest_segment(line, point, EPSILON) else {
                    continue;
                };
                if segment.sq_distance > sq_tolerance {
                    continue;
                }

                let provenance = network.get(line_id).and_then(|f| f.provenance);
                survivors.push((line_id, segment, provenance));
            }

            // One suppression list per bridge point.
            let mut connected: SmallVec<[SourceId; MAX_NEIGHBOURS]> = SmallVec::new();

            let ordered = survivors
                .into_iter()
                .sorted_by(|a, b| a.1.sq_distance.total_cmp(&b.1.sq_distance));

            for (line_id, segment, provenance) in ordered {
                if !options.same_source {
                    if let Some(tag) = provenance {
                        if connected.contains(&tag) {
                            debug!("suppressing second bridge into source {tag}");
                            continue;
                        }
                    }
                }

                if !network.insert_vertex(line_id, segment.insert_index, segment.point) {
                    continue;
                }
                report.vertices += 1;

                if !options.same_source {
                    if let Some(tag) = provenance {
                        connected.push(tag);
                    }
                }

                // No zero-length connectors: a candidate sitting exactly on
                // the line only needs the vertex.
                if segment.point != point {
                    network.connector(point, segment.point, provenance);
                    report.connectors += 1;
                }
            }
        }
    }

    info!(
        "bridging inserted {} vertices, {} connectors",
        report.vertices, report.connectors
    );
    report
}
