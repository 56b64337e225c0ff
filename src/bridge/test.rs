use approx::assert_relative_eq;
use geo::{line_string, point};

use crate::bridge::{build_bridges, BridgeCandidates, BridgeOptions, Sketch};
use crate::geo::{DistanceUnit, Frame, TransformContext};
use crate::network::{Feature, FeatureGeometry, FeatureSource, Network};

fn frame() -> Frame {
    Frame::planar("EPSG:32634", DistanceUnit::Meters)
}

fn point_source(name: &str, points: &[(f64, f64)]) -> FeatureSource {
    FeatureSource::new(
        name,
        frame(),
        points
            .iter()
            .map(|(x, y)| Feature::point(point! { x: *x, y: *y }))
            .collect(),
    )
}

fn single_line_network() -> Network {
    let mut network = Network::new(frame());
    network.add(Feature::line(
        line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)],
    ));
    network
}

#[test]
fn candidate_outside_tolerance_is_a_noop() {
    let mut network = single_line_network();
    let source = point_source("bridges", &[(50.0, 10.0)]);

    let report = build_bridges(
        &mut network,
        &BridgeCandidates {
            point_sources: vec![&source],
            ..Default::default()
        },
        &BridgeOptions {
            point_tolerance: 5.0,
            ..Default::default()
        },
    );

    assert_eq!(report.vertices, 0);
    assert_eq!(report.connectors, 0);
    assert_eq!(network.len(), 1);
}

#[test]
fn candidate_within_tolerance_inserts_vertex_and_connector() {
    let mut network = single_line_network();
    let source = point_source("bridges", &[(50.0, 3.0)]);

    let report = build_bridges(
        &mut network,
        &BridgeCandidates {
            point_sources: vec![&source],
            ..Default::default()
        },
        &BridgeOptions {
            point_tolerance: 5.0,
            ..Default::default()
        },
    );

    assert_eq!(report.vertices, 1);
    assert_eq!(report.connectors, 1);
    // Original line gained the split vertex, plus one connector feature.
    assert_eq!(network.len(), 2);

    let (_, line) = network.lines().next().unwrap();
    assert_eq!(line.0.len(), 3);
    assert_relative_eq!(line.0[1].x, 50.0);
    assert_relative_eq!(line.0[1].y, 0.0);
}

#[test]
fn candidate_on_the_line_skips_the_connector() {
    let mut network = single_line_network();
    let source = point_source("bridges", &[(50.0, 0.0)]);

    let report = build_bridges(
        &mut network,
        &BridgeCandidates {
            point_sources: vec![&source],
            ..Default::default()
        },
        &BridgeOptions {
            point_tolerance: 5.0,
            ..Default::default()
        },
    );

    assert_eq!(report.vertices, 1);
    assert_eq!(report.connectors, 0);
    assert_eq!(network.len(), 1);
}

#[test]
fn same_source_suppression_bridges_each_source_once() {
    let mut network = Network::new(frame());
    network.add(
        Feature::line(line_string![(x: 0.0, y: 1.0), (x: 100.0, y: 1.0)]).with_provenance(0),
    );
    network.add(
        Feature::line(line_string![(x: 0.0, y: -2.0), (x: 100.0, y: -2.0)]).with_provenance(0),
    );

    let source = point_source("bridges", &[(50.0, 0.0)]);
    let report = build_bridges(
        &mut network,
        &BridgeCandidates {
            point_sources: vec![&source],
            ..Default::default()
        },
        &BridgeOptions {
            point_tolerance: 5.0,
            same_source: false,
            ..Default::default()
        },
    );

    // Only the nearer of the two same-provenance lines is reached.
    assert_eq!(report.vertices, 1);
    let split = network
        .lines()
        .filter(|(_, line)| line.0.len() == 3)
        .count();
    assert_eq!(split, 1);
}

#[test]
fn same_source_enabled_bridges_both_lines() {
    let mut network = Network::new(frame());
    network.add(
        Feature::line(line_string![(x: 0.0, y: 1.0), (x: 100.0, y: 1.0)]).with_provenance(0),
    );
    network.add(
        Feature::line(line_string![(x: 0.0, y: -2.0), (x: 100.0, y: -2.0)]).with_provenance(0),
    );

    let source = point_source("bridges", &[(50.0, 0.0)]);
    let report = build_bridges(
        &mut network,
        &BridgeCandidates {
            point_sources: vec![&source],
            ..Default::default()
        },
        &BridgeOptions {
            point_tolerance: 5.0,
            same_source: true,
            ..Default::default()
        },
    );

    assert_eq!(report.vertices, 2);
    assert_eq!(report.connectors, 2);
}

#[test]
fn distinct_sources_both_receive_a_bridge() {
    let mut network = Network::new(frame());
    network.add(
        Feature::line(line_string![(x: 0.0, y: 1.0), (x: 100.0, y: 1.0)]).with_provenance(0),
    );
    network.add(
        Feature::line(line_string![(x: 0.0, y: -1.0), (x: 100.0, y: -1.0)]).with_provenance(1),
    );

    let source = point_source("bridges", &[(50.0, 0.0)]);
    let report = build_bridges(
        &mut network,
        &BridgeCandidates {
            point_sources: vec![&source],
            ..Default::default()
        },
        &BridgeOptions {
            point_tolerance: 5.0,
            same_source: false,
            ..Default::default()
        },
    );

    assert_eq!(report.vertices, 2);
    assert_eq!(report.connectors, 2);
}

#[test]
fn connector_inherits_bridged_line_provenance() {
    let mut network = Network::new(frame());
    network.add(
        Feature::line(line_string![(x: 0.0, y: 2.0), (x: 100.0, y: 2.0)]).with_provenance(3),
    );

    let source = point_source("bridges", &[(50.0, 0.0)]);
    build_bridges(
        &mut network,
        &BridgeCandidates {
            point_sources: vec![&source],
            ..Default::default()
        },
        &BridgeOptions {
            point_tolerance: 5.0,
            same_source: false,
            ..Default::default()
        },
    );

    let connector = network
        .iter()
        .filter_map(|(_, f)| match &f.geometry {
            FeatureGeometry::Line(line) if line.0.len() == 2 && line.0[0].y == 0.0 => Some(f),
            _ => None,
        })
        .next()
        .unwrap();
    assert_eq!(connector.provenance, Some(3));
}

#[test]
fn sketch_source_uses_the_line_tolerance() {
    let mut network = single_line_network();

    let mut sketch = Sketch::new(frame());
    sketch.add_vertex(point! { x: 50.0, y: 4.0 });
    sketch.add_vertex(point! { x: 60.0, y: 4.0 });
    sketch.finish_line();
    let markers = sketch.candidate_points("sketch");

    // Point tolerance would reach, line tolerance does not.
    let report = build_bridges(
        &mut network,
        &BridgeCandidates {
            line_sketch: Some(&markers),
            ..Default::default()
        },
        &BridgeOptions {
            point_tolerance: 10.0,
            line_tolerance: 1.0,
            ..Default::default()
        },
    );
    assert_eq!(report.vertices, 0);

    let report = build_bridges(
        &mut network,
        &BridgeCandidates {
            line_sketch: Some(&markers),
            ..Default::default()
        },
        &BridgeOptions {
            point_tolerance: 1.0,
            line_tolerance: 5.0,
            ..Default::default()
        },
    );
    assert_eq!(report.vertices, 2);
}

#[test]
fn untransformable_candidate_source_is_skipped() {
    let mut network = single_line_network();
    let stranded = FeatureSource::new(
        "stranded",
        Frame::isolated("IAU:2015", None),
        vec![Feature::point(point! { x: 50.0, y: 1.0 })],
    );
    let reachable = point_source("ok", &[(50.0, 2.0)]);

    let report = build_bridges(
        &mut network,
        &BridgeCandidates {
            point_sources: vec![&stranded, &reachable],
            ..Default::default()
        },
        &BridgeOptions {
            point_tolerance: 5.0,
            ..Default::default()
        },
    );

    assert_eq!(report.vertices, 1);
}

#[test]
fn sketch_discards_single_vertex_runs() {
    let mut sketch = Sketch::new(frame());
    sketch.add_vertex(point! { x: 1.0, y: 1.0 });
    sketch.finish_line();
    assert!(sketch.is_empty());

    sketch.add_vertex(point! { x: 0.0, y: 0.0 });
    sketch.add_vertex(point! { x: 5.0, y: 0.0 });
    sketch.add_vertex(point! { x: 5.0, y: 5.0 });
    sketch.finish_line();

    assert_eq!(sketch.lines().len(), 1);
    assert_eq!(sketch.candidate_points("pts").len(), 3);
    assert_eq!(sketch.line_features("lines").len(), 1);

    sketch.reset();
    assert!(sketch.is_empty());
}

#[test]
fn sketch_reprojects_in_place() {
    use geo::AffineTransform;

    let offset = Frame::planar("LOCAL:1", DistanceUnit::Meters)
        .with_placement(AffineTransform::translate(100.0, 0.0));

    let mut sketch = Sketch::new(offset);
    sketch.add_vertex(point! { x: 0.0, y: 0.0 });
    sketch.add_vertex(point! { x: 10.0, y: 0.0 });
    sketch.finish_line();

    sketch.reproject(&TransformContext::new(), &frame());
    assert_relative_eq!(sketch.lines()[0][0].x(), 100.0);
    assert_eq!(sketch.frame().id(), "EPSG:32634");
}
