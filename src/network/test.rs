use approx::assert_relative_eq;
use geo::{line_string, point, Rect};

use crate::geo::{DistanceUnit, Frame};
use crate::network::{closest_segment, Feature, FeatureFilter, FeatureSource, Network};

fn meters_frame() -> Frame {
    Frame::planar("EPSG:32634", DistanceUnit::Meters)
}

#[test]
fn filter_applies_rect_then_limit() {
    let source = FeatureSource::new(
        "roads",
        meters_frame(),
        vec![
            Feature::line(line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
            Feature::line(line_string![(x: 100.0, y: 100.0), (x: 110.0, y: 100.0)]),
            Feature::line(line_string![(x: 0.0, y: 5.0), (x: 10.0, y: 5.0)]),
        ],
    );

    let rect = FeatureFilter::all().with_rect(Rect::new((-1.0, -1.0), (20.0, 20.0)));
    assert_eq!(source.iter_filtered(&rect).count(), 2);

    let capped = rect.with_limit(1);
    assert_eq!(source.iter_filtered(&capped).count(), 1);

    assert_eq!(source.iter_filtered(&FeatureFilter::all()).count(), 3);
}

#[test]
fn insert_vertex_splits_line_in_place() {
    let mut network = Network::new(meters_frame());
    let id = network.add(Feature::line(
        line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
    ));

    assert!(network.insert_vertex(id, 1, point! { x: 4.0, y: 0.0 }));

    let line = network.get(id).unwrap().as_line().unwrap();
    assert_eq!(line.0.len(), 3);
    assert_relative_eq!(line.0[1].x, 4.0);

    // Out-of-range index or a point feature must refuse the edit.
    assert!(!network.insert_vertex(id, 9, point! { x: 5.0, y: 0.0 }));
    let pt = network.add(Feature::point(point! { x: 0.0, y: 0.0 }));
    assert!(!network.insert_vertex(pt, 0, point! { x: 5.0, y: 0.0 }));
}

#[test]
fn connector_is_a_two_point_line() {
    let mut network = Network::new(meters_frame());
    let id = network.connector(
        point! { x: 0.0, y: 0.0 },
        point! { x: 3.0, y: 4.0 },
        Some(2),
    );

    let feature = network.get(id).unwrap();
    assert_eq!(feature.provenance, Some(2));
    assert_eq!(feature.as_line().unwrap().0.len(), 2);
}

#[test]
fn closest_segment_projects_and_reports_insert_index() {
    let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0)];

    let ctx = closest_segment(&line, point! { x: 4.0, y: 3.0 }, 1e-12).unwrap();
    assert_relative_eq!(ctx.sq_distance, 9.0);
    assert_relative_eq!(ctx.point.x(), 4.0);
    assert_relative_eq!(ctx.point.y(), 0.0);
    assert_eq!(ctx.insert_index, 1);

    // Second segment wins when the query moves around the corner.
    let ctx = closest_segment(&line, point! { x: 12.0, y: 8.0 }, 1e-12).unwrap();
    assert_eq!(ctx.insert_index, 2);
    assert_relative_eq!(ctx.point.y(), 8.0);
}

#[test]
fn closest_segment_clamps_beyond_endpoints() {
    let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];

    let ctx = closest_segment(&line, point! { x: -3.0, y: 4.0 }, 1e-12).unwrap();
    assert_relative_eq!(ctx.point.x(), 0.0);
    assert_relative_eq!(ctx.sq_distance, 25.0);
}

#[test]
fn closest_segment_skips_degenerate_lines() {
    let degenerate = line_string![(x: 1.0, y: 1.0), (x: 1.0, y: 1.0)];
    assert!(closest_segment(&degenerate, point! { x: 0.0, y: 0.0 }, 1e-12).is_none());
}

#[test]
fn line_index_ranks_by_distance_and_honours_max() {
    let mut network = Network::new(meters_frame());
    let near = network.add(Feature::line(
        line_string![(x: 0.0, y: 1.0), (x: 10.0, y: 1.0)],
    ));
    let far = network.add(Feature::line(
        line_string![(x: 0.0, y: 5.0), (x: 10.0, y: 5.0)],
    ));
    network.add(Feature::line(
        line_string![(x: 0.0, y: 100.0), (x: 10.0, y: 100.0)],
    ));

    let index = network.line_index();
    assert_eq!(index.size(), 3);

    let hits = index.nearest(point! { x: 5.0, y: 0.0 }, 5, 8.0);
    assert_eq!(hits, vec![near, far]);

    let hits = index.nearest(point! { x: 5.0, y: 0.0 }, 5, 0.5);
    assert!(hits.is_empty());
}
