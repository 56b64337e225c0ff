use geo::{Coord, LineString, Point};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::geo::{convert, DistanceUnit, Frame};
use crate::network::Network;
use crate::route::error::RouteError;
use crate::route::graph::RouteGraph;
use crate::route::waypoint::{Slot, WaypointSequence};

/// Entry / on-network / exit breakdown of one composed route, in the
/// measuring frame's native units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteCosts {
    pub entry: f64,
    pub on_network: f64,
    pub exit: f64,
}

impl RouteCosts {
    pub fn total(&self) -> f64 {
        self.entry + self.on_network + self.exit
    }

    /// Re-expresses the breakdown in `unit`.
    ///
    /// Conversion is defined from a metric base only; for a frame whose
    /// native unit is not meters the values pass through unchanged, with a
    /// warning, rather than silently converting garbage.
    pub fn converted(&self, frame: &Frame, unit: DistanceUnit) -> RouteCosts {
        let unit = match frame.unit() {
            Some(DistanceUnit::Meters) => Some(unit),
            _ => {
                warn!(
                    "frame `{}` base unit is not meters, unit conversion disabled",
                    frame.id()
                );
                None
            }
        };

        RouteCosts {
            entry: convert(self.entry, unit),
            on_network: convert(self.on_network, unit),
            exit: convert(self.exit, unit),
        }
    }
}

/// Terminal artifact of one calculation: a point sequence per waypoint pair
/// plus the aggregated cost breakdown. Owned by the caller once returned.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedRoute {
    pub segments: Vec<LineString<f64>>,
    pub costs: RouteCosts,
}

/// Routes the waypoint sequence over the (already merged and bridged)
/// network.
///
/// Each consecutive pair is tied onto a fresh shortest-path graph; the
/// previous pair's tied exit point becomes the next pair's raw origin, so
/// shared via-points stay continuous and uncounted twice. An unreachable
/// pair aborts the whole composition — partial routes are never returned.
pub fn compose(
    network: &Network,
    waypoints: &WaypointSequence,
    config: &Config,
) -> Result<ComposedRoute, RouteError> {
    if waypoints.get(Slot::Start).is_none() {
        return Err(RouteError::MissingWaypoint(Slot::Start));
    }
    if waypoints.get(Slot::End).is_none() {
        return Err(RouteError::MissingWaypoint(Slot::End));
    }

    let frame = network.frame();
    if !frame.is_valid() {
        return Err(RouteError::InvalidFrame(frame.id().to_string()));
    }
    if network.lines().next().is_none() {
        return Err(RouteError::EmptyNetwork);
    }

    let tolerance =
        frame.tolerance_in_frame_units(config.topology_tolerance, config.tolerance_unit);

    let points = waypoints.ordered();
    let pairs = points.len() - 1;

    let mut costs = RouteCosts::default();
    let mut segments = Vec::with_capacity(pairs);
    let mut carried_from: Option<Point<f64>> = None;

    for pair in 0..pairs {
        // From the second pair on, depart from the previous tied exit point
        // instead of re-tying the via waypoint itself.
        let from = carried_from.unwrap_or(points[pair]);
        let to = points[pair + 1];

        let mut graph = RouteGraph::build(network, tolerance);
        let tied_from = graph.tie(from).ok_or(RouteError::NoRoute { pair })?;
        let tied_to = graph.tie(to).ok_or(RouteError::NoRoute { pair })?;

        let tree = graph.shortest_path_tree(tied_from.vertex);
        let path = tree
            .walk_back(tied_to.vertex)
            .ok_or(RouteError::NoRoute { pair })?;
        let on_network = tree
            .cost(tied_to.vertex)
            .ok_or(RouteError::NoRoute { pair })?;

        let entry = frame.distance(from, tied_from.point);
        let exit = frame.distance(tied_to.point, to);

        // Stubs between via waypoints are interior to the journey: only the
        // very first entry and the very last exit keep their own buckets.
        if pair == 0 {
            costs.entry = entry;
        } else {
            costs.on_network += entry;
        }
        costs.on_network += on_network;
        if pair == pairs - 1 {
            costs.exit = exit;
        } else {
            costs.on_network += exit;
        }

        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(path.len() + 2);
        if config.include_stubs && pair == 0 {
            coords.push(from.0);
        }
        coords.extend(path.iter().map(|vertex| graph.position(*vertex).0));
        if config.include_stubs && pair == pairs - 1 {
            coords.push(to.0);
        }
        segments.push(LineString::from(coords));

        carried_from = Some(tied_to.point);
    }

    info!(
        "composed route over {pairs} pair(s), total cost {:.3} {}",
        costs.total(),
        frame.details().unit_name
    );

    Ok(ComposedRoute { segments, costs })
}
