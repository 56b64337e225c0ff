use geo::{Line, Point};
use log::debug;
use petgraph::prelude::DiGraphMap;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geo::Frame;
use crate::network::segment::project_onto_segment;
use crate::network::Network;
use crate::route::dijkstra::{self, ShortestPathTree};

pub type VertexIx = u32;

/// A query point resolved onto the graph: the nearest on-network point and
/// the vertex it lands on. Scoped to one shortest-path query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiedPoint {
    pub point: Point<f64>,
    pub vertex: VertexIx,
}

#[derive(Clone, Debug)]
struct IndexedVertex {
    ix: VertexIx,
    position: Point<f64>,
}

impl RTreeObject for IndexedVertex {
    type Envelope = AABB<Point<f64>>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedVertex {
    fn distance_2(&self, point: &Point<f64>) -> f64 {
        let (dx, dy) = (self.position.x() - point.x(), self.position.y() - point.y());
        dx * dx + dy * dy
    }
}

/// The shortest-path-ready view of a network: directed both ways, weighted
/// by frame distance, with endpoints within the topology tolerance collapsed
/// onto a single vertex.
///
/// Built fresh per waypoint pair and discarded afterwards.
pub struct RouteGraph {
    graph: DiGraphMap<VertexIx, f64>,
    positions: Vec<Point<f64>>,
    frame: Frame,
}

impl RouteGraph {
    pub fn build(network: &Network, topology_tolerance: f64) -> Self {
        let frame = network.frame().clone();
        let mut graph = DiGraphMap::new();
        let mut positions: Vec<Point<f64>> = Vec::new();
        let mut snapped: RTree<IndexedVertex> = RTree::new();

        for (_, line) in network.lines() {
            let mut previous: Option<VertexIx> = None;
            for coord in line.0.iter() {
                let vertex = Self::snap_vertex(
                    &mut snapped,
                    &mut positions,
                    Point(*coord),
                    topology_tolerance,
                );

                if let Some(from) = previous {
                    // Collapsed endpoints leave zero-length pieces behind.
                    if from != vertex {
                        let weight = frame.distance(positions[from as usize], positions[vertex as usize]);
                        graph.add_edge(from, vertex, weight);
                        graph.add_edge(vertex, from, weight);
                    }
                }
                previous = Some(vertex);
            }
        }

        debug!(
            "route graph built: {} vertices, {} edges",
            positions.len(),
            graph.edge_count()
        );

        RouteGraph {
            graph,
            positions,
            frame,
        }
    }

    fn snap_vertex(
        snapped: &mut RTree<IndexedVertex>,
        positions: &mut Vec<Point<f64>>,
        point: Point<f64>,
        tolerance: f64,
    ) -> VertexIx {
        if let Some(existing) = snapped.nearest_neighbor(&point) {
            if existing.distance_2(&point) <= tolerance * tolerance {
                return existing.ix;
            }
        }

        let ix = positions.len() as VertexIx;
        positions.push(point);
        snapped.insert(IndexedVertex { ix, position: point });
        ix
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn position(&self, vertex: VertexIx) -> Point<f64> {
        self.positions[vertex as usize]
    }

    /// Ties an arbitrary point onto the graph.
    ///
    /// The nearest point across all edges becomes the tie; when it falls
    /// mid-edge the edge is split there so the tie is a real vertex. Returns
    /// `None` on a graph with no edges.
    pub fn tie(&mut self, point: Point<f64>) -> Option<TiedPoint> {
        let mut best: Option<(f64, VertexIx, VertexIx, Point<f64>)> = None;

        for (a, b, _) in self.graph.all_edges() {
            // Every edge exists in both directions; measure each once.
            if a > b {
                continue;
            }

            let segment = Line::new(
                self.positions[a as usize].0,
                self.positions[b as usize].0,
            );
            let (sq_distance, nearest) = project_onto_segment(&segment, point);

            if best.is_none_or(|(current, ..)| sq_distance < current) {
                best = Some((sq_distance, a, b, nearest));
            }
        }

        let (_, a, b, nearest) = best?;

        // Projection clamped onto an endpoint needs no split.
        if nearest == self.positions[a as usize] {
            return Some(TiedPoint { point: nearest, vertex: a });
        }
        if nearest == self.positions[b as usize] {
            return Some(TiedPoint { point: nearest, vertex: b });
        }

        let vertex = self.positions.len() as VertexIx;
        self.positions.push(nearest);

        self.graph.remove_edge(a, b);
        self.graph.remove_edge(b, a);

        let to_a = self.frame.distance(nearest, self.positions[a as usize]);
        let to_b = self.frame.distance(nearest, self.positions[b as usize]);
        self.graph.add_edge(a, vertex, to_a);
        self.graph.add_edge(vertex, a, to_a);
        self.graph.add_edge(vertex, b, to_b);
        self.graph.add_edge(b, vertex, to_b);

        Some(TiedPoint {
            point: nearest,
            vertex,
        })
    }

    /// Single-source shortest paths from `source` over the current graph.
    pub fn shortest_path_tree(&self, source: VertexIx) -> ShortestPathTree {
        dijkstra::shortest_path_tree(&self.graph, source, self.positions.len())
    }
}
