use indexmap::map::Entry;
use indexmap::IndexMap;
use petgraph::prelude::DiGraphMap;
use rustc_hash::{FxHashSet, FxHasher};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::BuildHasherDefault;

use crate::route::graph::VertexIx;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

#[derive(Debug)]
struct SmallestHolder {
    cost: f64,
    index: usize,
}

impl PartialEq for SmallestHolder {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for SmallestHolder {}

impl PartialOrd for SmallestHolder {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestHolder {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost)
    }
}

/// Cheapest-path tree from one source vertex over the whole graph.
///
/// Unreachable vertices carry an infinite cost and no predecessor; the
/// source is its own tree root with cost zero.
pub struct ShortestPathTree {
    predecessor: Vec<Option<VertexIx>>,
    cost: Vec<f64>,
}

impl ShortestPathTree {
    pub fn reachable(&self, vertex: VertexIx) -> bool {
        self.cost
            .get(vertex as usize)
            .is_some_and(|cost| cost.is_finite())
    }

    /// Accumulated cost to `vertex`, if it was reached.
    pub fn cost(&self, vertex: VertexIx) -> Option<f64> {
        self.cost
            .get(vertex as usize)
            .copied()
            .filter(|cost| cost.is_finite())
    }

    /// Reconstructs the path to `vertex` by walking predecessor links back
    /// to the source, returned in forward order.
    pub fn walk_back(&self, vertex: VertexIx) -> Option<Vec<VertexIx>> {
        if !self.reachable(vertex) {
            return None;
        }

        let mut path = vec![vertex];
        let mut current = vertex;
        while let Some(parent) = self.predecessor[current as usize] {
            path.push(parent);
            current = parent;
        }

        path.reverse();
        Some(path)
    }
}

/// Plain Dijkstra over the route graph, keeping parent links so callers can
/// reconstruct vertex paths without a second search.
pub(crate) fn shortest_path_tree(
    graph: &DiGraphMap<VertexIx, f64>,
    source: VertexIx,
    vertices: usize,
) -> ShortestPathTree {
    let mut to_see = BinaryHeap::with_capacity(256);
    to_see.push(SmallestHolder {
        cost: 0.0,
        index: 0,
    });

    let mut parents: FxIndexMap<VertexIx, (usize, f64)> =
        FxIndexMap::with_capacity_and_hasher(64, BuildHasherDefault::<FxHasher>::default());
    parents.insert(source, (usize::MAX, 0.0));

    let mut seen = FxHashSet::default();

    while let Some(SmallestHolder { cost, index }) = to_see.pop() {
        if !seen.insert(index) {
            continue;
        }

        let Some((node, _)) = parents.get_index(index) else {
            continue;
        };
        let node = *node;

        let successors = graph
            .edges(node)
            .map(|(_, target, weight)| (target, *weight))
            .collect::<Vec<_>>();

        for (successor, weight) in successors {
            let new_cost = cost + weight;

            let (index_of_successor, pushed) = match parents.entry(successor) {
                Entry::Vacant(entry) => {
                    let position = entry.index();
                    entry.insert((index, new_cost));
                    (position, true)
                }
                Entry::Occupied(mut entry) => {
                    if entry.get().1 > new_cost {
                        entry.insert((index, new_cost));
                        (entry.index(), true)
                    } else {
                        (entry.index(), false)
                    }
                }
            };

            if pushed {
                to_see.push(SmallestHolder {
                    cost: new_cost,
                    index: index_of_successor,
                });
            }
        }
    }

    // Densify the parent table into per-vertex arrays. A parent index of
    // usize::MAX marks the source and resolves to no predecessor.
    let mut predecessor = vec![None; vertices];
    let mut cost = vec![f64::INFINITY; vertices];
    for (node, (parent_index, total)) in parents.iter() {
        predecessor[*node as usize] = parents.get_index(*parent_index).map(|(parent, _)| *parent);
        cost[*node as usize] = *total;
    }

    ShortestPathTree { predecessor, cost }
}
