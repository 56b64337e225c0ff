#[doc(hidden)]
pub mod composer;
#[doc(hidden)]
pub mod dijkstra;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod graph;
#[doc(hidden)]
pub mod waypoint;

#[doc(inline)]
pub use composer::{compose, ComposedRoute, RouteCosts};
#[doc(inline)]
pub use dijkstra::ShortestPathTree;
#[doc(inline)]
pub use error::RouteError;
#[doc(inline)]
pub use graph::{RouteGraph, TiedPoint, VertexIx};
#[doc(inline)]
pub use waypoint::{Slot, WaypointSequence, MIDDLE_SLOTS};
