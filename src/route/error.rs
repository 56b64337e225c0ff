use thiserror::Error;

use crate::route::waypoint::Slot;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("waypoint slot {0:?} is not set")]
    MissingWaypoint(Slot),
    #[error("network has no line features to route over")]
    EmptyNetwork,
    #[error("network frame `{0}` is not measurable")]
    InvalidFrame(String),
    #[error("no route found for waypoint pair {pair}")]
    NoRoute { pair: usize },
}
