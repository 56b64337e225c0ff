#![doc = include_str!("../README.md")]

pub mod bridge;
pub mod config;
pub mod geo;
pub mod merge;
pub mod network;
pub mod route;
pub mod snap;

#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use network::Network;
#[doc(inline)]
pub use route::{compose, ComposedRoute, RouteCosts, WaypointSequence};
