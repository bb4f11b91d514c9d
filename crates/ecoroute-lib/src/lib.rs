//! ecoroute library entry points.
//!
//! This crate exposes helpers to locate a bimodal road network dataset, load
//! it into memory, run constrained shortest-path searches under a driving or
//! walking metric, and compose those searches into higher-level routes:
//! independent alternatives, restricted routes through a waypoint, and
//! park-and-walk routes. Higher-level consumers (the CLI) should only depend
//! on the functions exported here instead of reimplementing behavior.

pub mod dataset;
pub mod error;
pub mod loader;
pub mod network;
pub mod output;
pub mod path;
pub mod routing;
pub mod search;

pub use dataset::{default_data_dir, resolve_dataset, DatasetPaths};
pub use error::{Error, NoRouteReason, QueryViolation, Result};
pub use loader::load_network;
pub use network::{DrivingTime, Location, LocationId, Minutes, Network, Segment, SegmentKey};
pub use output::{
    IndependentSummary, ParkAndWalkSummary, RouteOutputKind, RouteRenderMode, RouteStep,
    RouteSummary,
};
pub use path::{find_path, reconstruct_path, Path};
pub use routing::{
    park_and_walk_candidates, plan_independent_route, plan_park_and_walk,
    plan_park_and_walk_alternatives, plan_restricted_route, resolve_exclusions,
    validate_request, Candidates, IndependentRoute, ParkAndWalkRequest, ParkAndWalkRoute,
    RestrictedRequest,
};
pub use search::{shortest_paths, Exclusions, Metric, SearchTree};
