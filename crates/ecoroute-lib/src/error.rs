use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::network::LocationId;

/// Convenient result alias for the ecoroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the default dataset location")]
    ProjectDirsUnavailable,

    /// Raised when a dataset record could not be turned into a network entry.
    #[error("invalid dataset {path} (record {record}): {source}")]
    InvalidDataset {
        path: PathBuf,
        record: u64,
        #[source]
        source: Box<Error>,
    },

    /// Raised when a driving time is neither a non-negative integer nor `X`.
    #[error("invalid driving time '{value}'")]
    InvalidDrivingTime { value: String },

    /// Raised when a location identifier is inserted twice.
    #[error("location id {id} already exists")]
    DuplicateLocation { id: LocationId },

    /// Raised when a location name is inserted twice.
    #[error("location name '{name}' already exists")]
    DuplicateLocationName { name: String },

    #[error("location code '{code}' already exists")]
    DuplicateLocationCode { code: String },

    /// Raised when a segment already connects the two locations in either order.
    #[error("segment between '{from}' and '{to}' already exists")]
    DuplicateSegment { from: String, to: String },

    /// Raised when a segment would connect a location to itself.
    #[error("segment from '{name}' to itself is not allowed")]
    SelfLoop { name: String },

    /// Raised when a location reference could not be resolved.
    #[error("unknown location: {name}{}", format_suggestions(.suggestions))]
    UnknownLocation {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a numeric location identifier is not part of the network.
    #[error("unknown location id: {id}")]
    UnknownLocationId { id: LocationId },

    /// Raised when no segment joins the two named locations.
    #[error("no segment between '{from}' and '{to}'")]
    UnknownSegment { from: String, to: String },

    /// Raised when no route could be found between two locations.
    #[error("no route found between {start} and {goal}")]
    RouteNotFound { start: String, goal: String },

    /// Raised when the mandatory waypoint of a restricted route is itself avoided.
    #[error("waypoint {name} is part of the avoided locations")]
    WaypointExcluded { name: String },

    /// Raised when no driving + walking combination satisfies the request.
    #[error("no park-and-walk route: {reason}")]
    NoParkAndWalkRoute { reason: NoRouteReason },

    /// Raised when fewer than two ranked park-and-walk alternatives exist.
    #[error("no alternative park-and-walk routes (found {found}, need 2)")]
    NoAlternativeRoutes { found: usize },

    /// Raised when a park-and-walk request violates its preconditions.
    #[error("invalid park-and-walk request: {0}")]
    InvalidParkAndWalkQuery(QueryViolation),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why the park-and-walk composer could not produce a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoRouteReason {
    /// No parking-enabled location is reachable by car from the source.
    NoReachableParking,
    /// Parking was reachable, but no parking location has a walking path to the destination.
    NoWalkingPath,
    /// Walking paths exist, but every one exceeds the walking-time budget.
    WalkingLimitExceeded,
}

impl fmt::Display for NoRouteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            NoRouteReason::NoReachableParking => "no parking location is reachable by car",
            NoRouteReason::NoWalkingPath => {
                "no walking path from any reachable parking location to the destination"
            }
            NoRouteReason::WalkingLimitExceeded => {
                "every walking path exceeds the maximum walking time"
            }
        };
        f.write_str(message)
    }
}

/// Precondition violated by a park-and-walk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryViolation {
    SameEndpoints,
    SourceHasParking,
    TargetHasParking,
    TargetAdjacentToSource,
}

impl fmt::Display for QueryViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            QueryViolation::SameEndpoints => "source and destination are the same location",
            QueryViolation::SourceHasParking => "source location offers parking",
            QueryViolation::TargetHasParking => "destination location offers parking",
            QueryViolation::TargetAdjacentToSource => "destination is adjacent to the source",
        };
        f.write_str(message)
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
