//! Park-and-walk composition: drive to a parking location, walk the rest.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, NoRouteReason, QueryViolation, Result};
use crate::network::{LocationId, Minutes, Network};
use crate::path::Path;
use crate::search::{shortest_paths, Exclusions, Metric};

/// Number of ranked alternatives returned when the walking budget cannot be met.
const ALTERNATIVE_COUNT: usize = 2;

/// Park-and-walk request.
#[derive(Debug, Clone, Default)]
pub struct ParkAndWalkRequest {
    pub source: LocationId,
    pub target: LocationId,
    /// Maximum walking time in minutes.
    pub max_walk: Minutes,
    /// Applied to both the driving and the walking leg.
    pub exclusions: Exclusions,
}

impl ParkAndWalkRequest {
    pub fn new(source: LocationId, target: LocationId, max_walk: Minutes) -> Self {
        Self {
            source,
            target,
            max_walk,
            exclusions: Exclusions::new(),
        }
    }

    pub fn with_exclusions(mut self, exclusions: Exclusions) -> Self {
        self.exclusions = exclusions;
        self
    }
}

/// Driving leg to `parking` followed by a walking leg to the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkAndWalkRoute {
    pub parking: LocationId,
    pub driving: Path,
    pub walking: Path,
}

impl ParkAndWalkRoute {
    pub fn driving_time(&self) -> Minutes {
        self.driving.cost
    }

    pub fn walking_time(&self) -> Minutes {
        self.walking.cost
    }

    pub fn total_time(&self) -> Minutes {
        self.driving.cost + self.walking.cost
    }
}

/// Every driving + walking combination available for a request, before the
/// walking budget is applied.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    /// Parking locations reachable by car from the source.
    pub reachable_parking: usize,
    /// Combinations whose walking leg reaches the destination, in parking order.
    pub routes: Vec<ParkAndWalkRoute>,
}

impl Candidates {
    /// Reason to report when none of the routes satisfies `max_walk`.
    fn failure_reason(&self) -> NoRouteReason {
        if self.reachable_parking == 0 {
            NoRouteReason::NoReachableParking
        } else if self.routes.iter().all(|route| route.walking_time() == 0) {
            NoRouteReason::NoWalkingPath
        } else {
            NoRouteReason::WalkingLimitExceeded
        }
    }
}

/// Ranking policy: shortest total time, then the *longer* walk, then the
/// lower parking id.
fn compare_routes(a: &ParkAndWalkRoute, b: &ParkAndWalkRoute) -> Ordering {
    a.total_time()
        .cmp(&b.total_time())
        .then_with(|| b.walking_time().cmp(&a.walking_time()))
        .then_with(|| a.parking.cmp(&b.parking))
}

/// Check the endpoint preconditions of a park-and-walk request.
///
/// An excluded source or destination cannot be reached at all and is reported
/// as [`Error::RouteNotFound`], the same as for a restricted route.
pub fn validate_request(network: &Network, request: &ParkAndWalkRequest) -> Result<()> {
    let source = network.require(request.source)?;
    let target = network.require(request.target)?;

    let exclusions = &request.exclusions;
    if exclusions.excludes_location(source.id) || exclusions.excludes_location(target.id) {
        return Err(super::route_not_found(network, source.id, target.id));
    }

    let violation = if source.id == target.id {
        Some(QueryViolation::SameEndpoints)
    } else if source.has_parking {
        Some(QueryViolation::SourceHasParking)
    } else if target.has_parking {
        Some(QueryViolation::TargetHasParking)
    } else if network.are_adjacent(source.id, target.id) {
        Some(QueryViolation::TargetAdjacentToSource)
    } else {
        None
    };

    match violation {
        Some(violation) => Err(Error::InvalidParkAndWalkQuery(violation)),
        None => Ok(()),
    }
}

/// Build every driving + walking combination for `request`.
///
/// One driving search runs from the source; one walking search runs from each
/// reachable parking location. The driving leg only honours the caller's
/// exclusions, so it may pass through the destination on its way to a parking
/// location and the walking leg then leads back.
pub fn park_and_walk_candidates(
    network: &Network,
    request: &ParkAndWalkRequest,
) -> Result<Candidates> {
    validate_request(network, request)?;

    let exclusions = &request.exclusions;
    let driving = shortest_paths(network, request.source, Metric::Driving, exclusions)?;

    let parking_legs: Vec<(LocationId, Path)> = network
        .locations()
        .filter(|location| location.has_parking)
        .filter(|location| location.id != request.source && location.id != request.target)
        .filter_map(|location| {
            driving
                .path_to(location.id)
                .map(|path| (location.id, path))
        })
        .collect();

    let mut candidates = Candidates {
        reachable_parking: parking_legs.len(),
        routes: Vec::new(),
    };

    for (parking, driving_leg) in parking_legs {
        let walking = shortest_paths(network, parking, Metric::Walking, exclusions)?;
        let Some(walking_leg) = walking.path_to(request.target) else {
            trace!(parking, "no walking path from parking");
            continue;
        };
        trace!(
            parking,
            driving = driving_leg.cost,
            walking = walking_leg.cost,
            "park-and-walk candidate"
        );
        candidates.routes.push(ParkAndWalkRoute {
            parking,
            driving: driving_leg,
            walking: walking_leg,
        });
    }

    debug!(
        source = request.source,
        target = request.target,
        reachable_parking = candidates.reachable_parking,
        combinations = candidates.routes.len(),
        "park-and-walk candidates built"
    );

    Ok(candidates)
}

/// Fastest park-and-walk route whose walking leg is non-empty and within
/// the request's budget.
///
/// On equal total time the route with the longer walk wins.
pub fn plan_park_and_walk(
    network: &Network,
    request: &ParkAndWalkRequest,
) -> Result<ParkAndWalkRoute> {
    let candidates = park_and_walk_candidates(network, request)?;
    let reason = candidates.failure_reason();

    candidates
        .routes
        .into_iter()
        .filter(|route| route.walking_time() > 0 && route.walking_time() <= request.max_walk)
        .min_by(compare_routes)
        .ok_or(Error::NoParkAndWalkRoute { reason })
}

/// The two fastest combinations whose walking leg exceeds the budget, ranked
/// by total time.
pub fn plan_park_and_walk_alternatives(
    network: &Network,
    request: &ParkAndWalkRequest,
) -> Result<Vec<ParkAndWalkRoute>> {
    let candidates = park_and_walk_candidates(network, request)?;

    let mut over_budget: Vec<ParkAndWalkRoute> = candidates
        .routes
        .into_iter()
        .filter(|route| route.walking_time() > request.max_walk)
        .collect();

    if over_budget.len() < ALTERNATIVE_COUNT {
        return Err(Error::NoAlternativeRoutes {
            found: over_budget.len(),
        });
    }

    over_budget.sort_by(compare_routes);
    over_budget.truncate(ALTERNATIVE_COUNT);
    Ok(over_budget)
}
