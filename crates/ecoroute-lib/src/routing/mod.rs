//! Route composition on top of the constrained search.
//!
//! This module provides:
//! - [`plan_independent_route`] - fastest driving route plus an interior-disjoint alternative
//! - [`plan_restricted_route`] - fastest driving route under exclusions and an optional waypoint
//! - [`plan_park_and_walk`] / [`plan_park_and_walk_alternatives`] - driving leg to a
//!   parking location chained with a walking leg to the destination
//!
//! Every product is composed from repeated [`shortest_paths`] runs and
//! [`SearchTree::path_to`](crate::search::SearchTree::path_to) reconstructions;
//! no search state outlives the call that produced it.
//!
//! # Example
//!
//! ```ignore
//! use ecoroute_lib::{load_network, plan_independent_route, DatasetPaths};
//!
//! let network = load_network(&DatasetPaths::in_dir("data"))?;
//! let source = network.resolve("Alpha")?;
//! let target = network.resolve("Bravo")?;
//! let route = plan_independent_route(&network, source, target)?;
//! println!("best: {} min", route.best.cost);
//! ```

mod park_and_walk;

pub use park_and_walk::{
    park_and_walk_candidates, plan_park_and_walk, plan_park_and_walk_alternatives,
    validate_request, Candidates, ParkAndWalkRequest, ParkAndWalkRoute,
};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::network::{LocationId, Network, SegmentKey};
use crate::path::Path;
use crate::search::{shortest_paths, Exclusions, Metric};

/// Best driving route and its independent alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndependentRoute {
    pub best: Path,
    /// `None` when no route avoids the best route's interior locations.
    pub alternative: Option<Path>,
}

/// Driving route request with caller-supplied exclusions.
#[derive(Debug, Clone, Default)]
pub struct RestrictedRequest {
    pub source: LocationId,
    pub target: LocationId,
    pub exclusions: Exclusions,
    /// Location the route must pass through.
    pub waypoint: Option<LocationId>,
}

impl RestrictedRequest {
    pub fn new(source: LocationId, target: LocationId) -> Self {
        Self {
            source,
            target,
            ..Self::default()
        }
    }

    pub fn with_exclusions(mut self, exclusions: Exclusions) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn through(mut self, waypoint: LocationId) -> Self {
        self.waypoint = Some(waypoint);
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Resolve user-supplied location references and road endpoint pairs into
/// [`Exclusions`]. Roads are banned in both directions and must exist.
pub fn resolve_exclusions<S: AsRef<str>>(
    network: &Network,
    avoid_locations: &[S],
    avoid_segments: &[(S, S)],
) -> Result<Exclusions> {
    let mut exclusions = Exclusions::new();
    for reference in avoid_locations {
        exclusions.avoid_location(network.resolve(reference.as_ref())?);
    }
    for (from, to) in avoid_segments {
        let a = network.resolve(from.as_ref())?;
        let b = network.resolve(to.as_ref())?;
        if !network.are_adjacent(a, b) {
            return Err(Error::UnknownSegment {
                from: network.label(a),
                to: network.label(b),
            });
        }
        exclusions.avoid_segment(a, b);
    }
    Ok(exclusions)
}

fn route_not_found(network: &Network, source: LocationId, target: LocationId) -> Error {
    Error::RouteNotFound {
        start: network.label(source),
        goal: network.label(target),
    }
}

fn driving_leg(
    network: &Network,
    source: LocationId,
    target: LocationId,
    exclusions: &Exclusions,
) -> Result<Path> {
    network.require(target)?;
    shortest_paths(network, source, Metric::Driving, exclusions)?
        .path_to(target)
        .ok_or_else(|| route_not_found(network, source, target))
}

// =============================================================================
// Entry Points
// =============================================================================

/// Fastest driving route plus an alternative sharing no interior location
/// (and no arc) with it.
pub fn plan_independent_route(
    network: &Network,
    source: LocationId,
    target: LocationId,
) -> Result<IndependentRoute> {
    let best = driving_leg(network, source, target, &Exclusions::new())?;

    let mut exclusions = Exclusions::new();
    for id in best.interior() {
        exclusions.avoid_location(*id);
    }
    for pair in best.steps.windows(2) {
        exclusions.avoid_arc(SegmentKey::new(pair[0], pair[1]));
    }

    let alternative = if source == target {
        None
    } else {
        shortest_paths(network, source, Metric::Driving, &exclusions)?.path_to(target)
    };

    debug!(
        source,
        target,
        best = best.cost,
        alternative = alternative.as_ref().map(|path| path.cost),
        "independent route planned"
    );

    Ok(IndependentRoute { best, alternative })
}

/// Fastest driving route under the request's exclusions, optionally forced
/// through a waypoint.
pub fn plan_restricted_route(network: &Network, request: &RestrictedRequest) -> Result<Path> {
    let RestrictedRequest {
        source,
        target,
        exclusions,
        waypoint,
    } = request;

    network.require(*source)?;
    network.require(*target)?;
    if exclusions.excludes_location(*source) || exclusions.excludes_location(*target) {
        return Err(route_not_found(network, *source, *target));
    }

    let Some(waypoint) = waypoint else {
        return driving_leg(network, *source, *target, exclusions);
    };

    network.require(*waypoint)?;
    if exclusions.excludes_location(*waypoint) {
        return Err(Error::WaypointExcluded {
            name: network.label(*waypoint),
        });
    }

    let first = driving_leg(network, *source, *waypoint, exclusions)
        .map_err(|_| route_not_found(network, *source, *target))?;
    let second = driving_leg(network, *waypoint, *target, exclusions)
        .map_err(|_| route_not_found(network, *source, *target))?;

    Ok(first.join(second))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Network {
        // 1 - 2 - 3
        // |       |
        // 4 - 5 - 6
        let mut network = Network::new();
        for id in 1..=6 {
            let name = format!("L{id}");
            network.add_location(id, name.clone(), name, false).unwrap();
        }
        network.add_segment("L1", "L2", 1, 5).unwrap();
        network.add_segment("L2", "L3", 1, 5).unwrap();
        network.add_segment("L1", "L4", 2, 5).unwrap();
        network.add_segment("L4", "L5", 2, 5).unwrap();
        network.add_segment("L5", "L6", 2, 5).unwrap();
        network.add_segment("L6", "L3", 2, 5).unwrap();
        network
    }

    #[test]
    fn independent_route_avoids_best_interior() {
        let network = grid();
        let route = plan_independent_route(&network, 1, 3).unwrap();
        assert_eq!(route.best.steps, vec![1, 2, 3]);
        assert_eq!(route.best.cost, 2);
        let alternative = route.alternative.expect("alternative exists");
        assert_eq!(alternative.steps, vec![1, 4, 5, 6, 3]);
        assert_eq!(alternative.cost, 8);
    }

    #[test]
    fn direct_best_route_is_not_repeated() {
        let network = grid();
        let route = plan_independent_route(&network, 1, 2).unwrap();
        assert_eq!(route.best.steps, vec![1, 2]);
        let alternative = route.alternative.expect("around the loop");
        assert_eq!(alternative.steps, vec![1, 4, 5, 6, 3, 2]);
    }

    #[test]
    fn restricted_route_honours_waypoint() {
        let network = grid();
        let request = RestrictedRequest::new(1, 3).through(5);
        let path = plan_restricted_route(&network, &request).unwrap();
        assert_eq!(path.steps, vec![1, 4, 5, 6, 3]);
        assert_eq!(path.cost, 8);
    }

    #[test]
    fn excluded_waypoint_is_rejected() {
        let network = grid();
        let request = RestrictedRequest::new(1, 3)
            .with_exclusions(Exclusions::new().with_location(5))
            .through(5);
        assert!(matches!(
            plan_restricted_route(&network, &request),
            Err(Error::WaypointExcluded { .. })
        ));
    }

    #[test]
    fn resolve_exclusions_rejects_missing_road() {
        let network = grid();
        let err = resolve_exclusions(&network, &[] as &[&str], &[("L1", "L3")]).unwrap_err();
        assert!(matches!(err, Error::UnknownSegment { .. }));

        let exclusions = resolve_exclusions(&network, &["L5"], &[("L2", "L1")]).unwrap();
        assert!(exclusions.excludes_location(5));
        assert!(exclusions.excludes_arc(SegmentKey::new(1, 2)));
        assert!(exclusions.excludes_arc(SegmentKey::new(2, 1)));
    }
}
