//! Batch query files.
//!
//! Input is a list of `Key:value` lines:
//!
//! ```text
//! Mode:driving
//! Source:1
//! Destination:3
//! AvoidNodes:2,5
//! AvoidSegments:(1,4),(4,3)
//! IncludeNode:6
//! ```
//!
//! `driving-walking` mode additionally requires `MaxWalkTime:<minutes>`.
//! Output uses the same `Key:value` style with routes written as
//! `id,id,id(minutes)`, or `none` when no route exists.

use std::fmt::Write;

use anyhow::{anyhow, bail, Context, Result};
use tracing::debug;

use ecoroute_lib::{
    plan_independent_route, plan_park_and_walk, plan_park_and_walk_alternatives,
    plan_restricted_route, resolve_exclusions, Error as RouteError, Exclusions, LocationId,
    Minutes, Network, NoRouteReason, ParkAndWalkRequest, ParkAndWalkRoute, Path,
    RestrictedRequest,
};

/// Query kind selected by the `Mode` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Driving,
    DrivingWalking,
}

/// A parsed batch query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchQuery {
    pub mode: BatchMode,
    pub source: LocationId,
    pub target: LocationId,
    pub avoid_nodes: Vec<LocationId>,
    pub avoid_segments: Vec<(LocationId, LocationId)>,
    pub include_node: Option<LocationId>,
    pub max_walk: Option<Minutes>,
}

impl BatchQuery {
    /// A driving query with restrictions is answered with a single restricted route.
    pub fn is_restricted(&self) -> bool {
        !self.avoid_nodes.is_empty() || !self.avoid_segments.is_empty() || self.include_node.is_some()
    }

    /// Parse the `Key:value` input format. Unknown keys are rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let mut mode = None;
        let mut source = None;
        let mut target = None;
        let mut avoid_nodes = Vec::new();
        let mut avoid_segments = Vec::new();
        let mut include_node = None;
        let mut max_walk = None;

        for (index, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| anyhow!("line {}: expected 'Key:value', got '{line}'", index + 1))?;
            let value = value.trim();
            let context = || format!("line {}: invalid {key}", index + 1);

            match key.trim() {
                "Mode" => mode = Some(parse_mode(value).with_context(context)?),
                "Source" => source = Some(parse_id(value).with_context(context)?),
                "Destination" => target = Some(parse_id(value).with_context(context)?),
                "AvoidNodes" => avoid_nodes = parse_id_list(value).with_context(context)?,
                "AvoidSegments" => avoid_segments = parse_pairs(value).with_context(context)?,
                "IncludeNode" if value.is_empty() => include_node = None,
                "IncludeNode" => include_node = Some(parse_id(value).with_context(context)?),
                "MaxWalkTime" => max_walk = Some(value.parse::<Minutes>().with_context(context)?),
                other => bail!("line {}: unknown key '{other}'", index + 1),
            }
        }

        let mode = mode.context("missing Mode")?;
        let query = Self {
            mode,
            source: source.context("missing Source")?,
            target: target.context("missing Destination")?,
            avoid_nodes,
            avoid_segments,
            include_node,
            max_walk,
        };
        if mode == BatchMode::DrivingWalking && query.max_walk.is_none() {
            bail!("missing MaxWalkTime for driving-walking mode");
        }
        Ok(query)
    }

    fn exclusions(&self, network: &Network) -> Result<Exclusions> {
        let nodes: Vec<String> = self.avoid_nodes.iter().map(ToString::to_string).collect();
        let segments: Vec<(String, String)> = self
            .avoid_segments
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        Ok(resolve_exclusions(
            network,
            nodes.as_slice(),
            segments.as_slice(),
        )?)
    }
}

fn parse_mode(value: &str) -> Result<BatchMode> {
    match value {
        "driving" => Ok(BatchMode::Driving),
        "driving-walking" => Ok(BatchMode::DrivingWalking),
        other => bail!("unsupported mode '{other}'"),
    }
}

fn parse_id(value: &str) -> Result<LocationId> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("'{}' is not a location id", value.trim()))
}

fn parse_id_list(value: &str) -> Result<Vec<LocationId>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_id)
        .collect()
}

/// `(1,2),(3,4)` into id pairs.
fn parse_pairs(value: &str) -> Result<Vec<(LocationId, LocationId)>> {
    let mut pairs = Vec::new();
    let mut rest = value.trim();
    while !rest.is_empty() {
        let open = rest
            .strip_prefix('(')
            .ok_or_else(|| anyhow!("expected '(' in '{rest}'"))?;
        let (inner, after) = open
            .split_once(')')
            .ok_or_else(|| anyhow!("unclosed '(' in '{value}'"))?;
        let (a, b) = inner
            .split_once(',')
            .ok_or_else(|| anyhow!("expected 'a,b' in '({inner})'"))?;
        pairs.push((parse_id(a)?, parse_id(b)?));
        rest = after.trim_start().trim_start_matches(',').trim_start();
    }
    Ok(pairs)
}

fn compact(path: Option<&Path>) -> String {
    match path {
        Some(path) => {
            let ids = path
                .steps
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            format!("{}({})", ids, path.cost)
        }
        None => "none".to_string(),
    }
}

/// Answer `query` against `network` in the batch output format.
///
/// Unreachable destinations are reported in-band (`none`, `Message:`);
/// malformed queries and unknown ids are errors.
pub fn run_query(network: &Network, query: &BatchQuery) -> Result<String> {
    let mut out = String::new();
    let _ = writeln!(out, "Source:{}", query.source);
    let _ = writeln!(out, "Destination:{}", query.target);

    let exclusions = query.exclusions(network)?;
    match query.mode {
        BatchMode::Driving if query.is_restricted() => {
            let mut request =
                RestrictedRequest::new(query.source, query.target).with_exclusions(exclusions);
            if let Some(waypoint) = query.include_node {
                request = request.through(waypoint);
            }
            let path = unreachable_as_none(plan_restricted_route(network, &request))?;
            let _ = writeln!(out, "RestrictedDrivingRoute:{}", compact(path.as_ref()));
        }
        BatchMode::Driving => {
            let route = unreachable_as_none(plan_independent_route(
                network,
                query.source,
                query.target,
            ))?;
            let best = route.as_ref().map(|route| &route.best);
            let alternative = route.as_ref().and_then(|route| route.alternative.as_ref());
            let _ = writeln!(out, "BestDrivingRoute:{}", compact(best));
            let _ = writeln!(out, "AlternativeDrivingRoute:{}", compact(alternative));
        }
        BatchMode::DrivingWalking => {
            let request = ParkAndWalkRequest::new(
                query.source,
                query.target,
                query.max_walk.unwrap_or_default(),
            )
            .with_exclusions(exclusions);
            write_park_and_walk(&mut out, network, &request)?;
        }
    }

    debug!(source = query.source, target = query.target, "batch query answered");
    Ok(out)
}

fn unreachable_as_none<T>(result: ecoroute_lib::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RouteError::RouteNotFound { .. }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn write_route(out: &mut String, suffix: &str, route: Option<&ParkAndWalkRoute>) {
    let _ = writeln!(
        out,
        "DrivingRoute{suffix}:{}",
        compact(route.map(|route| &route.driving))
    );
    let parking = route.map_or_else(|| "none".to_string(), |route| route.parking.to_string());
    let _ = writeln!(out, "ParkingNode{suffix}:{parking}");
    let _ = writeln!(
        out,
        "WalkingRoute{suffix}:{}",
        compact(route.map(|route| &route.walking))
    );
    let total = route.map(|route| route.total_time().to_string()).unwrap_or_default();
    let _ = writeln!(out, "TotalTime{suffix}:{total}");
}

fn write_park_and_walk(
    out: &mut String,
    network: &Network,
    request: &ParkAndWalkRequest,
) -> Result<()> {
    let reason = match plan_park_and_walk(network, request) {
        Ok(route) => {
            write_route(out, "", Some(&route));
            return Ok(());
        }
        Err(RouteError::NoParkAndWalkRoute { reason }) => reason,
        Err(err) => return Err(err.into()),
    };

    write_route(out, "", None);
    let _ = writeln!(out, "Message:{reason}");

    if reason == NoRouteReason::WalkingLimitExceeded {
        match plan_park_and_walk_alternatives(network, request) {
            Ok(routes) => {
                for (index, route) in routes.iter().enumerate() {
                    write_route(out, &(index + 1).to_string(), Some(route));
                }
            }
            Err(RouteError::NoAlternativeRoutes { .. }) => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> Network {
        let mut network = Network::new();
        network.add_location(1, "S", "Start", false).unwrap();
        network.add_location(2, "P", "Park", true).unwrap();
        network.add_location(3, "T", "Target", false).unwrap();
        network.add_segment("Start", "Park", 10, 30).unwrap();
        network.add_segment("Park", "Target", 2, 5).unwrap();
        network
    }

    #[test]
    fn parses_every_key() {
        let query = BatchQuery::parse(
            "Mode:driving\nSource:1\nDestination:3\nAvoidNodes:2, 4\n\
             AvoidSegments:(1,2),(3,4)\nIncludeNode:5\n",
        )
        .unwrap();

        assert_eq!(query.mode, BatchMode::Driving);
        assert_eq!(query.avoid_nodes, vec![2, 4]);
        assert_eq!(query.avoid_segments, vec![(1, 2), (3, 4)]);
        assert_eq!(query.include_node, Some(5));
        assert!(query.is_restricted());
    }

    #[test]
    fn empty_optional_keys_are_allowed() {
        let query = BatchQuery::parse(
            "Mode:driving\nSource:1\nDestination:3\nAvoidNodes:\nAvoidSegments:\nIncludeNode:\n",
        )
        .unwrap();
        assert!(!query.is_restricted());
    }

    #[test]
    fn walking_mode_needs_a_budget() {
        let err = BatchQuery::parse("Mode:driving-walking\nSource:1\nDestination:3\n").unwrap_err();
        assert!(err.to_string().contains("MaxWalkTime"));
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        let err =
            BatchQuery::parse("Mode:driving\nSource:1\nDestination:3\nAvoidSegments:(1,2\n")
                .unwrap_err();
        assert!(format!("{err:#}").contains("AvoidSegments"));
    }

    #[test]
    fn park_and_walk_output_lists_both_legs() {
        let query =
            BatchQuery::parse("Mode:driving-walking\nSource:1\nDestination:3\nMaxWalkTime:5\n")
                .unwrap();
        let output = run_query(&network(), &query).unwrap();
        assert_eq!(
            output,
            "Source:1\nDestination:3\nDrivingRoute:1,2(10)\nParkingNode:2\n\
             WalkingRoute:2,3(5)\nTotalTime:15\n"
        );
    }

    #[test]
    fn tight_budget_reports_message() {
        let query =
            BatchQuery::parse("Mode:driving-walking\nSource:1\nDestination:3\nMaxWalkTime:4\n")
                .unwrap();
        let output = run_query(&network(), &query).unwrap();
        assert!(output.contains("DrivingRoute:none\nParkingNode:none\nWalkingRoute:none\nTotalTime:\n"));
        assert!(output.contains("Message:every walking path exceeds the maximum walking time"));
        assert!(!output.contains("DrivingRoute1:"));
    }
}
