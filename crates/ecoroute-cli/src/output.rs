//! Output formatting for planned routes.
//!
//! Every renderer returns a `String` so `main.rs` decides where it goes and
//! tests can inspect it without capturing stdout.

use std::fmt::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use ecoroute_lib::{
    IndependentSummary, Location, Network, NoRouteReason, ParkAndWalkSummary, RouteRenderMode,
    RouteSummary, Segment,
};

use crate::terminal::ColorPalette;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON on stdout.
    Json,
}

/// Locations and roads of a loaded network, each road listed once.
#[derive(Debug, Serialize)]
pub struct NetworkListing<'a> {
    pub locations: Vec<&'a Location>,
    pub roads: Vec<&'a Segment>,
}

impl<'a> NetworkListing<'a> {
    pub fn from_network(network: &'a Network) -> Self {
        Self {
            locations: network.locations().collect(),
            roads: network
                .segments()
                .filter(|segment| segment.origin < segment.destination)
                .collect(),
        }
    }
}

/// Outcome of an `eco` query.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EcoReport {
    /// A route satisfied the walking budget.
    Route { route: ParkAndWalkSummary },
    /// No route fit the budget; the closest combinations are listed instead.
    Approximate {
        reason: NoRouteReason,
        alternatives: Vec<ParkAndWalkSummary>,
    },
}

/// Serialise any summary as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("failed to serialise output")?;
    json.push('\n');
    Ok(json)
}

/// Text renderer using a resolved color palette.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    palette: ColorPalette,
}

impl TextRenderer {
    pub fn new(palette: ColorPalette) -> Self {
        Self { palette }
    }

    pub fn network(&self, listing: &NetworkListing<'_>, network: &Network) -> String {
        let p = self.palette;
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "{}Locations ({}):{}",
            p.white_bold,
            listing.locations.len(),
            p.reset
        );
        for location in &listing.locations {
            let parking = if location.has_parking {
                format!(" {}[parking]{}", p.green, p.reset)
            } else {
                String::new()
            };
            let _ = writeln!(
                buffer,
                "{}{:>4}{} {:<6} {}{}",
                p.gray, location.id, p.reset, location.code, location.name, parking
            );
        }

        let _ = writeln!(
            buffer,
            "\n{}Roads ({}):{}",
            p.white_bold,
            listing.roads.len(),
            p.reset
        );
        let name = |id| network.location_name(id).unwrap_or("<unknown>");
        for road in &listing.roads {
            let _ = writeln!(
                buffer,
                "  {} <-> {}: {}driving {}{} / {}walking {}{}",
                name(road.origin),
                name(road.destination),
                p.cyan,
                road.driving,
                p.reset,
                p.green,
                road.walking,
                p.reset
            );
        }
        buffer
    }

    /// One path: colored heading followed by the numbered steps.
    pub fn route(&self, summary: &RouteSummary) -> String {
        let p = self.palette;
        let plain = summary.render(RouteRenderMode::PlainText);
        let (heading, steps) = plain.split_once('\n').unwrap_or((plain.as_str(), ""));
        format!("{}{}{}\n{}", p.white_bold, heading, p.reset, steps)
    }

    pub fn independent(&self, summary: &IndependentSummary) -> String {
        let p = self.palette;
        let mut buffer = self.route(&summary.best);
        buffer.push('\n');
        match &summary.alternative {
            Some(alternative) => buffer.push_str(&self.route(alternative)),
            None => {
                let _ = writeln!(
                    buffer,
                    "{}Alternative driving route: none{}",
                    p.gray, p.reset
                );
            }
        }
        buffer
    }

    pub fn park_and_walk(&self, summary: &ParkAndWalkSummary) -> String {
        let p = self.palette;
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "{}Park at {}{} ({}){}, total {} min",
            p.white_bold,
            p.green,
            summary.parking.name.as_deref().unwrap_or("<unknown>"),
            summary.parking.id,
            p.reset,
            summary.total_minutes
        );
        buffer.push_str(&self.route(&summary.driving));
        buffer.push_str(&self.route(&summary.walking));
        buffer
    }

    pub fn eco(&self, report: &EcoReport) -> String {
        let p = self.palette;
        match report {
            EcoReport::Route { route } => self.park_and_walk(route),
            EcoReport::Approximate {
                reason,
                alternatives,
            } => {
                let mut buffer = String::new();
                let _ = writeln!(buffer, "{}No park-and-walk route: {}{}", p.red, reason, p.reset);
                if alternatives.is_empty() {
                    return buffer;
                }
                let _ = writeln!(
                    buffer,
                    "{}Approximate solutions exceeding the walking limit:{}",
                    p.orange, p.reset
                );
                for (index, alternative) in alternatives.iter().enumerate() {
                    let _ = write!(buffer, "\n{}#{}{} ", p.orange, index + 1, p.reset);
                    buffer.push_str(&self.park_and_walk(alternative));
                }
                buffer
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoroute_lib::{Metric, Path, RouteOutputKind};

    fn network() -> Network {
        let mut network = Network::new();
        network.add_location(1, "AL", "Alpha", false).unwrap();
        network.add_location(2, "BR", "Bravo", true).unwrap();
        network
            .add_segment("Alpha", "Bravo", ecoroute_lib::DrivingTime::Impassable, 4)
            .unwrap();
        network
    }

    #[test]
    fn network_listing_shows_each_road_once() {
        let network = network();
        let listing = NetworkListing::from_network(&network);
        assert_eq!(listing.roads.len(), 1);

        let text = TextRenderer::new(ColorPalette::plain()).network(&listing, &network);
        assert!(text.contains("Locations (2):"));
        assert!(text.contains("Bravo [parking]"));
        assert!(text.contains("Alpha <-> Bravo: driving X / walking 4"));
    }

    #[test]
    fn missing_alternative_is_spelled_out() {
        let network = network();
        let best = RouteSummary::from_path(
            RouteOutputKind::Best,
            &network,
            &Path {
                metric: Metric::Walking,
                steps: vec![1, 2],
                cost: 4,
            },
        );
        let summary = IndependentSummary {
            best,
            alternative: None,
        };
        let text = TextRenderer::new(ColorPalette::plain()).independent(&summary);
        assert!(text.starts_with("Best driving route: Alpha -> Bravo"));
        assert!(text.contains("Alternative driving route: none"));
    }

    #[test]
    fn approximate_report_is_tagged_in_json() {
        let report = EcoReport::Approximate {
            reason: NoRouteReason::WalkingLimitExceeded,
            alternatives: Vec::new(),
        };
        let json = to_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "approximate");
        assert_eq!(value["reason"], "walking_limit_exceeded");
    }
}
