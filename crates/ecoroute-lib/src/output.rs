use std::fmt::Write;

use serde::Serialize;

use crate::network::{LocationId, Minutes, Network};
use crate::path::Path;
use crate::routing::{IndependentRoute, ParkAndWalkRoute};
use crate::search::Metric;

/// Classifies the role a path plays in a composed result.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteOutputKind {
    Best,
    Alternative,
    Restricted,
    Driving,
    Walking,
}

impl RouteOutputKind {
    /// Human-readable label shown in textual renderings.
    pub fn label(self) -> &'static str {
        match self {
            RouteOutputKind::Best => "Best driving route",
            RouteOutputKind::Alternative => "Alternative driving route",
            RouteOutputKind::Restricted => "Restricted driving route",
            RouteOutputKind::Driving => "Driving leg",
            RouteOutputKind::Walking => "Walking leg",
        }
    }
}

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    /// Header line followed by one numbered line per location.
    PlainText,
    /// `id,id,id(minutes)` on a single line.
    Compact,
}

/// Location visited by a route.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteStep {
    pub index: usize,
    pub id: LocationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RouteStep {
    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unknown>")
    }
}

/// Structured representation of a path that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteSummary {
    pub kind: RouteOutputKind,
    pub metric: Metric,
    pub minutes: Minutes,
    pub hops: usize,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    /// Convert a [`Path`] into a summary with resolved location names.
    pub fn from_path(kind: RouteOutputKind, network: &Network, path: &Path) -> Self {
        let steps = path
            .steps
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let location = network.location(*id);
                RouteStep {
                    index,
                    id: *id,
                    code: location.map(|l| l.code.clone()),
                    name: location.map(|l| l.name.clone()),
                }
            })
            .collect();

        Self {
            kind,
            metric: path.metric,
            minutes: path.cost,
            hops: path.hop_count(),
            steps,
        }
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::Compact => self.render_compact(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let start = self.steps.first().map(RouteStep::display_name).unwrap_or("?");
        let goal = self.steps.last().map(RouteStep::display_name).unwrap_or("?");
        let _ = writeln!(
            buffer,
            "{}: {} -> {} ({} min {}, {} hops)",
            self.kind.label(),
            start,
            goal,
            self.minutes,
            self.metric,
            self.hops
        );
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "{:>3}: {} ({})",
                step.index,
                step.display_name(),
                step.id
            );
        }
        buffer
    }

    fn render_compact(&self) -> String {
        let ids = self
            .steps
            .iter()
            .map(|step| step.id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", ids, self.minutes)
    }
}

/// Serialisable form of an [`IndependentRoute`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndependentSummary {
    pub best: RouteSummary,
    /// `None` serialises as `null`, signalling that no alternative exists.
    pub alternative: Option<RouteSummary>,
}

impl IndependentSummary {
    pub fn from_route(network: &Network, route: &IndependentRoute) -> Self {
        Self {
            best: RouteSummary::from_path(RouteOutputKind::Best, network, &route.best),
            alternative: route
                .alternative
                .as_ref()
                .map(|path| RouteSummary::from_path(RouteOutputKind::Alternative, network, path)),
        }
    }
}

/// Serialisable form of a [`ParkAndWalkRoute`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ParkAndWalkSummary {
    pub parking: RouteStep,
    pub driving: RouteSummary,
    pub walking: RouteSummary,
    pub total_minutes: Minutes,
}

impl ParkAndWalkSummary {
    pub fn from_route(network: &Network, route: &ParkAndWalkRoute) -> Self {
        let driving = RouteSummary::from_path(RouteOutputKind::Driving, network, &route.driving);
        let walking = RouteSummary::from_path(RouteOutputKind::Walking, network, &route.walking);
        let parking = driving
            .steps
            .last()
            .cloned()
            .unwrap_or_else(|| RouteStep {
                index: 0,
                id: route.parking,
                code: None,
                name: network.location_name(route.parking).map(str::to_string),
            });

        Self {
            parking,
            driving,
            walking,
            total_minutes: route.total_time(),
        }
    }

    /// Multi-line plain text rendering of both legs.
    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Park at {} ({}), total {} min",
            self.parking.display_name(),
            self.parking.id,
            self.total_minutes
        );
        buffer.push_str(&self.driving.render(RouteRenderMode::PlainText));
        buffer.push_str(&self.walking.render(RouteRenderMode::PlainText));
        buffer
    }
}
