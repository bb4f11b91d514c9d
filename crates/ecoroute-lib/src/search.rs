//! Constrained single-source Dijkstra over one edge metric.
//!
//! A search never mutates the [`Network`]; its labels live in the returned
//! [`SearchTree`], which belongs to the caller and is read by the path
//! reconstruction in [`crate::path`].

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::network::{LocationId, Minutes, Network, Segment, SegmentKey};

/// Edge-weight dimension used by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Driving,
    Walking,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Metric::Driving => "driving",
            Metric::Walking => "walking",
        };
        f.write_str(value)
    }
}

/// Locations and arcs a search must not traverse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    locations: HashSet<LocationId>,
    arcs: HashSet<SegmentKey>,
}

impl Exclusions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ban a location; no arc leading into it will be relaxed.
    pub fn avoid_location(&mut self, id: LocationId) -> &mut Self {
        self.locations.insert(id);
        self
    }

    /// Ban a road in both directions.
    pub fn avoid_segment(&mut self, a: LocationId, b: LocationId) -> &mut Self {
        let key = SegmentKey::new(a, b);
        self.arcs.insert(key);
        self.arcs.insert(key.reversed());
        self
    }

    /// Ban a single traversal direction.
    pub fn avoid_arc(&mut self, key: SegmentKey) -> &mut Self {
        self.arcs.insert(key);
        self
    }

    pub fn with_location(mut self, id: LocationId) -> Self {
        self.avoid_location(id);
        self
    }

    pub fn with_segment(mut self, a: LocationId, b: LocationId) -> Self {
        self.avoid_segment(a, b);
        self
    }

    pub fn excludes_location(&self, id: LocationId) -> bool {
        self.locations.contains(&id)
    }

    pub fn excludes_arc(&self, key: SegmentKey) -> bool {
        self.arcs.contains(&key)
    }

    /// Whether a search may relax `segment`.
    pub fn allows(&self, segment: &Segment) -> bool {
        !self.arcs.contains(&segment.key()) && !self.locations.contains(&segment.destination)
    }

    pub fn locations(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.locations.iter().copied()
    }

    pub fn arcs(&self) -> impl Iterator<Item = SegmentKey> + '_ {
        self.arcs.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.arcs.is_empty()
    }
}

/// Labels produced by one search: tentative distances that became final and
/// the arc through which each settled location was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTree {
    source: LocationId,
    metric: Metric,
    distances: HashMap<LocationId, Minutes>,
    predecessors: HashMap<LocationId, SegmentKey>,
}

impl SearchTree {
    pub fn source(&self) -> LocationId {
        self.source
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Shortest distance from the source, or `None` when unreachable.
    pub fn distance(&self, target: LocationId) -> Option<Minutes> {
        self.distances.get(&target).copied()
    }

    /// Arc used to reach `target` on its shortest path.
    pub fn predecessor(&self, target: LocationId) -> Option<SegmentKey> {
        self.predecessors.get(&target).copied()
    }

    pub fn is_reachable(&self, target: LocationId) -> bool {
        self.distances.contains_key(&target)
    }

    /// Reached locations with their distances, nearest first.
    pub fn reached(&self) -> Vec<(LocationId, Minutes)> {
        let mut reached: Vec<_> = self.distances.iter().map(|(id, d)| (*id, *d)).collect();
        reached.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        reached
    }
}

/// Run Dijkstra from `source` under `metric`, skipping excluded arcs and
/// arcs that lead into excluded locations.
///
/// The source itself is always settled, even when listed in `exclusions`.
/// Arcs the metric marks as unusable (impassable for driving) are never
/// relaxed.
pub fn shortest_paths(
    network: &Network,
    source: LocationId,
    metric: Metric,
    exclusions: &Exclusions,
) -> Result<SearchTree> {
    network.require(source)?;

    let mut distances: HashMap<LocationId, Minutes> = HashMap::new();
    let mut predecessors: HashMap<LocationId, SegmentKey> = HashMap::new();
    let mut settled: HashSet<LocationId> = HashSet::new();
    let mut queue = BinaryHeap::new();

    distances.insert(source, 0);
    queue.push(QueueEntry::new(source, 0));

    while let Some(entry) = queue.pop() {
        // The first pop of a node carries its final distance; later ones are stale.
        if !settled.insert(entry.node) {
            continue;
        }

        for segment in network.outgoing(entry.node) {
            let next = segment.destination;
            if settled.contains(&next) || !exclusions.allows(segment) {
                continue;
            }
            let Some(weight) = segment.weight(metric) else {
                continue;
            };

            let next_cost = entry.cost + weight;
            if next_cost < *distances.get(&next).unwrap_or(&Minutes::MAX) {
                distances.insert(next, next_cost);
                predecessors.insert(next, segment.key());
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    debug!(
        source,
        %metric,
        settled = settled.len(),
        excluded_locations = exclusions.locations.len(),
        excluded_arcs = exclusions.arcs.len(),
        "search complete"
    );

    Ok(SearchTree {
        source,
        metric,
        distances,
        predecessors,
    })
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: LocationId,
    cost: Minutes,
}

impl QueueEntry {
    fn new(node: LocationId, cost: Minutes) -> Self {
        Self { node, cost }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::DrivingTime;

    fn diamond() -> Network {
        // 1 -(2)- 2 -(2)- 4
        // 1 -(1)- 3 -(5)- 4, walking times reversed in preference
        let mut network = Network::new();
        for (id, name) in [(1, "S"), (2, "Up"), (3, "Down"), (4, "T")] {
            network.add_location(id, name, name, false).unwrap();
        }
        network.add_segment("S", "Up", 2, 9).unwrap();
        network.add_segment("Up", "T", 2, 9).unwrap();
        network.add_segment("S", "Down", 1, 1).unwrap();
        network.add_segment("Down", "T", 5, 1).unwrap();
        network
    }

    #[test]
    fn queue_entry_orders_as_min_heap() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry::new(1, 10));
        heap.push(QueueEntry::new(2, 3));
        heap.push(QueueEntry::new(3, 7));
        assert_eq!(heap.pop().map(|e| e.cost), Some(3));
        assert_eq!(heap.pop().map(|e| e.cost), Some(7));
    }

    #[test]
    fn metric_selects_edge_weight() {
        let network = diamond();
        let driving = shortest_paths(&network, 1, Metric::Driving, &Exclusions::new()).unwrap();
        assert_eq!(driving.distance(4), Some(4));
        assert_eq!(driving.predecessor(4), Some(SegmentKey::new(2, 4)));

        let walking = shortest_paths(&network, 1, Metric::Walking, &Exclusions::new()).unwrap();
        assert_eq!(walking.distance(4), Some(2));
        assert_eq!(walking.predecessor(4), Some(SegmentKey::new(3, 4)));
    }

    #[test]
    fn excluded_location_is_never_reached() {
        let network = diamond();
        let exclusions = Exclusions::new().with_location(2);
        let tree = shortest_paths(&network, 1, Metric::Driving, &exclusions).unwrap();
        assert!(!tree.is_reachable(2));
        assert_eq!(tree.distance(4), Some(6));
    }

    #[test]
    fn single_arc_exclusion_keeps_reverse_direction() {
        let network = diamond();
        let mut exclusions = Exclusions::new();
        exclusions.avoid_arc(SegmentKey::new(2, 4));
        let tree = shortest_paths(&network, 1, Metric::Driving, &exclusions).unwrap();
        assert_eq!(tree.distance(4), Some(6));

        let back = shortest_paths(&network, 4, Metric::Driving, &exclusions).unwrap();
        assert_eq!(back.distance(1), Some(4));
    }

    #[test]
    fn impassable_arcs_are_not_driven() {
        let mut network = Network::new();
        network.add_location(1, "A", "A", false).unwrap();
        network.add_location(2, "B", "B", false).unwrap();
        network
            .add_segment("A", "B", DrivingTime::Impassable, 3)
            .unwrap();

        let driving = shortest_paths(&network, 1, Metric::Driving, &Exclusions::new()).unwrap();
        assert!(!driving.is_reachable(2));
        let walking = shortest_paths(&network, 1, Metric::Walking, &Exclusions::new()).unwrap();
        assert_eq!(walking.distance(2), Some(3));
    }

    #[test]
    fn unknown_source_is_an_error() {
        let network = diamond();
        assert!(shortest_paths(&network, 99, Metric::Driving, &Exclusions::new()).is_err());
    }

    #[test]
    fn reached_is_sorted_by_distance() {
        let network = diamond();
        let tree = shortest_paths(&network, 1, Metric::Driving, &Exclusions::new()).unwrap();
        let order: Vec<_> = tree.reached().into_iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![1, 3, 2, 4]);
    }
}
