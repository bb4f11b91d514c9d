use serde::Serialize;

use crate::error::Result;
use crate::network::{LocationId, Minutes, Network};
use crate::search::{shortest_paths, Exclusions, Metric, SearchTree};

/// Ordered sequence of locations from a source to a target with its total cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    pub metric: Metric,
    pub steps: Vec<LocationId>,
    pub cost: Minutes,
}

impl Path {
    pub fn source(&self) -> LocationId {
        self.steps[0]
    }

    pub fn target(&self) -> LocationId {
        self.steps[self.steps.len() - 1]
    }

    /// Number of hops in the path.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Locations strictly between the source and the target.
    pub fn interior(&self) -> &[LocationId] {
        if self.steps.len() <= 2 {
            &[]
        } else {
            &self.steps[1..self.steps.len() - 1]
        }
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.steps.contains(&id)
    }

    /// Append `next`, which must start where `self` ends; the shared location
    /// appears once in the result and the costs are summed.
    pub fn join(mut self, next: Path) -> Path {
        debug_assert_eq!(self.target(), next.source());
        self.steps.extend(next.steps.into_iter().skip(1));
        self.cost += next.cost;
        self
    }

    /// Location names along the path; unknown ids render as `<unknown>`.
    pub fn names<'a>(&self, network: &'a Network) -> Vec<&'a str> {
        self.steps
            .iter()
            .map(|id| network.location_name(*id).unwrap_or("<unknown>"))
            .collect()
    }
}

impl SearchTree {
    /// Reconstruct the shortest path to `target`, or `None` when unreachable.
    pub fn path_to(&self, target: LocationId) -> Option<Path> {
        reconstruct_path(self, target)
    }
}

/// Walk predecessor arcs back from `target` to the tree's source.
///
/// Returns `None` when `target` was never reached or the predecessor chain
/// does not lead back to the source.
pub fn reconstruct_path(tree: &SearchTree, target: LocationId) -> Option<Path> {
    let cost = tree.distance(target)?;
    let source = tree.source();

    let mut steps = vec![target];
    let mut current = target;
    while current != source {
        let arc = tree.predecessor(current)?;
        current = arc.origin;
        if steps.contains(&current) {
            return None;
        }
        steps.push(current);
    }
    steps.reverse();

    Some(Path {
        metric: tree.metric(),
        steps,
        cost,
    })
}

/// Run a search from `source` and reconstruct the path to `target`.
pub fn find_path(
    network: &Network,
    source: LocationId,
    target: LocationId,
    metric: Metric,
    exclusions: &Exclusions,
) -> Result<Option<Path>> {
    network.require(target)?;
    let tree = shortest_paths(network, source, metric, exclusions)?;
    Ok(tree.path_to(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Network {
        let mut network = Network::new();
        for (id, name) in [(1, "A"), (2, "B"), (3, "C"), (4, "D")] {
            network.add_location(id, name, name, false).unwrap();
        }
        network.add_segment("A", "B", 3, 7).unwrap();
        network.add_segment("B", "C", 4, 8).unwrap();
        network
    }

    #[test]
    fn path_runs_from_source_to_target() {
        let network = line();
        let path = find_path(&network, 1, 3, Metric::Driving, &Exclusions::new())
            .unwrap()
            .expect("reachable");
        assert_eq!(path.steps, vec![1, 2, 3]);
        assert_eq!(path.cost, 7);
        assert_eq!(path.names(&network), vec!["A", "B", "C"]);
        assert_eq!(path.interior(), &[2]);
        assert_eq!(network.path_cost(&path.steps, Metric::Driving), Some(path.cost));
    }

    #[test]
    fn path_to_source_is_trivial() {
        let network = line();
        let path = find_path(&network, 2, 2, Metric::Walking, &Exclusions::new())
            .unwrap()
            .unwrap();
        assert_eq!(path.steps, vec![2]);
        assert_eq!(path.cost, 0);
        assert_eq!(path.hop_count(), 0);
        assert!(path.interior().is_empty());
    }

    #[test]
    fn disconnected_target_is_unreachable() {
        let network = line();
        let path = find_path(&network, 1, 4, Metric::Driving, &Exclusions::new()).unwrap();
        assert!(path.is_none());
    }

    #[test]
    fn join_drops_shared_location() {
        let network = line();
        let first = find_path(&network, 1, 2, Metric::Driving, &Exclusions::new())
            .unwrap()
            .unwrap();
        let second = find_path(&network, 2, 3, Metric::Driving, &Exclusions::new())
            .unwrap()
            .unwrap();
        let joined = first.join(second);
        assert_eq!(joined.steps, vec![1, 2, 3]);
        assert_eq!(joined.cost, 7);
    }
}
