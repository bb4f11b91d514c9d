//! Bimodal road network: locations joined by paired directional segments.
//!
//! Every road added through [`Network::add_segment`] is stored as two arcs
//! (`a→b` and `b→a`) carrying the same driving and walking times. Keeping
//! both directions lets a search exclude a single traversal direction, while
//! [`Network::find_segment`] is the one place that maps an unordered name pair
//! onto a concrete arc.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::search::Metric;

/// Numeric identifier for a location.
pub type LocationId = i64;

/// Accumulated travel time in minutes.
pub type Minutes = u64;

/// Minimum normalized similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Named point in the network, optionally offering parking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub id: LocationId,
    pub code: String,
    pub name: String,
    pub has_parking: bool,
}

/// Driving time of a segment; roads closed to cars are tagged explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrivingTime {
    Minutes(u32),
    Impassable,
}

impl DrivingTime {
    /// Minutes needed to drive the segment, or `None` when cars cannot use it.
    pub fn minutes(self) -> Option<u32> {
        match self {
            DrivingTime::Minutes(minutes) => Some(minutes),
            DrivingTime::Impassable => None,
        }
    }

    pub fn is_impassable(self) -> bool {
        matches!(self, DrivingTime::Impassable)
    }
}

impl fmt::Display for DrivingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrivingTime::Minutes(minutes) => write!(f, "{minutes}"),
            DrivingTime::Impassable => f.write_str("X"),
        }
    }
}

impl FromStr for DrivingTime {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("x") {
            return Ok(DrivingTime::Impassable);
        }
        value.parse().map(DrivingTime::Minutes)
    }
}

impl From<u32> for DrivingTime {
    fn from(minutes: u32) -> Self {
        DrivingTime::Minutes(minutes)
    }
}

/// Ordered `(origin, destination)` pair naming one directional arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SegmentKey {
    pub origin: LocationId,
    pub destination: LocationId,
}

impl SegmentKey {
    pub fn new(origin: LocationId, destination: LocationId) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// The arc travelling the same road in the opposite direction.
    pub fn reversed(self) -> Self {
        Self::new(self.destination, self.origin)
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.origin, self.destination)
    }
}

/// Directional arc between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub origin: LocationId,
    pub destination: LocationId,
    pub driving: DrivingTime,
    pub walking: u32,
}

impl Segment {
    pub fn key(&self) -> SegmentKey {
        SegmentKey::new(self.origin, self.destination)
    }

    /// Weight of the arc under `metric`; `None` means the arc cannot be used.
    pub fn weight(&self, metric: Metric) -> Option<Minutes> {
        match metric {
            Metric::Driving => self.driving.minutes().map(Minutes::from),
            Metric::Walking => Some(Minutes::from(self.walking)),
        }
    }
}

/// In-memory graph of locations and directional segments.
#[derive(Debug, Clone, Default)]
pub struct Network {
    locations: HashMap<LocationId, Location>,
    order: Vec<LocationId>,
    name_to_id: HashMap<String, LocationId>,
    code_to_id: HashMap<String, LocationId>,
    segments: HashMap<SegmentKey, Segment>,
    adjacency: HashMap<LocationId, Vec<LocationId>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a location. Fails without mutating when the id or name is taken.
    pub fn add_location(
        &mut self,
        id: LocationId,
        code: impl Into<String>,
        name: impl Into<String>,
        has_parking: bool,
    ) -> Result<()> {
        let code = code.into();
        let name = name.into();

        if self.locations.contains_key(&id) {
            return Err(Error::DuplicateLocation { id });
        }
        if self.name_to_id.contains_key(&name) {
            return Err(Error::DuplicateLocationName { name });
        }
        if self.code_to_id.contains_key(&code) {
            return Err(Error::DuplicateLocationCode { code });
        }

        self.name_to_id.insert(name.clone(), id);
        self.code_to_id.insert(code.clone(), id);
        self.order.push(id);
        self.adjacency.insert(id, Vec::new());
        self.locations.insert(
            id,
            Location {
                id,
                code,
                name,
                has_parking,
            },
        );
        Ok(())
    }

    /// Insert a road between two named locations as a pair of directional arcs.
    pub fn add_segment(
        &mut self,
        from: &str,
        to: &str,
        driving: impl Into<DrivingTime>,
        walking: u32,
    ) -> Result<()> {
        let origin = self.id_by_name(from)?;
        let destination = self.id_by_name(to)?;
        self.add_segment_between(origin, destination, driving.into(), walking)
    }

    /// Id-based variant of [`Network::add_segment`].
    pub fn add_segment_between(
        &mut self,
        origin: LocationId,
        destination: LocationId,
        driving: DrivingTime,
        walking: u32,
    ) -> Result<()> {
        let from = self.require(origin)?.name.clone();
        let to = self.require(destination)?.name.clone();

        if origin == destination {
            return Err(Error::SelfLoop { name: from });
        }

        let key = SegmentKey::new(origin, destination);
        if self.segments.contains_key(&key) || self.segments.contains_key(&key.reversed()) {
            return Err(Error::DuplicateSegment { from, to });
        }

        for key in [key, key.reversed()] {
            self.segments.insert(
                key,
                Segment {
                    origin: key.origin,
                    destination: key.destination,
                    driving,
                    walking,
                },
            );
            self.adjacency
                .entry(key.origin)
                .or_default()
                .push(key.destination);
        }
        Ok(())
    }

    /// Remove a location together with every arc that touches it.
    pub fn remove_location(&mut self, id: LocationId) -> Result<Location> {
        let location = self
            .locations
            .remove(&id)
            .ok_or(Error::UnknownLocationId { id })?;

        self.order.retain(|existing| *existing != id);
        self.name_to_id.remove(&location.name);
        self.code_to_id.remove(&location.code);

        let touching: Vec<SegmentKey> = self
            .segments
            .keys()
            .filter(|key| key.origin == id || key.destination == id)
            .copied()
            .collect();
        for key in &touching {
            self.segments.remove(key);
        }
        self.adjacency.remove(&id);
        for targets in self.adjacency.values_mut() {
            targets.retain(|target| *target != id);
        }

        debug!(id, removed_arcs = touching.len(), "removed location");
        Ok(location)
    }

    /// Remove a road between two named locations. Both directional arcs are
    /// removed; the returned segments are in `(from→to, to→from)` order.
    pub fn remove_segment(&mut self, from: &str, to: &str) -> Result<(Segment, Segment)> {
        let origin = self.id_by_name(from)?;
        let destination = self.id_by_name(to)?;
        let key = SegmentKey::new(origin, destination);

        if !self.segments.contains_key(&key) || !self.segments.contains_key(&key.reversed()) {
            return Err(Error::UnknownSegment {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let mut removed = [key, key.reversed()].map(|key| {
            if let Some(targets) = self.adjacency.get_mut(&key.origin) {
                targets.retain(|target| *target != key.destination);
            }
            self.segments.remove(&key)
        });
        match (removed[0].take(), removed[1].take()) {
            (Some(forward), Some(backward)) => Ok((forward, backward)),
            _ => Err(Error::UnknownSegment {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    /// Lookup a location by identifier.
    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    /// Lookup a location by its case-sensitive display name.
    pub fn location_by_name(&self, name: &str) -> Option<&Location> {
        self.name_to_id
            .get(name)
            .and_then(|id| self.locations.get(id))
    }

    /// Lookup a location by its short code.
    pub fn location_by_code(&self, code: &str) -> Option<&Location> {
        self.code_to_id
            .get(code)
            .and_then(|id| self.locations.get(id))
    }

    /// Lookup a location name by identifier.
    pub fn location_name(&self, id: LocationId) -> Option<&str> {
        self.locations.get(&id).map(|location| location.name.as_str())
    }

    /// Resolve a user-supplied reference: numeric id, then name, then code.
    pub fn resolve(&self, query: &str) -> Result<LocationId> {
        let query = query.trim();
        if let Ok(id) = query.parse::<LocationId>() {
            if self.locations.contains_key(&id) {
                return Ok(id);
            }
        }
        if let Some(location) = self
            .location_by_name(query)
            .or_else(|| self.location_by_code(query))
        {
            return Ok(location.id);
        }

        Err(Error::UnknownLocation {
            name: query.to_string(),
            suggestions: self.fuzzy_location_matches(query, 3),
        })
    }

    /// Names (and codes) similar to `query`, best match first.
    pub fn fuzzy_location_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .order
            .iter()
            .filter_map(|id| self.locations.get(id))
            .map(|location| {
                let by_name = strsim::normalized_levenshtein(&needle, &location.name.to_lowercase());
                let by_code = strsim::normalized_levenshtein(&needle, &location.code.to_lowercase());
                (by_name.max(by_code), location.name.as_str())
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Resolve a road by endpoint names in either order.
    ///
    /// The arc stored as `from→to` is preferred; the reverse arc is returned
    /// only when the forward one is missing.
    pub fn find_segment(&self, from: &str, to: &str) -> Option<&Segment> {
        let origin = self.location_by_name(from)?.id;
        let destination = self.location_by_name(to)?.id;
        let key = SegmentKey::new(origin, destination);
        self.segments
            .get(&key)
            .or_else(|| self.segments.get(&key.reversed()))
    }

    /// Strict directional arc lookup.
    pub fn arc(&self, key: SegmentKey) -> Option<&Segment> {
        self.segments.get(&key)
    }

    /// Whether any arc joins the two locations, in either direction.
    pub fn are_adjacent(&self, a: LocationId, b: LocationId) -> bool {
        let key = SegmentKey::new(a, b);
        self.segments.contains_key(&key) || self.segments.contains_key(&key.reversed())
    }

    /// Outgoing arcs of a location in insertion order.
    pub fn outgoing(&self, id: LocationId) -> impl Iterator<Item = &Segment> + '_ {
        self.adjacency
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter_map(move |target| self.segments.get(&SegmentKey::new(id, *target)))
    }

    /// Locations in insertion order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.locations.get(id))
    }

    /// Every directional arc, grouped by origin in insertion order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.order.iter().flat_map(move |id| self.outgoing(*id))
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.locations.contains_key(&id)
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// Number of directional arcs (twice the number of roads).
    pub fn arc_count(&self) -> usize {
        self.segments.len()
    }

    /// Sum of arc weights along `steps` under `metric`; `None` if any hop is
    /// missing or unusable.
    pub fn path_cost(&self, steps: &[LocationId], metric: Metric) -> Option<Minutes> {
        steps.windows(2).try_fold(0, |total: Minutes, pair| {
            let weight = self.arc(SegmentKey::new(pair[0], pair[1]))?.weight(metric)?;
            Some(total + weight)
        })
    }

    pub(crate) fn require(&self, id: LocationId) -> Result<&Location> {
        self.locations
            .get(&id)
            .ok_or(Error::UnknownLocationId { id })
    }

    /// Display label used in error messages: the name when known, else the id.
    pub(crate) fn label(&self, id: LocationId) -> String {
        self.location_name(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    fn id_by_name(&self, name: &str) -> Result<LocationId> {
        self.name_to_id
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownLocation {
                name: name.to_string(),
                suggestions: self.fuzzy_location_matches(name, 3),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Network {
        let mut network = Network::new();
        network.add_location(1, "A", "Alpha", false).unwrap();
        network.add_location(2, "B", "Bravo", true).unwrap();
        network.add_location(3, "C", "Charlie", false).unwrap();
        network.add_segment("Alpha", "Bravo", 4, 10).unwrap();
        network
            .add_segment("Bravo", "Charlie", DrivingTime::Impassable, 6)
            .unwrap();
        network
    }

    #[test]
    fn driving_time_parses_impassable_marker() {
        assert_eq!("X".parse::<DrivingTime>().unwrap(), DrivingTime::Impassable);
        assert_eq!(" 12 ".parse::<DrivingTime>().unwrap(), DrivingTime::Minutes(12));
        assert!("-3".parse::<DrivingTime>().is_err());
    }

    #[test]
    fn duplicate_location_is_rejected_without_mutation() {
        let mut network = triangle();
        let err = network.add_location(1, "Z", "Zulu", false).unwrap_err();
        assert!(matches!(err, Error::DuplicateLocation { id: 1 }));
        assert!(network.location_by_name("Zulu").is_none());
        assert_eq!(network.location_count(), 3);

        let err = network.add_location(9, "Z", "Alpha", false).unwrap_err();
        assert!(matches!(err, Error::DuplicateLocationName { .. }));
        assert!(network.location(9).is_none());

        let err = network.add_location(9, "B", "Bellevue", true).unwrap_err();
        assert!(matches!(err, Error::DuplicateLocationCode { ref code } if code == "B"));
        assert!(network.location(9).is_none());
        assert_eq!(network.location_by_code("B").map(|l| l.id), Some(2));
    }

    #[test]
    fn segment_creates_two_arcs() {
        let network = triangle();
        assert_eq!(network.arc_count(), 4);
        assert!(network.arc(SegmentKey::new(1, 2)).is_some());
        assert!(network.arc(SegmentKey::new(2, 1)).is_some());
        assert!(network.arc(SegmentKey::new(1, 3)).is_none());
    }

    #[test]
    fn duplicate_segment_rejected_in_either_order() {
        let mut network = triangle();
        let err = network.add_segment("Bravo", "Alpha", 1, 1).unwrap_err();
        assert!(matches!(err, Error::DuplicateSegment { .. }));
        assert_eq!(network.arc_count(), 4);
    }

    #[test]
    fn self_loop_rejected() {
        let mut network = triangle();
        assert!(matches!(
            network.add_segment("Alpha", "Alpha", 1, 1),
            Err(Error::SelfLoop { .. })
        ));
    }

    #[test]
    fn find_segment_prefers_argument_order() {
        let network = triangle();
        let forward = network.find_segment("Alpha", "Bravo").unwrap();
        assert_eq!(forward.key(), SegmentKey::new(1, 2));
        let backward = network.find_segment("Bravo", "Alpha").unwrap();
        assert_eq!(backward.key(), SegmentKey::new(2, 1));
    }

    #[test]
    fn remove_location_cascades() {
        let mut network = triangle();
        network.remove_location(2).unwrap();
        assert_eq!(network.arc_count(), 0);
        assert!(network.location_by_name("Bravo").is_none());
        assert!(network.location_by_code("B").is_none());
        assert_eq!(network.outgoing(1).count(), 0);
        assert_eq!(network.locations().count(), 2);
    }

    #[test]
    fn remove_segment_drops_both_directions() {
        let mut network = triangle();
        let (forward, backward) = network.remove_segment("Bravo", "Alpha").unwrap();
        assert_eq!(forward.key(), SegmentKey::new(2, 1));
        assert_eq!(backward.key(), SegmentKey::new(1, 2));
        assert!(network.find_segment("Alpha", "Bravo").is_none());
        assert_eq!(network.outgoing(1).count(), 0);
        assert!(network.remove_segment("Alpha", "Bravo").is_err());
    }

    #[test]
    fn resolve_accepts_id_name_and_code() {
        let network = triangle();
        assert_eq!(network.resolve("2").unwrap(), 2);
        assert_eq!(network.resolve("Charlie").unwrap(), 3);
        assert_eq!(network.resolve("A").unwrap(), 1);

        match network.resolve("Bravoo") {
            Err(Error::UnknownLocation { suggestions, .. }) => {
                assert_eq!(suggestions.first().map(String::as_str), Some("Bravo"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn path_cost_respects_metric() {
        let network = triangle();
        assert_eq!(network.path_cost(&[1, 2, 3], Metric::Walking), Some(16));
        assert_eq!(network.path_cost(&[1, 2, 3], Metric::Driving), None);
        assert_eq!(network.path_cost(&[1, 2], Metric::Driving), Some(4));
        assert_eq!(network.path_cost(&[1, 3], Metric::Walking), None);
        assert_eq!(network.path_cost(&[1], Metric::Walking), Some(0));
    }
}
