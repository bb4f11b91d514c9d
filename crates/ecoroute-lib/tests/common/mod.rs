//! Shared fixtures for integration tests.

use std::path::PathBuf;

use ecoroute_lib::{load_network, DatasetPaths, Network};

/// Path to the checked-in fixture directory (Locations.csv / Distances.csv).
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Load the fixture city network.
///
/// Ids: 1 Campanha, 2 Bolhao (P), 3 Aliados, 4 Ribeira (P), 5 Boavista,
/// 6 Foz (P), 7 Paranhos, 8 Leca (isolated). Paranhos-Bolhao is closed to cars.
#[allow(dead_code)]
pub fn fixture_network() -> Network {
    load_network(&DatasetPaths::in_dir(fixtures_dir())).expect("fixture network loads")
}

/// Build a network from `(id, name, parking)` rows and
/// `(from, to, driving, walking)` roads, where driving `None` is impassable.
#[allow(dead_code)]
pub fn build_network(
    locations: &[(i64, &str, bool)],
    roads: &[(&str, &str, Option<u32>, u32)],
) -> Network {
    let mut network = Network::new();
    for (id, name, parking) in locations {
        network
            .add_location(*id, *name, *name, *parking)
            .expect("unique location");
    }
    for (from, to, driving, walking) in roads {
        let driving = match driving {
            Some(minutes) => ecoroute_lib::DrivingTime::Minutes(*minutes),
            None => ecoroute_lib::DrivingTime::Impassable,
        };
        network
            .add_segment(from, to, driving, *walking)
            .expect("unique road");
    }
    network
}
