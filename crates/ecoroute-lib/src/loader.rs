//! CSV ingestion of location and segment tables.
//!
//! `Locations.csv` carries `Location,Id,Code,Parking`; `Distances.csv`
//! carries `Location1,Location2,Driving,Walking` where the endpoints are
//! location codes and `Driving` may be `X` for roads closed to cars.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::dataset::DatasetPaths;
use crate::error::{Error, Result};
use crate::network::{DrivingTime, LocationId, Network};

#[derive(Debug, Deserialize)]
struct LocationRecord {
    #[serde(rename = "Location")]
    name: String,
    #[serde(rename = "Id")]
    id: i64,
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Parking")]
    parking: u8,
}

#[derive(Debug, Deserialize)]
struct DistanceRecord {
    #[serde(rename = "Location1")]
    from: String,
    #[serde(rename = "Location2")]
    to: String,
    #[serde(rename = "Driving")]
    driving: String,
    #[serde(rename = "Walking")]
    walking: u32,
}

/// Load a network from the two CSV files in `paths`.
pub fn load_network(paths: &DatasetPaths) -> Result<Network> {
    let locations = File::open(&paths.locations).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::DatasetNotFound {
                path: paths.locations.clone(),
            }
        } else {
            Error::Io(err)
        }
    })?;
    let distances = File::open(&paths.distances).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::DatasetNotFound {
                path: paths.distances.clone(),
            }
        } else {
            Error::Io(err)
        }
    })?;

    let mut network = Network::new();
    read_locations(&mut network, locations, &paths.locations)?;
    read_distances(&mut network, distances, &paths.distances)?;

    debug!(
        locations = network.location_count(),
        arcs = network.arc_count(),
        "network loaded from {}",
        paths.locations.display()
    );
    Ok(network)
}

impl Network {
    /// Build a network from in-memory CSV sources (e.g. embedded fixtures).
    pub fn from_csv_readers<L: Read, D: Read>(locations: L, distances: D) -> Result<Self> {
        let mut network = Network::new();
        read_locations(&mut network, locations, Path::new("<locations>"))?;
        read_distances(&mut network, distances, Path::new("<distances>"))?;
        Ok(network)
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new().trim(Trim::All).from_reader(reader)
}

fn invalid(path: &Path, record: u64, source: Error) -> Error {
    warn!(path = %path.display(), record, "rejecting dataset record: {source}");
    Error::InvalidDataset {
        path: PathBuf::from(path),
        record,
        source: Box::new(source),
    }
}

fn read_locations<R: Read>(network: &mut Network, reader: R, path: &Path) -> Result<()> {
    for (index, row) in csv_reader(reader).deserialize::<LocationRecord>().enumerate() {
        let record = index as u64 + 1;
        let row = row.map_err(|err| invalid(path, record, err.into()))?;
        network
            .add_location(row.id, row.code, row.name, row.parking != 0)
            .map_err(|err| invalid(path, record, err))?;
    }
    Ok(())
}

fn read_distances<R: Read>(network: &mut Network, reader: R, path: &Path) -> Result<()> {
    for (index, row) in csv_reader(reader).deserialize::<DistanceRecord>().enumerate() {
        let record = index as u64 + 1;
        let row = row.map_err(|err| invalid(path, record, err.into()))?;

        let origin = resolve_code(network, &row.from).map_err(|err| invalid(path, record, err))?;
        let destination =
            resolve_code(network, &row.to).map_err(|err| invalid(path, record, err))?;
        let driving: DrivingTime = row.driving.parse().map_err(|_| {
            invalid(
                path,
                record,
                Error::InvalidDrivingTime {
                    value: row.driving.clone(),
                },
            )
        })?;

        network
            .add_segment_between(origin, destination, driving, row.walking)
            .map_err(|err| invalid(path, record, err))?;
    }
    Ok(())
}

fn resolve_code(network: &Network, code: &str) -> Result<LocationId> {
    network
        .location_by_code(code)
        .map(|location| location.id)
        .ok_or_else(|| Error::UnknownLocation {
            name: code.to_string(),
            suggestions: network.fuzzy_location_matches(code, 3),
        })
}
