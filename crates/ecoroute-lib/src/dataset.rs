use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// Default filename of the location table.
pub const LOCATIONS_FILENAME: &str = "Locations.csv";

/// Default filename of the segment table.
pub const DISTANCES_FILENAME: &str = "Distances.csv";

/// Environment variable overriding the dataset directory.
pub const DATA_DIR_ENV: &str = "ECOROUTE_DATA_DIR";

/// Paths to the two CSV files that make up a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub locations: PathBuf,
    pub distances: PathBuf,
}

impl DatasetPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            locations: dir.join(LOCATIONS_FILENAME),
            distances: dir.join(DISTANCES_FILENAME),
        }
    }

    /// Fail with [`Error::DatasetNotFound`] unless both files exist.
    pub fn ensure_exists(self) -> Result<Self> {
        for path in [&self.locations, &self.distances] {
            if !path.is_file() {
                return Err(Error::DatasetNotFound { path: path.clone() });
            }
        }
        Ok(self)
    }
}

/// Resolve the default dataset directory using platform-specific project directories.
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "ecoroute", "ecoroute").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Locate the dataset files.
///
/// The resolution order is:
/// 1. Explicit `target` directory when provided.
/// 2. `ECOROUTE_DATA_DIR` environment variable.
/// 3. Platform-specific project data directory.
///
/// Both `Locations.csv` and `Distances.csv` must exist in the resolved directory.
pub fn resolve_dataset(target: Option<&Path>) -> Result<DatasetPaths> {
    let dir = match target {
        Some(explicit) => explicit.to_path_buf(),
        None => match env::var_os(DATA_DIR_ENV) {
            Some(env_path) => PathBuf::from(env_path),
            None => default_data_dir()?,
        },
    };

    debug!(dir = %dir.display(), "resolved dataset directory");
    DatasetPaths::in_dir(dir).ensure_exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_dir_uses_standard_file_names() {
        let paths = DatasetPaths::in_dir("/data/city");
        assert_eq!(paths.locations, PathBuf::from("/data/city/Locations.csv"));
        assert_eq!(paths.distances, PathBuf::from("/data/city/Distances.csv"));
    }

    #[test]
    fn missing_files_are_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = resolve_dataset(Some(dir.path())).expect_err("no dataset");
        match err {
            Error::DatasetNotFound { path } => assert!(path.ends_with(LOCATIONS_FILENAME)),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
