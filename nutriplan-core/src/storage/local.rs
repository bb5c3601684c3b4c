//! File-backed key-value cache for the weekly plan.
//!
//! The plan is stored as JSON under the key `weekMeals`, one file per key
//! in the data directory:
//! ```text
//! <DATA_DIR>/
//!   weekMeals.json
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::WeeklyPlan;

/// Storage key of the cached plan.
pub const PLAN_KEY: &str = "weekMeals";

/// Errors that can occur reading or writing the cache.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error for {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse cached plan {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Same-device cache of the plan.
///
/// Reads report failures as errors; the caller decides whether to fall
/// back to an empty plan (see [`LocalPlanStorage::load_or_default`]).
#[derive(Debug, Clone)]
pub struct LocalPlanStorage {
    data_dir: PathBuf,
}

impl LocalPlanStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path of the cached plan.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", PLAN_KEY))
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Reads the cached plan.
    ///
    /// Returns `Ok(None)` if nothing has been cached yet.
    pub fn load(&self) -> Result<Option<WeeklyPlan>, StorageError> {
        let path = self.path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StorageError::Parse { path, source })
    }

    /// Reads the cached plan, falling back to an empty plan if it is
    /// missing or unreadable.
    pub fn load_or_default(&self) -> WeeklyPlan {
        match self.load() {
            Ok(Some(plan)) => plan,
            Ok(None) => WeeklyPlan::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable plan cache: {}", e);
                WeeklyPlan::new()
            }
        }
    }

    /// Writes the full plan, replacing the previous snapshot.
    ///
    /// The snapshot is written to a temporary file and renamed into place
    /// so a crash never leaves a half-written cache.
    pub fn save(&self, plan: &WeeklyPlan) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| StorageError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let path = self.path();
        let json = serde_json::to_vec(plan).map_err(|source| StorageError::Parse {
            path: path.clone(),
            source,
        })?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|source| StorageError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| StorageError::Io { path, source })?;

        Ok(())
    }
}
