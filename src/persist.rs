//! Persisted configuration snapshots.
//!
//! Snapshots are compact postcard records on disk, one file per saved name.
//! A snapshot covers all three configured systems (robots, collectors,
//! camera) so a load fully restores the server configuration.

use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::{CameraConfig, TrackerState, MARKERS_PER_ROBOT};

/// Reserved snapshot name referring to the live in-memory state.
pub const CURRENT_KEYWORD: &str = "current";

/// On-disk snapshot record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedState {
    robots: BTreeMap<String, [i32; MARKERS_PER_ROBOT]>,
    collectors: BTreeMap<String, SocketAddr>,
    camera: CameraConfig,
}

impl From<&TrackerState> for SavedState {
    fn from(state: &TrackerState) -> Self {
        Self {
            robots: state.robots.clone(),
            collectors: state.collectors.clone(),
            camera: state.camera.clone(),
        }
    }
}

impl SavedState {
    /// Replace the configuration in `state` wholesale. The version counter is
    /// untouched; it belongs to the publish path, not the snapshot.
    pub fn apply(self, state: &mut TrackerState) {
        state.robots = self.robots;
        state.collectors = self.collectors;
        state.camera = self.camera;
    }
}

/// Directory-backed store of named snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Serialize the full configuration under `name`, overwriting any
    /// existing snapshot with that name.
    pub fn save(&self, name: &str, state: &TrackerState) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let record = SavedState::from(state);
        let bytes = postcard::to_allocvec(&record)?;
        fs::write(self.path(name), bytes)?;
        Ok(())
    }

    /// Load the snapshot `name`, or `Ok(None)` if no such snapshot exists.
    pub fn load(&self, name: &str) -> Result<Option<SavedState>> {
        let bytes = match fs::read(self.path(name)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = postcard::from_bytes(&bytes)?;
        Ok(Some(record))
    }

    /// Remove the snapshot `name`. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all stored snapshots, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
