//! Durable location registry and auto-location flag.
//!
//! One JSON document per user:
//! `{"locations": [{"city", "lat", "lon"}], "autoLocationEnabled": false}`.
//! Every mutator commits to disk before returning; the in-memory copy only
//! changes once the write has landed.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::{Location, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreState {
    #[serde(default)]
    locations: Vec<Location>,
    #[serde(default)]
    auto_location_enabled: bool,
}

/// File-backed registry.
///
/// Mutators hold `write_lock` across the disk write, so they run one at a time.
/// `state` is only held to copy or swap, so readers never wait on I/O.
#[derive(Debug)]
pub struct LocationStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    state: Mutex<StoreState>,
}

impl LocationStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields the defaults (`[]`, `false`) without touching disk.
    /// A file that does not match the schema is reported as [`StoreError::Corrupt`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = Self::load(&path)?;

        tracing::debug!(
            "Opened location store at {:?} ({} locations)",
            path,
            state.locations.len()
        );

        Ok(Self::with_state(path, state))
    }

    fn with_state(path: PathBuf, state: StoreState) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
            state: Mutex::new(state),
        }
    }

    fn load(path: &Path) -> Result<StoreState, StoreError> {
        if !path.exists() {
            return Ok(StoreState::default());
        }

        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved locations in insertion order
    pub fn list_locations(&self) -> Vec<Location> {
        self.state.lock().locations.clone()
    }

    /// Append without any duplicate check; callers validate first.
    pub fn append_location(&self, location: Location) -> Result<Vec<Location>, StoreError> {
        let _writer = self.write_lock.lock();
        let mut next = self.snapshot();
        next.locations.push(location);
        self.commit(next)
    }

    /// Remove every entry matching `city`. No match leaves the registry untouched.
    pub fn remove_location(&self, city: &str) -> Result<Vec<Location>, StoreError> {
        let _writer = self.write_lock.lock();
        let mut next = self.snapshot();
        if !next.locations.iter().any(|loc| loc.matches_city(city)) {
            return Ok(next.locations);
        }

        next.locations.retain(|loc| !loc.matches_city(city));
        self.commit(next)
    }

    /// Like [`remove_location`](Self::remove_location), but refuses with `Ok(None)`
    /// when the registry holds a single entry or would end up empty.
    ///
    /// The check and the write happen under the writer lock, so two removals
    /// can't both pass it.
    pub fn remove_location_unless_last(
        &self,
        city: &str,
    ) -> Result<Option<Vec<Location>>, StoreError> {
        let _writer = self.write_lock.lock();
        let mut next = self.snapshot();

        let remaining = next
            .locations
            .iter()
            .filter(|loc| !loc.matches_city(city))
            .count();
        if next.locations.len() <= 1 || remaining == 0 {
            return Ok(None);
        }
        if remaining == next.locations.len() {
            return Ok(Some(next.locations));
        }

        next.locations.retain(|loc| !loc.matches_city(city));
        self.commit(next).map(Some)
    }

    pub fn auto_location_enabled(&self) -> bool {
        self.state.lock().auto_location_enabled
    }

    pub fn set_auto_location_enabled(&self, enabled: bool) -> Result<bool, StoreError> {
        let _writer = self.write_lock.lock();
        let mut next = self.snapshot();
        next.auto_location_enabled = enabled;
        self.commit(next)?;
        Ok(enabled)
    }

    fn snapshot(&self) -> StoreState {
        self.state.lock().clone()
    }

    /// Persist `next`, then publish it. Callers hold `write_lock`.
    fn commit(&self, next: StoreState) -> Result<Vec<Location>, StoreError> {
        if let Err(e) = self.write_atomic(&next) {
            tracing::error!("Failed to persist location store at {:?}: {}", self.path, e);
            return Err(e);
        }

        let locations = next.locations.clone();
        *self.state.lock() = next;
        Ok(locations)
    }

    /// Write to a sibling temp file, fsync, then rename over the target.
    fn write_atomic(&self, state: &StoreState) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(state)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        Ok(())
    }
}
