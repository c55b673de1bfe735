//! Shared configuration state for the multi-threaded architecture.
//!
//! All cross-thread communication goes through [`VersionedState`]: command
//! sessions mutate a private copy and publish it back, the pipeline thread
//! pulls newer copies with [`VersionedState::try_sync`] and blocks on
//! [`VersionedState::wait_until`] while the camera is unconfigured. No other
//! shared mutable state exists between the session tasks and the pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

/// Number of marker ids bound to one robot (corner roles TL, TR, BR, BL).
pub const MARKERS_PER_ROBOT: usize = 4;

/// Camera backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraKind {
    OpenCv,
    Spinnaker,
    Mock,
}

impl CameraKind {
    pub const ALL: [CameraKind; 3] = [CameraKind::OpenCv, CameraKind::Spinnaker, CameraKind::Mock];

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraKind::OpenCv => "opencv",
            CameraKind::Spinnaker => "spinnaker",
            CameraKind::Mock => "mock",
        }
    }
}

impl fmt::Display for CameraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s {
            "opencv" => Ok(CameraKind::OpenCv),
            "spinnaker" => Ok(CameraKind::Spinnaker),
            "mock" => Ok(CameraKind::Mock),
            _ => Err(()),
        }
    }
}

/// Camera system configuration.
///
/// `kind` is immutable once a controller is bound to it; the pipeline rebuilds
/// the controller when it changes instead of mutating in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraConfig {
    pub kind: Option<CameraKind>,
    /// Connection source (device index, URL, ...), interpreted by the backend
    pub source: String,
    /// Whether the camera should currently hold a connection
    pub connected: bool,
    /// 3x3 intrinsic matrix, row-major
    pub camera_matrix: Option<[f64; 9]>,
    /// 1x5 distortion coefficients (k1, k2, p1, p2, k3)
    pub distortion_matrix: Option<[f64; 5]>,
    /// Predefined marker dictionary id for the external detector
    pub marker_dictionary: i32,
    /// Backend-specific boolean options
    pub options: BTreeMap<String, bool>,
    /// Physical side length of one marker
    pub marker_length: f64,
    /// Physical distance between two adjacent arena boundary markers
    pub arena_distance: f64,
}

impl CameraConfig {
    /// Whether the pipeline should be capturing frames with this configuration.
    pub fn wants_capture(&self) -> bool {
        self.kind.is_some() && self.connected
    }

    /// The subset of fields that feed arena calibration. When any of these
    /// change, a cached calibration is stale and must be recomputed.
    pub fn calibration_fields(&self) -> CalibrationFields {
        CalibrationFields {
            camera_matrix: self.camera_matrix,
            distortion_matrix: self.distortion_matrix,
            marker_dictionary: self.marker_dictionary,
            marker_length: self.marker_length,
            arena_distance: self.arena_distance,
        }
    }
}

/// Snapshot of the calibration-relevant camera fields, used by the pipeline
/// to detect when the cached arena calibration must be invalidated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalibrationFields {
    pub camera_matrix: Option<[f64; 9]>,
    pub distortion_matrix: Option<[f64; 5]>,
    pub marker_dictionary: i32,
    pub marker_length: f64,
    pub arena_distance: f64,
}

/// Full configuration state shared between the command sessions and the
/// pipeline thread.
///
/// `version` strictly increases on every successful publish; readers compare
/// against their last-seen version to decide whether to re-synchronize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerState {
    /// Robot name -> 4 marker ids (lead marker first)
    pub robots: BTreeMap<String, [i32; MARKERS_PER_ROBOT]>,
    /// Collector name -> UDP endpoint receiving robot observations
    pub collectors: BTreeMap<String, SocketAddr>,
    pub camera: CameraConfig,
    pub version: u64,
}

impl TrackerState {
    /// Reset everything except the version counter to defaults.
    pub fn clear(&mut self) {
        self.robots.clear();
        self.collectors.clear();
        self.camera = CameraConfig::default();
    }
}

/// The single authoritative, versioned configuration object.
///
/// The internal mutex protects only the copy-in/copy-out operations; callers
/// never hold it across camera or network I/O.
pub struct VersionedState {
    inner: Mutex<TrackerState>,
    published: Condvar,
}

impl VersionedState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TrackerState::default()),
            published: Condvar::new(),
        }
    }

    /// Replace the authoritative state unconditionally. The incoming version
    /// is ignored; a fresh, strictly larger one is assigned. Wakes all
    /// blocked [`VersionedState::wait_until`] callers.
    pub fn publish(&self, mut state: TrackerState) {
        let mut inner = self.inner.lock();
        state.version = inner.version + 1;
        *inner = state;
        self.published.notify_all();
    }

    /// Copy the authoritative state into `local` only if it is newer.
    /// Returns whether a copy occurred.
    pub fn try_sync(&self, local: &mut TrackerState) -> bool {
        let inner = self.inner.lock();
        if inner.version > local.version {
            *local = inner.clone();
            true
        } else {
            false
        }
    }

    /// Immediate full copy for read-only use.
    pub fn snapshot(&self) -> TrackerState {
        self.inner.lock().clone()
    }

    /// Block until `pred` holds for the authoritative state, re-checking on
    /// every publish. Returns the satisfying copy.
    pub fn wait_until<F>(&self, pred: F) -> TrackerState
    where
        F: Fn(&TrackerState) -> bool,
    {
        let mut inner = self.inner.lock();
        while !pred(&inner) {
            self.published.wait(&mut inner);
        }
        inner.clone()
    }
}

impl Default for VersionedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn publish_assigns_strictly_increasing_versions() {
        let state = VersionedState::new();
        let mut last = state.snapshot().version;

        for _ in 0..5 {
            let mut copy = state.snapshot();
            // Published version numbers are ignored, even stale ones
            copy.version = 0;
            state.publish(copy);
            let now = state.snapshot().version;
            assert!(now > last);
            last = now;
        }
    }

    #[test]
    fn try_sync_copies_only_newer_state() {
        let state = VersionedState::new();
        let mut local = TrackerState::default();

        let mut copy = state.snapshot();
        copy.robots.insert("r1".into(), [1, 2, 3, 4]);
        state.publish(copy);

        assert!(state.try_sync(&mut local));
        assert_eq!(local.robots.get("r1"), Some(&[1, 2, 3, 4]));

        // No intervening publish: the second sync performs no copy
        assert!(!state.try_sync(&mut local));
    }

    #[test]
    fn wait_until_wakes_on_publish() {
        let state = Arc::new(VersionedState::new());

        let waiter = {
            let state = Arc::clone(&state);
            std::thread::spawn(move || state.wait_until(|s| s.camera.wants_capture()))
        };

        // Give the waiter a chance to block, then publish irrelevant and
        // relevant updates
        std::thread::sleep(Duration::from_millis(20));
        let mut copy = state.snapshot();
        copy.robots.insert("r1".into(), [1, 2, 3, 4]);
        state.publish(copy);

        let mut copy = state.snapshot();
        copy.camera.kind = Some(CameraKind::Mock);
        copy.camera.connected = true;
        state.publish(copy);

        let seen = waiter.join().expect("waiter thread panicked");
        assert!(seen.camera.wants_capture());
        assert_eq!(seen.robots.len(), 1);
    }

    #[test]
    fn camera_kind_parses_by_name() {
        for kind in CameraKind::ALL {
            assert_eq!(kind.as_str().parse::<CameraKind>(), Ok(kind));
        }
        assert!("webcam".parse::<CameraKind>().is_err());
    }
}
