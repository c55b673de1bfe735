//! End-to-end exercises of the command surface against shared state.

use std::sync::Arc;

use tempfile::TempDir;

use drishti::command::dispatch;
use drishti::persist::SnapshotStore;
use drishti::state::{CameraKind, TrackerState, VersionedState};

struct Fixture {
    _dir: TempDir,
    store: SnapshotStore,
    state: Arc<VersionedState>,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        Self {
            _dir: dir,
            store,
            state: Arc::new(VersionedState::new()),
        }
    }

    /// Run one command line the way a session would: private copy in,
    /// publish out.
    fn run(&self, line: &str) -> String {
        let tokens: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
        let mut local = self.state.snapshot();
        let response = dispatch(&tokens, &mut local, &self.store);
        self.state.publish(local);
        response
    }

    fn snapshot(&self) -> TrackerState {
        self.state.snapshot()
    }
}

#[test]
fn robot_lifecycle() {
    let fx = Fixture::new();

    assert!(fx.run("set robot alpha 1,2,3,4").contains("alpha added"));
    assert!(fx.run("set robot beta 5,6,7,8").contains("beta added"));

    let listing = fx.run("list robot");
    assert!(listing.contains("alpha: 1,2,3,4"));
    assert!(listing.contains("beta: 5,6,7,8"));

    assert!(fx.run("get robot alpha").contains("1,2,3,4"));
    assert!(fx.run("delete robot alpha").contains("has been removed"));
    assert!(fx.run("get robot alpha").contains("not found"));

    assert_eq!(fx.snapshot().robots.len(), 1);
}

#[test]
fn robot_marker_validation() {
    let fx = Fixture::new();

    assert!(fx.run("set robot alpha 1,2,3").contains("4 marker ids"));
    assert!(fx.run("set robot alpha 1,2,3,4,5").contains("4 marker ids"));
    assert!(fx.run("set robot alpha 1,b,3,4").contains("list of integers"));
    assert!(fx.snapshot().robots.is_empty());
}

#[test]
fn camera_configuration_round_trip() {
    let fx = Fixture::new();

    fx.run("set camera type mock");
    fx.run("set camera source rtsp://overhead");
    fx.run("set camera camera_matrix 600,0,320,0,600,240,0,0,1");
    fx.run("set camera distortion_matrix 0.1,0,0,0,0");
    fx.run("set camera marker_length 0.1");
    fx.run("set camera arena_distance 3.5");
    fx.run("set camera camera_options auto_exposure true");

    let camera = fx.snapshot().camera;
    assert_eq!(camera.kind, Some(CameraKind::Mock));
    assert_eq!(camera.source, "rtsp://overhead");
    assert_eq!(camera.camera_matrix.unwrap()[0], 600.0);
    assert_eq!(camera.distortion_matrix.unwrap()[0], 0.1);
    assert_eq!(camera.marker_length, 0.1);
    assert_eq!(camera.arena_distance, 3.5);
    assert_eq!(camera.options.get("auto_exposure"), Some(&true));
    assert!(!camera.wants_capture());

    fx.run("set camera connected true");
    assert!(fx.snapshot().camera.wants_capture());
}

#[test]
fn camera_matrix_shape_is_enforced() {
    let fx = Fixture::new();

    assert!(fx.run("set camera camera_matrix 1,2,3").contains("9 doubles"));
    assert!(fx
        .run("set camera distortion_matrix 1,2,3,4,5,6")
        .contains("5 doubles"));
    assert!(fx
        .run("set camera camera_matrix 1,2,3,4,x,6,7,8,9")
        .contains("list of doubles"));
    assert!(fx.snapshot().camera.camera_matrix.is_none());
}

#[test]
fn collector_registration() {
    let fx = Fixture::new();

    assert!(fx
        .run("set collector main 192.168.1.10 9000")
        .contains("added with ip"));
    assert!(fx
        .run("set collector bad not-an-ip 9000")
        .contains("valid ipv4 address"));
    assert!(fx
        .run("set collector bad 192.168.1.10 banana")
        .contains("valid port number"));

    let collectors = fx.snapshot().collectors;
    assert_eq!(collectors.len(), 1);
    assert_eq!(
        collectors.get("main"),
        Some(&"192.168.1.10:9000".parse().unwrap())
    );
}

#[test]
fn state_save_load_round_trip() {
    let fx = Fixture::new();

    fx.run("set robot alpha 1,2,3,4");
    fx.run("set collector main 192.168.1.10 9000");
    fx.run("set camera source rtsp://overhead");
    assert!(fx.run("save state qualifiers").contains("saved as"));

    assert!(fx.run("delete state current").contains("has been cleared"));
    let cleared = fx.snapshot();
    assert!(cleared.robots.is_empty());
    assert!(cleared.collectors.is_empty());
    assert!(cleared.camera.source.is_empty());

    assert!(fx
        .run("load state qualifiers")
        .contains("current state loaded"));
    let restored = fx.snapshot();
    assert_eq!(restored.robots.get("alpha"), Some(&[1, 2, 3, 4]));
    assert_eq!(restored.collectors.len(), 1);
    assert_eq!(restored.camera.source, "rtsp://overhead");
}

#[test]
fn snapshot_listing_and_reserved_name() {
    let fx = Fixture::new();

    fx.run("save state one");
    fx.run("save state two");
    let listing = fx.run("list state");
    assert!(listing.starts_with("Saved states:"));
    assert!(listing.contains("one"));
    assert!(listing.contains("two"));

    assert!(fx.run("save state current").contains("cannot be used"));
    assert!(fx.run("load state missing").contains("does not exist"));
}

#[test]
fn unknown_input_is_rejected() {
    let fx = Fixture::new();

    assert!(fx.run("set widget alpha 1").contains("'widget' not found"));
    assert!(fx.run("frobnicate").contains("'frobnicate' not found"));
    assert!(fx.run("set").contains("target system"));
}

#[test]
fn versions_advance_once_per_command() {
    let fx = Fixture::new();

    let start = fx.snapshot().version;
    fx.run("set robot alpha 1,2,3,4");
    fx.run("list robot");
    assert_eq!(fx.snapshot().version, start + 2);
}
