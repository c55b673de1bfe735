//! Frame analysis: marker detection, arena calibration, robot localization.

pub mod arena;
pub mod marker;
pub mod math;
pub mod robot;

pub use arena::ArenaDetector;
pub use marker::{DetectorParams, Marker, MarkerDetection, MarkerDetector, MarkerMap};
pub use robot::{detect_robots, ObservationPacket, RobotObservation};
