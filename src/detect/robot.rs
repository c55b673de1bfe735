//! Robot localization from marker poses.
//!
//! Each registered robot carries four markers; the first id in its list is
//! the lead marker whose pose defines the robot's position and heading.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::detect::arena::ArenaDetector;
use crate::detect::marker::MarkerMap;
use crate::detect::math::{euler_angles, rodrigues, Vec3};

/// One robot's pose for a single frame, in arena units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotObservation {
    pub name: String,
    pub position: Vec3,
    pub heading_deg: f64,
}

/// UDP payload: a sequence number and every robot seen in the frame.
#[derive(Debug, Serialize)]
pub struct ObservationPacket<'a> {
    #[serde(rename = "messageNum")]
    pub sequence: u64,
    #[serde(rename = "data")]
    pub robots: &'a [RobotObservation],
}

/// Locate every registered robot whose lead marker was seen this frame.
pub fn detect_robots(
    markers: &MarkerMap,
    arena: &ArenaDetector,
    robots: &BTreeMap<String, [i32; 4]>,
) -> Vec<RobotObservation> {
    let mut observations = Vec::new();
    for (name, ids) in robots {
        let Some(marker) = markers.get(&ids[0]) else {
            continue;
        };

        let rotation = rodrigues(&marker.rvec);
        let heading_deg = euler_angles(&rotation).y.to_degrees();
        observations.push(RobotObservation {
            name: name.clone(),
            position: arena.adjust(&marker.tvec),
            heading_deg,
        });
    }
    observations
}
