//! Marker detection seam and per-marker pose estimation.

use std::collections::BTreeMap;

use crate::camera::Frame;
use crate::detect::math::{estimate_marker_pose, Vec3};
use crate::state::CameraConfig;

/// Raw detector output: a marker id and its four image corners in ArUco
/// order (top-left, top-right, bottom-right, bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDetection {
    pub id: i32,
    pub corners: [[f64; 2]; 4],
}

/// Finds fiducial markers in a frame.
pub trait MarkerDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Vec<MarkerDetection>;
}

/// Replays a prepared sequence of detection sets, repeating the last one
/// once the sequence is exhausted. Used by the pipeline tests.
pub struct ScriptedDetector {
    frames: Vec<Vec<MarkerDetection>>,
    next: usize,
}

impl ScriptedDetector {
    pub fn new(frames: Vec<Vec<MarkerDetection>>) -> Self {
        Self { frames, next: 0 }
    }
}

impl MarkerDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &Frame) -> Vec<MarkerDetection> {
        if self.frames.is_empty() {
            return Vec::new();
        }
        let index = self.next.min(self.frames.len() - 1);
        self.next += 1;
        self.frames[index].clone()
    }
}

/// A detected marker with its recovered camera-space pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: i32,
    pub corners: [[f64; 2]; 4],
    pub rvec: Vec3,
    pub tvec: Vec3,
}

pub type MarkerMap = BTreeMap<i32, Marker>;

/// Everything pose estimation needs, pulled out of the camera config.
#[derive(Debug, Clone)]
pub struct DetectorParams {
    pub camera_matrix: [f64; 9],
    pub distortion: [f64; 5],
    pub marker_length: f64,
}

impl DetectorParams {
    /// `None` until a camera matrix has been configured; a missing
    /// distortion matrix is treated as zero distortion.
    pub fn from_camera(config: &CameraConfig) -> Option<Self> {
        let camera_matrix = config.camera_matrix?;
        Some(Self {
            camera_matrix,
            distortion: config.distortion_matrix.unwrap_or([0.0; 5]),
            marker_length: config.marker_length,
        })
    }
}

/// Estimate a pose for every detection. Later detections with a duplicate
/// id overwrite earlier ones.
pub fn estimate_poses(detections: &[MarkerDetection], params: &DetectorParams) -> MarkerMap {
    let mut markers = MarkerMap::new();
    for detection in detections {
        let (rvec, tvec) = estimate_marker_pose(
            &detection.corners,
            params.marker_length,
            &params.camera_matrix,
            &params.distortion,
        );
        markers.insert(
            detection.id,
            Marker {
                id: detection.id,
                corners: detection.corners,
                rvec,
                tvec,
            },
        );
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn params_require_camera_matrix() {
        let mut config = CameraConfig::default();
        assert!(DetectorParams::from_camera(&config).is_none());

        config.camera_matrix = Some([600.0, 0.0, 320.0, 0.0, 600.0, 240.0, 0.0, 0.0, 1.0]);
        config.marker_length = 0.1;
        let params = DetectorParams::from_camera(&config).unwrap();
        assert_eq!(params.distortion, [0.0; 5]);
        assert_eq!(params.marker_length, 0.1);
    }

    #[test]
    fn scripted_detector_repeats_last_frame() {
        let detection = MarkerDetection {
            id: 7,
            corners: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        };
        let mut detector = ScriptedDetector::new(vec![vec![], vec![detection.clone()]]);
        let frame = Frame::blank(4, 4);

        assert!(detector.detect(&frame).is_empty());
        assert_eq!(detector.detect(&frame), vec![detection.clone()]);
        assert_eq!(detector.detect(&frame), vec![detection]);
    }

    #[test]
    fn estimates_a_pose_per_marker() {
        let config = CameraConfig {
            camera_matrix: Some([600.0, 0.0, 320.0, 0.0, 600.0, 240.0, 0.0, 0.0, 1.0]),
            marker_length: 0.1,
            ..CameraConfig::default()
        };
        let params = DetectorParams::from_camera(&config).unwrap();

        // A square marker centered on the optical axis, 30px per half-side:
        // 600 * 0.05 / z = 30 puts it at z = 1.0.
        let detections = vec![MarkerDetection {
            id: 3,
            corners: [
                [290.0, 210.0],
                [350.0, 210.0],
                [350.0, 270.0],
                [290.0, 270.0],
            ],
        }];
        let markers = estimate_poses(&detections, &params);
        let marker = markers.get(&3).unwrap();
        assert_relative_eq!(marker.tvec.z, 1.0, epsilon = 1e-6);
        assert!(marker.tvec.x.abs() < 1e-6);
    }
}
