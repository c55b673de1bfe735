//! Arena calibration from the four corner markers.
//!
//! Marker ids 0..=3 are reserved for the arena corners, placed top-left,
//! top-right, bottom-right, bottom-left. Once all four are seen in a single
//! frame the calibration latches: a pixel mask covering the playing field,
//! the arena center, and a world-unit scale derived from the known distance
//! between the top two markers.

use tracing::info;

use crate::camera::Frame;
use crate::detect::marker::MarkerMap;
use crate::detect::math::Vec3;

const TOP_LEFT_ID: i32 = 0;
const TOP_RIGHT_ID: i32 = 1;
const BOTTOM_RIGHT_ID: i32 = 2;
const BOTTOM_LEFT_ID: i32 = 3;

#[derive(Debug, Clone)]
pub struct ArenaCalibration {
    /// Inner corner of each boundary marker, clockwise from top-left.
    pub mask: [[f64; 2]; 4],
    pub center_pixel: [f64; 2],
    /// Arena center in camera translation space (x, y).
    pub center_tvec: (f64, f64),
    /// Multiplier from camera translation units to arena units.
    pub unit: f64,
}

#[derive(Debug, Default)]
pub struct ArenaDetector {
    calibration: Option<ArenaCalibration>,
}

impl ArenaDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    pub fn calibration(&self) -> Option<&ArenaCalibration> {
        self.calibration.as_ref()
    }

    /// Drop the latched calibration so the next complete sighting of the
    /// corner markers recomputes it.
    pub fn reset(&mut self) {
        self.calibration = None;
    }

    /// Attempt calibration from one frame's markers. Returns `true` if a
    /// calibration is latched after the call. Does nothing once calibrated.
    pub fn try_calibrate(&mut self, markers: &MarkerMap, arena_distance: f64) -> bool {
        if self.calibration.is_some() {
            return true;
        }

        let (Some(tl), Some(tr), Some(br), Some(bl)) = (
            markers.get(&TOP_LEFT_ID),
            markers.get(&TOP_RIGHT_ID),
            markers.get(&BOTTOM_RIGHT_ID),
            markers.get(&BOTTOM_LEFT_ID),
        ) else {
            return false;
        };

        let span = tr.tvec.x - tl.tvec.x;
        if span.abs() < f64::EPSILON {
            return false;
        }

        // Each boundary marker contributes the corner facing the arena.
        let mask = [
            tl.corners[2],
            tr.corners[3],
            br.corners[0],
            bl.corners[1],
        ];
        let center_pixel = [
            (tl.corners[2][0] + br.corners[0][0]) / 2.0,
            (tl.corners[2][1] + br.corners[0][1]) / 2.0,
        ];
        let center_tvec = (
            (tl.tvec.x + br.tvec.x) / 2.0,
            (tl.tvec.y + br.tvec.y) / 2.0,
        );
        let unit = arena_distance / span;

        info!(unit, ?center_pixel, "arena calibrated");
        self.calibration = Some(ArenaCalibration {
            mask,
            center_pixel,
            center_tvec,
            unit,
        });
        true
    }

    /// Map a camera-space translation into arena units centered on the
    /// arena. Identity until calibrated.
    pub fn adjust(&self, tvec: &Vec3) -> Vec3 {
        match &self.calibration {
            Some(cal) => Vec3::new(
                (tvec.x - cal.center_tvec.0) * cal.unit,
                (tvec.y - cal.center_tvec.1) * cal.unit,
                tvec.z * cal.unit,
            ),
            None => *tvec,
        }
    }

    /// Black out everything outside the arena quad.
    pub fn apply_mask(&self, frame: &mut Frame) {
        let Some(cal) = &self.calibration else {
            return;
        };

        for row in 0..frame.height {
            let y = row as f64 + 0.5;
            for col in 0..frame.width {
                let x = col as f64 + 0.5;
                if !point_in_quad([x, y], &cal.mask) {
                    frame.pixels[(row * frame.width + col) as usize] = 0;
                }
            }
        }
    }
}

/// Inside test for a convex quad given in consistent winding order.
fn point_in_quad(point: [f64; 2], quad: &[[f64; 2]; 4]) -> bool {
    let mut sign = 0.0f64;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let cross = (b[0] - a[0]) * (point[1] - a[1]) - (b[1] - a[1]) * (point[0] - a[0]);
        if cross.abs() < f64::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}
