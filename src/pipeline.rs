//! Frame-processing thread.
//!
//! Sleeps until capture is configured, owns the camera for as long as it
//! is, and for every grabbed frame runs detection, arena calibration and
//! robot localization before fanning the result out to collectors. All
//! configuration arrives through the shared versioned state; the thread
//! never blocks a control session.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::camera::{CameraController, Frame};
use crate::detect::marker::estimate_poses;
use crate::detect::{detect_robots, ArenaDetector, DetectorParams, MarkerDetector};
use crate::error::Result;
use crate::output::OutputFanout;
use crate::state::{CalibrationFields, TrackerState, VersionedState};

const GRAB_RETRY: Duration = Duration::from_millis(50);

pub struct PipelineThread {
    state: Arc<VersionedState>,
    local: TrackerState,
    detector: Box<dyn MarkerDetector>,
    arena: ArenaDetector,
    fanout: OutputFanout,
    last_calibration: CalibrationFields,
}

impl PipelineThread {
    pub fn new(state: Arc<VersionedState>, detector: Box<dyn MarkerDetector>) -> Result<Self> {
        Ok(Self {
            state,
            local: TrackerState::default(),
            detector,
            arena: ArenaDetector::new(),
            fanout: OutputFanout::new()?,
            last_calibration: CalibrationFields::default(),
        })
    }

    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("pipeline".to_string())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        loop {
            self.local = self.state.wait_until(|s| s.camera.wants_capture());
            self.last_calibration = self.local.camera.calibration_fields();
            self.fanout.reconcile(&self.local.collectors);
            info!(kind = ?self.local.camera.kind, "capture requested");

            let mut controller = match CameraController::new(&self.local.camera) {
                Ok(controller) => controller,
                Err(err) => {
                    warn!(%err, "camera backend unavailable");
                    self.wait_for_change();
                    continue;
                }
            };
            if let Err(err) = controller.reconcile(&self.local.camera) {
                warn!(%err, "camera connect failed");
                self.wait_for_change();
                continue;
            }

            self.capture_loop(&mut controller);
            controller.disconnect();
            info!("capture stopped");
        }
    }

    /// Block until a configuration newer than the one we last saw is
    /// published. Used after camera errors so the thread retries only once
    /// an operator has changed something.
    fn wait_for_change(&mut self) {
        let seen = self.local.version;
        self.local = self.state.wait_until(move |s| s.version > seen);
    }

    fn capture_loop(&mut self, controller: &mut CameraController) {
        loop {
            if self.state.try_sync(&mut self.local) {
                if !self.absorb_update() {
                    return;
                }
                if let Err(err) = controller.reconcile(&self.local.camera) {
                    warn!(%err, "camera reconcile failed");
                    self.wait_for_change();
                    return;
                }
            }

            match controller.grab() {
                Ok(mut frame) => self.process_frame(&mut frame),
                Err(err) => {
                    warn!(%err, "frame grab failed");
                    thread::sleep(GRAB_RETRY);
                }
            }
        }
    }

    /// Apply a freshly synced configuration. Returns `false` when capture
    /// should stop.
    fn absorb_update(&mut self) -> bool {
        if !self.local.camera.wants_capture() {
            return false;
        }

        let fields = self.local.camera.calibration_fields();
        if fields != self.last_calibration {
            debug!("calibration inputs changed, dropping arena calibration");
            self.arena.reset();
            self.last_calibration = fields;
        }

        self.fanout.reconcile(&self.local.collectors);
        true
    }

    fn process_frame(&mut self, frame: &mut Frame) {
        // No-op until the arena has been calibrated.
        self.arena.apply_mask(frame);

        let detections = self.detector.detect(frame);
        let Some(params) = DetectorParams::from_camera(&self.local.camera) else {
            return;
        };
        let markers = estimate_poses(&detections, &params);

        if !self.arena.calibrated() {
            self.arena
                .try_calibrate(&markers, self.local.camera.arena_distance);
            return;
        }

        let robots = detect_robots(&markers, &self.arena, &self.local.robots);
        if let Err(err) = self.fanout.send(&robots) {
            warn!(%err, "observation fan-out failed");
        }
    }
}
