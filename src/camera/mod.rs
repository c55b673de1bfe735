//! Camera backends and the controller that keeps one in sync with config.
//!
//! Backends hide the capture stack behind a small trait so the pipeline and
//! the tests never care which SDK is wired in. The controller owns the
//! connection lifecycle and reconciles it against whatever the operators
//! last configured.

mod mock;

pub use mock::MockCamera;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::state::{CameraConfig, CameraKind};

/// A single grayscale frame, row-major, one byte per pixel.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
        }
    }
}

/// One concrete capture stack. Implementations own their device handle and
/// must tolerate connect/disconnect being called in any order.
pub trait CameraBackend: Send {
    fn kind(&self) -> CameraKind;
    fn source(&self) -> &str;
    fn set_source(&mut self, source: &str);
    fn connect(&mut self) -> Result<()>;
    fn disconnect(&mut self);
    fn grab(&mut self) -> Result<Frame>;
}

/// Build a backend for the configured camera type.
pub fn create_backend(config: &CameraConfig) -> Result<Box<dyn CameraBackend>> {
    match config.kind {
        Some(CameraKind::Mock) => Ok(Box::new(MockCamera::new(&config.source))),
        Some(CameraKind::OpenCv) => Err(Error::BackendUnavailable("opencv")),
        Some(CameraKind::Spinnaker) => Err(Error::BackendUnavailable("spinnaker")),
        None => Err(Error::NoBackend),
    }
}

/// Owns the live backend and drives it toward the configured state.
///
/// `reconcile` is the only mutation path: each call compares the configured
/// type, source and connection flag against what is actually held and applies
/// the minimal set of transitions. Calling it again with an unchanged config
/// is a no-op.
pub struct CameraController {
    backend: Box<dyn CameraBackend>,
    connected: bool,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Result<Self> {
        Ok(Self {
            backend: create_backend(config)?,
            connected: false,
        })
    }

    /// Test seam: wrap an already-built backend.
    pub fn with_backend(backend: Box<dyn CameraBackend>) -> Self {
        Self {
            backend,
            connected: false,
        }
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn reconcile(&mut self, config: &CameraConfig) -> Result<()> {
        if config.kind != Some(self.backend.kind()) {
            if self.connected {
                self.backend.disconnect();
                self.connected = false;
            }
            info!(kind = ?config.kind, "switching camera backend");
            self.backend = create_backend(config)?;
        }

        if self.backend.source() != config.source {
            let was_connected = self.connected;
            if was_connected {
                self.backend.disconnect();
                self.connected = false;
            }
            self.backend.set_source(&config.source);
            if was_connected && config.connected {
                self.backend.connect()?;
                self.connected = true;
            }
        }

        if config.connected && !self.connected {
            info!(source = %config.source, "connecting camera");
            self.backend.connect()?;
            self.connected = true;
        } else if !config.connected && self.connected {
            debug!("disconnecting camera");
            self.backend.disconnect();
            self.connected = false;
        }

        Ok(())
    }

    pub fn disconnect(&mut self) {
        if self.connected {
            self.backend.disconnect();
            self.connected = false;
        }
    }

    pub fn grab(&mut self) -> Result<Frame> {
        self.backend.grab()
    }
}
