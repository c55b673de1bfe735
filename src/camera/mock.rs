//! Hardware-free camera used in tests and bench setups.

use crate::camera::{CameraBackend, Frame};
use crate::error::{Error, Result};
use crate::state::CameraKind;

const MOCK_WIDTH: u32 = 640;
const MOCK_HEIGHT: u32 = 480;

/// Produces blank frames at a fixed size without touching any device.
pub struct MockCamera {
    source: String,
    connected: bool,
}

impl MockCamera {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            connected: false,
        }
    }
}

impl CameraBackend for MockCamera {
    fn kind(&self) -> CameraKind {
        CameraKind::Mock
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
    }

    fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn grab(&mut self) -> Result<Frame> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        Ok(Frame::blank(MOCK_WIDTH, MOCK_HEIGHT))
    }
}
