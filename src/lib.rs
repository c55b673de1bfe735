//! Overhead robot tracking service.
//!
//! A ceiling camera watches an arena fitted with fiducial markers. Operators
//! configure robots, collectors and the camera over a TCP line protocol; a
//! background pipeline grabs frames, localizes robots against a calibrated
//! arena and streams observations to collectors over UDP.

pub mod camera;
pub mod command;
pub mod detect;
pub mod error;
pub mod output;
pub mod persist;
pub mod pipeline;
pub mod server;
pub mod state;

pub use error::{Error, Result};
