use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use drishti::camera::Frame;
use drishti::detect::{MarkerDetection, MarkerDetector};
use drishti::persist::SnapshotStore;
use drishti::pipeline::PipelineThread;
use drishti::server::run_server;
use drishti::state::VersionedState;

/// Overhead robot tracking service.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TCP port for the control protocol.
    port: u16,

    /// Directory holding saved state snapshots.
    #[arg(long, default_value = "states")]
    states_dir: PathBuf,
}

/// Placeholder detector until a fiducial decoding backend is linked in.
/// Pose math downstream of it is fully functional.
struct NullDetector;

impl MarkerDetector for NullDetector {
    fn detect(&mut self, _frame: &Frame) -> Vec<MarkerDetection> {
        Vec::new()
    }
}

fn main() -> drishti::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!(port = args.port, states_dir = %args.states_dir.display(), "starting tracker");

    let state = Arc::new(VersionedState::new());
    let store = Arc::new(SnapshotStore::new(&args.states_dir));

    PipelineThread::new(state.clone(), Box::new(NullDetector))?.spawn()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_server(args.port, state, store))
}
