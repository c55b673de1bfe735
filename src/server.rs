//! TCP control server.
//!
//! Line-oriented protocol: the server prints a `"> "` prompt, reads one
//! command line, applies it against a private copy of the shared state,
//! publishes the result, and writes the response followed by the next
//! prompt. Sessions are independent; last writer wins.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::command;
use crate::error::Result;
use crate::persist::SnapshotStore;
use crate::state::VersionedState;

const PROMPT: &[u8] = b"> ";
const CLEAR_SCREEN: &[u8] = b"\x1b[2J\x1b[H";

pub async fn run_server(
    port: u16,
    state: Arc<VersionedState>,
    store: Arc<SnapshotStore>,
) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "control server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        info!(%peer, "session opened");
        let state = state.clone();
        let store = store.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_session(stream, state, store).await {
                debug!(%peer, %err, "session ended with error");
            }
            info!(%peer, "session closed");
        });
    }
}

async fn handle_session(
    stream: TcpStream,
    state: Arc<VersionedState>,
    store: Arc<SnapshotStore>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(PROMPT).await?;
    writer.flush().await?;

    while let Some(line) = lines.next_line().await? {
        // Telnet-style clients send \r\n; everything after \r is noise.
        let line = line.split('\r').next().unwrap_or(&line).trim();

        match line {
            "" => {}
            "quit" => return Ok(()),
            "clear" => writer.write_all(CLEAR_SCREEN).await?,
            _ => {
                let tokens: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
                let mut local = state.snapshot();
                let response = command::dispatch(&tokens, &mut local, &store);
                state.publish(local);

                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
        }

        writer.write_all(PROMPT).await?;
        writer.flush().await?;
    }

    Ok(())
}
