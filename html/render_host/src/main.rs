mod config;
mod error;
mod protocol;
mod session;

use std::process;
use std::sync::mpsc;
use std::thread;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::HostConfig;
use crate::error::HostError;
use crate::protocol::{reader_loop, ready_envelope, writer_loop};
use crate::session::HostSession;

fn main() {
    init_logging();

    if let Err(err) = run(HostConfig::from_env()) {
        error!("render_host fatal error: {err}");
        process::exit(1);
    }
}

/// Logs go to stderr; stdout carries the frames.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(config: HostConfig) -> Result<(), HostError> {
    info!(sid = %config.sid, frame_cap = config.frame_cap, "render host starting");

    let (tx, rx) = mpsc::channel();
    let writer_handle = thread::spawn(move || writer_loop(rx));

    tx.send(ready_envelope(config.sid.clone()))
        .map_err(|_| HostError::QueueClosed)?;

    let mut session = HostSession::new(config.sid);
    let mut queue_closed = false;
    let read_result = reader_loop(config.frame_cap, |decoded| {
        if queue_closed {
            return;
        }
        let reply = match decoded {
            Ok(envelope) => session.handle(envelope),
            Err(err) => Some(session.decode_error(&err)),
        };
        if let Some(reply) = reply {
            queue_closed = tx.send(reply).is_err();
        }
    });

    drop(tx);
    let write_result = writer_handle
        .join()
        .map_err(|_| HostError::ThreadPanicked("writer"))?;

    write_result?;
    read_result?;
    if queue_closed {
        return Err(HostError::QueueClosed);
    }

    info!("peer closed the stream");
    Ok(())
}
