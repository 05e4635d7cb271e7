//! Camera stream session (robot side)
//!
//! Pulls complete encoded frames from a [`CaptureSource`] and writes them
//! length-prefixed onto the accepted camera socket. Physical capture and
//! JPEG encoding live behind the trait; the core only ever asks for "the
//! next complete frame".

use crate::error::Result;
use crate::protocol::framing::FrameWriter;
use crate::robot::accept_client;
use crate::robot::StreamRegistry;
use rand::Rng;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Frame producer boundary
pub trait CaptureSource: Send {
    /// Block until the next complete encoded frame is available
    fn next_frame(&mut self) -> Result<Vec<u8>>;
}

/// Synthetic capture source for hardware-free operation
///
/// Produces a small deterministic header followed by noise payload, paced
/// at roughly camera rate. Stands in for the real MJPEG pipeline during
/// development and tests.
pub struct MockCapture {
    frame_index: u64,
    payload_len: usize,
    interval: Duration,
}

impl MockCapture {
    pub fn new() -> Self {
        Self {
            frame_index: 0,
            payload_len: 4096,
            interval: Duration::from_millis(33),
        }
    }
}

impl Default for MockCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for MockCapture {
    fn next_frame(&mut self) -> Result<Vec<u8>> {
        std::thread::sleep(self.interval);

        let mut frame = Vec::with_capacity(8 + self.payload_len);
        frame.extend_from_slice(&self.frame_index.to_be_bytes());
        let mut rng = rand::thread_rng();
        frame.extend((0..self.payload_len).map(|_| rng.gen::<u8>()));

        self.frame_index += 1;
        Ok(frame)
    }
}

/// Accept one console and stream frames until the peer goes away or the
/// session shuts down
pub fn run(
    listener: TcpListener,
    mut capture: Box<dyn CaptureSource>,
    running: Arc<AtomicBool>,
    registry: StreamRegistry,
) -> Result<()> {
    log::info!("Camera session awaiting connection");
    let stream = match accept_client(&listener, &running, "camera")? {
        Some(stream) => stream,
        None => return Ok(()),
    };
    registry.lock().replace(stream.try_clone()?);

    let mut writer = FrameWriter::new(stream);
    let mut sent = 0u64;

    while running.load(Ordering::Relaxed) {
        let frame = capture.next_frame()?;
        if let Err(e) = writer.send_frame(&frame) {
            if peer_went_away(&e) {
                log::info!("Camera peer disconnected");
                break;
            }
            return Err(e);
        }
        sent += 1;
        if sent % 100 == 0 {
            log::debug!("Streamed {} frames", sent);
        }
    }

    log::info!("Camera session ended ({} frames sent)", sent);
    Ok(())
}

fn peer_went_away(e: &crate::error::Error) -> bool {
    matches!(
        e,
        crate::error::Error::Io(io_err) if matches!(
            io_err.kind(),
            std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::UnexpectedEof
        )
    )
}
