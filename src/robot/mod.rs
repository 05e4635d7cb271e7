//! Robot daemon: session supervisor (server side)
//!
//! Binds both TCP listeners and runs the camera stream and control
//! receive sessions as two named threads. The first session to finish -
//! cleanly or with an error - tears the whole teleoperation session down:
//! the running flag is cleared and the surviving session's socket is shut
//! down so its blocked read unblocks. No reconnect; a new session needs a
//! fresh connect on both channels.

pub mod camera;
pub mod controls;
pub mod motors;
pub mod pwm;
pub mod servos;

pub use camera::{CaptureSource, MockCapture};
pub use motors::DriveTrain;
pub use pwm::{MockPwm, PwmDriver, SharedPwm};
pub use servos::PanTilt;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crossbeam_channel::{bounded, RecvTimeoutError};
use parking_lot::Mutex;
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Where a session parks a clone of its accepted stream so the
/// supervisor can shut it down on teardown
pub type StreamRegistry = Arc<Mutex<Option<TcpStream>>>;

/// Build the capture backend named in the config
pub fn create_capture(config: &AppConfig) -> Result<Box<dyn CaptureSource>> {
    match config.hardware.capture.as_str() {
        "mock" => Ok(Box::new(MockCapture::new())),
        other => Err(Error::Other(format!("Unknown capture backend: {other}"))),
    }
}

/// Build the PWM backend named in the config
pub fn create_pwm(config: &AppConfig) -> Result<SharedPwm> {
    match config.hardware.pwm.as_str() {
        "mock" => Ok(pwm::shared(Box::new(MockPwm::new()))),
        other => Err(Error::Other(format!("Unknown PWM backend: {other}"))),
    }
}

/// Run one robot-side teleoperation session on pre-bound listeners
pub fn run(
    camera_listener: TcpListener,
    controls_listener: TcpListener,
    capture: Box<dyn CaptureSource>,
    pwm: SharedPwm,
    running: Arc<AtomicBool>,
) -> Result<()> {
    let drive = DriveTrain::new(Arc::clone(&pwm));
    let head = PanTilt::new(pwm)?;

    let camera_registry: StreamRegistry = Arc::new(Mutex::new(None));
    let controls_registry: StreamRegistry = Arc::new(Mutex::new(None));
    let (done_tx, done_rx) = bounded::<&'static str>(2);

    let camera_thread = {
        let running = Arc::clone(&running);
        let registry = Arc::clone(&camera_registry);
        let done = done_tx.clone();
        std::thread::Builder::new()
            .name("camera-stream".to_string())
            .spawn(move || {
                if let Err(e) = camera::run(camera_listener, capture, running, registry) {
                    log::error!("Camera session error: {}", e);
                }
                let _ = done.send("camera");
            })?
    };

    let controls_thread = {
        let running = Arc::clone(&running);
        let registry = Arc::clone(&controls_registry);
        std::thread::Builder::new()
            .name("controls".to_string())
            .spawn(move || {
                if let Err(e) = controls::run(controls_listener, drive, head, running, registry) {
                    log::error!("Control session error: {}", e);
                }
                let _ = done_tx.send("controls");
            })?
    };

    // Either channel finishing (or a shutdown signal) ends the session.
    loop {
        match done_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(which) => {
                log::info!("{} session finished, tearing down", which);
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                if !running.load(Ordering::Relaxed) {
                    log::info!("Shutdown requested, tearing down");
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    running.store(false, Ordering::Relaxed);
    for registry in [&camera_registry, &controls_registry] {
        if let Some(stream) = registry.lock().take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
    let _ = camera_thread.join();
    let _ = controls_thread.join();

    log::info!("Robot session ended");
    Ok(())
}

/// Accept one client on a listener, polling the running flag
///
/// Returns `None` when shutdown was requested before anyone connected.
pub(crate) fn accept_client(
    listener: &TcpListener,
    running: &Arc<AtomicBool>,
    channel: &str,
) -> Result<Option<TcpStream>> {
    listener.set_nonblocking(true)?;

    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                // Back to blocking mode for the session itself.
                stream.set_nonblocking(false)?;
                log::info!("Accepted {} connection from {}", channel, addr);
                return Ok(Some(stream));
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                if !running.load(Ordering::Relaxed) {
                    return Ok(None);
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(e) => return Err(e.into()),
        }
    }
}
