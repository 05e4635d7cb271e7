//! Operator console: session supervisor (client side)
//!
//! Connects both TCP channels, then runs them concurrently:
//!
//! - a named camera thread reads frames off the camera socket and fans
//!   them out to every provider's draw capability, in list order;
//! - the calling thread runs the composer tick loop and transmits control
//!   diffs.
//!
//! Provider calls are serialized under one lock (sequential within a tick,
//! parallel only to the socket read itself). Either side ending - camera
//! EOF, a provider requesting termination, a fatal I/O error, or SIGINT -
//! tears the whole session down: the running flag is cleared and both
//! sockets are shut down so the blocked reader unblocks. Providers are
//! released on every exit path. No reconnect; a new session needs a fresh
//! connect.

pub mod session;

pub use session::ControlSession;

use crate::error::{Error, Result};
use crate::protocol::command::ControlState;
use crate::protocol::framing::FrameReader;
use crate::provider::{ProviderComposer, TerminalProvider};
use parking_lot::Mutex;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Probe and acquire every available provider, in priority order
/// (later registrations win state merges)
///
/// Unavailable backends are skipped silently; acquisition failures are
/// logged and the backend dropped. Display/VR backends plug in here the
/// same way once built against the [`crate::provider::Provider`] contract.
pub fn default_providers(shutdown: Arc<AtomicBool>) -> ProviderComposer {
    let mut composer = ProviderComposer::new();

    if TerminalProvider::available() {
        match TerminalProvider::acquire(shutdown) {
            Ok(provider) => composer.register(Box::new(provider)),
            Err(e) => log::warn!("Failed to acquire terminal provider: {}", e),
        }
    }

    composer
}

/// Run one console session against a robot at `address`
pub fn run(
    address: &str,
    camera_port: u16,
    controls_port: u16,
    composer: ProviderComposer,
    running: Arc<AtomicBool>,
) -> Result<()> {
    if composer.is_empty() {
        log::error!("No available providers found");
        return Err(Error::NoProviders);
    }
    log::info!("{} provider(s) active", composer.len());

    log::info!("Connecting to {}:{} (camera)", address, camera_port);
    let camera = TcpStream::connect((address, camera_port))?;
    log::info!("Connecting to {}:{} (controls)", address, controls_port);
    let controls = TcpStream::connect((address, controls_port))?;

    let providers = Arc::new(Mutex::new(composer));
    let camera_thread = spawn_camera_thread(
        camera.try_clone()?,
        Arc::clone(&providers),
        Arc::clone(&running),
    )?;

    let mut session = ControlSession::new(controls.try_clone()?);
    let result = control_loop(&providers, &mut session, &running);

    // Teardown: either channel ending ends the whole session. Shutting the
    // sockets down unblocks the camera thread's pending read.
    running.store(false, Ordering::Relaxed);
    let _ = camera.shutdown(Shutdown::Both);
    let _ = controls.shutdown(Shutdown::Both);
    let _ = camera_thread.join();

    log::info!("Console session ended");
    result
}

fn spawn_camera_thread(
    stream: TcpStream,
    providers: Arc<Mutex<ProviderComposer>>,
    running: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("camera-stream".to_string())
        .spawn(move || {
            let mut reader = FrameReader::new(stream);
            loop {
                match reader.recv_frame() {
                    Ok(Some(frame)) => providers.lock().draw_all(&frame),
                    Ok(None) => {
                        log::info!("Camera stream closed by peer");
                        break;
                    }
                    Err(e) => {
                        // Expected when teardown shut the socket under us
                        if running.load(Ordering::Relaxed) {
                            log::error!("Camera stream error: {}", e);
                        }
                        break;
                    }
                }
            }
            running.store(false, Ordering::Relaxed);
        })?;
    Ok(handle)
}

fn control_loop(
    providers: &Arc<Mutex<ProviderComposer>>,
    session: &mut ControlSession<TcpStream>,
    running: &Arc<AtomicBool>,
) -> Result<()> {
    let mut state = ControlState::new();

    while running.load(Ordering::Relaxed) {
        if !providers.lock().tick(&mut state) {
            break;
        }
        session.send_changed(&state)?;
    }

    Ok(())
}
