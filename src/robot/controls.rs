//! Control receive session (robot side)
//!
//! Reads tagged command records off the control socket and applies them:
//! movement axes feed the motor mixer, head angles feed the pan/tilt
//! servos. The robot's [`ControlState`] copy reflects last-received
//! values; the mixer is re-run with the full axis triple on every axis
//! update.
//!
//! There is deliberately no timeout or keepalive on this channel: a
//! half-open peer stalls the session until the supervisor shuts the
//! socket down. An unknown tag is fatal - the stream has no markers to
//! resynchronize on, and motor safety depends on never guessing.

use crate::error::{Error, Result};
use crate::protocol::command::{decode_axis, Command, ControlState};
use crate::robot::motors::DriveTrain;
use crate::robot::servos::{PanTilt, PAN, TILT};
use crate::robot::{accept_client, StreamRegistry};
use std::io::Read;
use std::net::TcpListener;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Accept one console and execute its commands until it disconnects
///
/// Motors are braked on every exit path.
pub fn run(
    listener: TcpListener,
    mut drive: DriveTrain,
    mut head: PanTilt,
    running: Arc<AtomicBool>,
    registry: StreamRegistry,
) -> Result<()> {
    log::info!("Control session awaiting connection");
    let stream = match accept_client(&listener, &running, "controls")? {
        Some(stream) => stream,
        None => return Ok(()),
    };
    registry.lock().replace(stream.try_clone()?);

    let result = receive_loop(stream, &mut drive, &mut head);

    // Whatever ended the session, leave the wheels braked.
    if let Err(e) = drive.stop() {
        log::error!("Failed to stop motors: {}", e);
    }
    result
}

fn receive_loop(mut stream: impl Read, drive: &mut DriveTrain, head: &mut PanTilt) -> Result<()> {
    let mut state = ControlState::new();

    loop {
        let mut tag = [0u8; 1];
        if !read_byte(&mut stream, &mut tag)? {
            log::info!("Control peer disconnected");
            return Ok(());
        }

        let cmd = Command::from_tag(tag[0])?;
        match cmd {
            Command::Move | Command::Strafe | Command::Turn => {
                let mut payload = [0u8; 4];
                stream.read_exact(&mut payload)?;
                state.set(cmd, decode_axis(payload));
                drive.drive(
                    state.get(Command::Move),
                    state.get(Command::Strafe),
                    state.get(Command::Turn),
                )?;
            }
            Command::HeadH | Command::HeadV => {
                let mut payload = [0u8; 1];
                stream.read_exact(&mut payload)?;
                let angle = payload[0];
                state.set(cmd, f32::from(angle));
                let servo = if cmd == Command::HeadH { PAN } else { TILT };
                head.set_angle(servo, angle)?;
            }
        }
        log::trace!("Applied {:?}", cmd);
    }
}

/// Read exactly one byte; `Ok(false)` on orderly close
fn read_byte(stream: &mut impl Read, buf: &mut [u8; 1]) -> Result<bool> {
    loop {
        match stream.read(buf) {
            Ok(0) => return Ok(false),
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
}
