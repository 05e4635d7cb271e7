//! Control-channel command encoding
//!
//! Each record on the control channel is a 1-byte tag followed by a fixed
//! payload. Movement axes carry a big-endian IEEE-754 float (4 bytes);
//! pan/tilt carry a single clamped servo angle byte. Byte order is a fixed
//! protocol constant on both ends, not negotiated.
//!
//! ```text
//! ┌─────────────┬──────────────────────────────┐
//! │ Tag (1)     │ Payload                      │
//! │ 0x01..0x03  │ f32 big-endian (4 bytes)     │
//! │ 0x04..0x05  │ servo angle 40-140 (1 byte)  │
//! └─────────────┴──────────────────────────────┘
//! ```

use crate::error::{Error, Result};

/// Lowest servo angle accepted on the wire
pub const SERVO_ANGLE_MIN: u8 = 40;

/// Highest servo angle accepted on the wire
pub const SERVO_ANGLE_MAX: u8 = 140;

/// The five control commands, one wire tag each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Forward/backward drive axis
    Move = 0x01,
    /// Lateral strafe axis
    Strafe = 0x02,
    /// In-place rotation axis
    Turn = 0x03,
    /// Camera head pan angle
    HeadH = 0x04,
    /// Camera head tilt angle
    HeadV = 0x05,
}

impl Command {
    /// All commands in tag order
    pub const ALL: [Command; 5] = [
        Command::Move,
        Command::Strafe,
        Command::Turn,
        Command::HeadH,
        Command::HeadV,
    ];

    /// Wire tag byte
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Decode a wire tag
    ///
    /// An unknown tag is a fatal protocol error for the session: the byte
    /// stream has no resynchronization markers, so nothing after it can be
    /// trusted.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0x01 => Ok(Command::Move),
            0x02 => Ok(Command::Strafe),
            0x03 => Ok(Command::Turn),
            0x04 => Ok(Command::HeadH),
            0x05 => Ok(Command::HeadV),
            other => Err(Error::UnknownCommand(other)),
        }
    }

    /// Payload size in bytes for this command
    pub fn payload_len(self) -> usize {
        match self {
            Command::Move | Command::Strafe | Command::Turn => 4,
            Command::HeadH | Command::HeadV => 1,
        }
    }

    /// Lowercase name for status output
    pub fn label(self) -> &'static str {
        match self {
            Command::Move => "move",
            Command::Strafe => "strafe",
            Command::Turn => "turn",
            Command::HeadH => "head_h",
            Command::HeadV => "head_v",
        }
    }

    fn index(self) -> usize {
        self.tag() as usize - 1
    }
}

/// Map a normalized head input onto the servo angle domain
///
/// `round((value + 0.5) * 180)` clamped to [40, 140]: inputs around
/// [-0.5, +0.5] cover the usable range, anything outside saturates. NaN
/// folds to the 90 degree center; an angle byte below the mechanical
/// floor must never reach the wire.
pub fn clamp_angle(value: f32) -> u8 {
    if value.is_nan() {
        return 90;
    }
    let scaled = ((value + 0.5) * 180.0).round();
    scaled.clamp(f32::from(SERVO_ANGLE_MIN), f32::from(SERVO_ANGLE_MAX)) as u8
}

/// Append one encoded record (tag + payload) to `buf`
pub fn encode_into(buf: &mut Vec<u8>, cmd: Command, value: f32) {
    buf.push(cmd.tag());
    match cmd {
        Command::Move | Command::Strafe | Command::Turn => {
            buf.extend_from_slice(&value.to_be_bytes());
        }
        Command::HeadH | Command::HeadV => {
            buf.push(clamp_angle(value));
        }
    }
}

/// Decode an axis payload (Move/Strafe/Turn)
pub fn decode_axis(payload: [u8; 4]) -> f32 {
    f32::from_be_bytes(payload)
}

/// Full mapping from [`Command`] to its current value
///
/// Always fully populated (default 0.0), one entry per command. Each side
/// of the connection owns its own copy: the console's reflects merged
/// provider input, the robot's reflects last-received commands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlState {
    values: [f32; 5],
}

impl ControlState {
    /// Fresh state with every command at 0.0
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value for a command
    pub fn get(&self, cmd: Command) -> f32 {
        self.values[cmd.index()]
    }

    /// Set the value for a command
    pub fn set(&mut self, cmd: Command, value: f32) {
        self.values[cmd.index()] = value;
    }

    /// Iterate all five entries in tag order
    pub fn iter(&self) -> impl Iterator<Item = (Command, f32)> + '_ {
        Command::ALL.iter().map(|&cmd| (cmd, self.get(cmd)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_round_trip_exact_bits() {
        for f in [0.0f32, -0.0, 1.0, -1.0, 0.125, f32::MIN_POSITIVE, 1e30, -3.75] {
            let mut buf = Vec::new();
            encode_into(&mut buf, Command::Move, f);
            assert_eq!(buf.len(), 5);
            assert_eq!(buf[0], 0x01);
            let decoded = decode_axis([buf[1], buf[2], buf[3], buf[4]]);
            assert_eq!(decoded.to_bits(), f.to_bits());
        }
    }

    #[test]
    fn test_clamp_angle() {
        assert_eq!(clamp_angle(-10.0), 40);
        assert_eq!(clamp_angle(10.0), 140);
        assert_eq!(clamp_angle(0.0), 90);
        assert_eq!(clamp_angle(0.25), 135);
        assert_eq!(clamp_angle(-0.5), 40);
        assert_eq!(clamp_angle(0.5), 140);
    }

    #[test]
    fn test_clamp_angle_non_finite() {
        // NaN must not escape the [40, 140] domain (a raw cast would
        // saturate it to 0, below the servo's mechanical floor).
        assert_eq!(clamp_angle(f32::NAN), 90);
        assert_eq!(clamp_angle(f32::INFINITY), 140);
        assert_eq!(clamp_angle(f32::NEG_INFINITY), 40);
    }

    #[test]
    fn test_head_encoding() {
        let mut buf = Vec::new();
        encode_into(&mut buf, Command::HeadH, 0.25);
        assert_eq!(buf, vec![0x04, 135]);

        buf.clear();
        encode_into(&mut buf, Command::HeadV, 0.0);
        assert_eq!(buf, vec![0x05, 90]);
    }

    #[test]
    fn test_unknown_tag_is_error() {
        assert!(matches!(
            Command::from_tag(0x00),
            Err(Error::UnknownCommand(0x00))
        ));
        assert!(matches!(
            Command::from_tag(0x06),
            Err(Error::UnknownCommand(0x06))
        ));
        for tag in 1..=5u8 {
            assert_eq!(Command::from_tag(tag).unwrap().tag(), tag);
        }
    }

    #[test]
    fn test_control_state_fully_populated() {
        let state = ControlState::new();
        assert_eq!(state.iter().count(), 5);
        for (_, value) in state.iter() {
            assert_eq!(value, 0.0);
        }
    }

    #[test]
    fn test_control_state_set_get() {
        let mut state = ControlState::new();
        state.set(Command::Turn, -0.5);
        assert_eq!(state.get(Command::Turn), -0.5);
        assert_eq!(state.get(Command::Move), 0.0);
    }
}
