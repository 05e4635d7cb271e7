//! Diff-based control transmission
//!
//! The console owns the merged [`ControlState`] and a snapshot of what the
//! robot last saw. After each composer tick only the entries whose value
//! changed are encoded and written, so an idle tick costs zero bytes on
//! the wire. Per-command last-write-wins holds across ticks; there is no
//! cross-command atomicity (a reader may observe MOVE updated before
//! STRAFE from the same tick).

use crate::error::Result;
use crate::protocol::command::{encode_into, ControlState};
use std::io::Write;

/// Control-channel session state (console side)
pub struct ControlSession<W: Write> {
    writer: W,
    prev: ControlState,
    buf: Vec<u8>,
}

impl<W: Write> ControlSession<W> {
    /// Start a session with a fresh all-zero snapshot, matching the
    /// robot's state at connect
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            prev: ControlState::new(),
            buf: Vec::with_capacity(32),
        }
    }

    /// Encode and transmit every entry whose value changed since the
    /// previous call, then adopt `state` as the new snapshot
    pub fn send_changed(&mut self, state: &ControlState) -> Result<()> {
        self.buf.clear();
        for (cmd, value) in state.iter() {
            if value != self.prev.get(cmd) {
                encode_into(&mut self.buf, cmd, value);
            }
        }

        if !self.buf.is_empty() {
            self.writer.write_all(&self.buf)?;
            self.writer.flush()?;
            log::trace!("Sent {} control bytes", self.buf.len());
        }

        self.prev = *state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::command::Command;

    #[test]
    fn test_idle_tick_sends_nothing() {
        let mut session = ControlSession::new(Vec::new());
        let state = ControlState::new();

        session.send_changed(&state).unwrap();
        assert!(session.writer.is_empty());
    }

    #[test]
    fn test_single_change_single_record() {
        let mut session = ControlSession::new(Vec::new());
        let mut state = ControlState::new();

        state.set(Command::Move, 0.5);
        session.send_changed(&state).unwrap();

        let mut expected = vec![0x01];
        expected.extend_from_slice(&0.5f32.to_be_bytes());
        assert_eq!(session.writer, expected);

        // Unchanged state: nothing further goes out.
        session.send_changed(&state).unwrap();
        assert_eq!(session.writer, expected);
    }

    #[test]
    fn test_multiple_changes_in_tag_order() {
        let mut session = ControlSession::new(Vec::new());
        let mut state = ControlState::new();

        state.set(Command::Turn, -1.0);
        state.set(Command::HeadH, 0.25);
        session.send_changed(&state).unwrap();

        let mut expected = vec![0x03];
        expected.extend_from_slice(&(-1.0f32).to_be_bytes());
        expected.extend_from_slice(&[0x04, 135]);
        assert_eq!(session.writer, expected);
    }
}
