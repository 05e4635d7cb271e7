//! Terminal HUD provider
//!
//! Always-available fallback backend: logs the control state whenever it
//! changes and keeps a frame counter, so a console without any display or
//! VR backend still shows what it is sending. Doubles as the session's
//! pacing provider when it sits at index 0.

use crate::protocol::command::ControlState;
use crate::provider::{FrameSlot, Provider};
use crate::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Control tick pacing interval
const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub struct TerminalProvider {
    shutdown: Arc<AtomicBool>,
    latest: FrameSlot,
    frames: u64,
    last_printed: Option<ControlState>,
}

impl TerminalProvider {
    /// Static availability probe; the terminal backend has no runtime
    /// dependency, so it is always available.
    pub fn available() -> bool {
        true
    }

    /// Acquire the backend. `shutdown` is the process-level interrupt
    /// flag: once set, the next update requests session termination.
    pub fn acquire(shutdown: Arc<AtomicBool>) -> Result<Self> {
        log::info!("Terminal HUD initialized");
        Ok(Self {
            shutdown,
            latest: FrameSlot::new(),
            frames: 0,
            last_printed: None,
        })
    }
}

impl Provider for TerminalProvider {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn draw(&mut self, frame: &[u8]) {
        // Newest-wins: the HUD only ever cares about the latest frame.
        self.latest.put(frame.to_vec());
    }

    fn update(&mut self, state: &mut ControlState) -> bool {
        if self.shutdown.load(Ordering::Relaxed) {
            return false;
        }

        if self.latest.take().is_some() {
            self.frames += 1;
        }

        if self.last_printed != Some(*state) {
            let line = state
                .iter()
                .map(|(cmd, value)| format!("{}={:5.2}", cmd.label(), value))
                .collect::<Vec<_>>()
                .join(", ");
            log::info!("{} | frames: {}", line, self.frames);
            self.last_printed = Some(*state);
        }

        true
    }

    fn wait(&mut self) {
        std::thread::sleep(TICK_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::command::Command;

    #[test]
    fn test_terminates_on_shutdown_flag() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut provider = TerminalProvider::acquire(Arc::clone(&shutdown)).unwrap();

        let mut state = ControlState::new();
        assert!(provider.update(&mut state));

        shutdown.store(true, Ordering::Relaxed);
        assert!(!provider.update(&mut state));
    }

    #[test]
    fn test_counts_delivered_frames() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut provider = TerminalProvider::acquire(shutdown).unwrap();

        provider.draw(&[1, 2, 3]);
        provider.draw(&[4, 5, 6]);

        let mut state = ControlState::new();
        state.set(Command::Move, 1.0);
        provider.update(&mut state);

        // Two draws before one update: only the newest frame counts.
        assert_eq!(provider.frames, 1);
    }
}
