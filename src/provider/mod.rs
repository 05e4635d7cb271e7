//! Render/input provider abstraction (console side)
//!
//! A provider is a pluggable backend supplying rendering and/or input
//! capabilities: a VR headset, a 2D window with keyboard and joystick, a
//! terminal HUD. Providers are selected at startup by availability probing
//! and composed into an ordered list; see [`composer::ProviderComposer`].

pub mod composer;
pub mod terminal;

pub use composer::ProviderComposer;
pub use terminal::TerminalProvider;

use crate::protocol::command::ControlState;
use parking_lot::Mutex;

/// Capability contract implemented by each backend
///
/// `draw` and `wait` default to no-ops so input-only or render-only
/// backends implement just their subset.
pub trait Provider: Send {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Consume one camera frame; failures are contained by the backend,
    /// never propagated
    fn draw(&mut self, frame: &[u8]) {
        let _ = frame;
    }

    /// Translate backend input events into command values, mutating the
    /// shared state in place; returning `false` ends the session
    fn update(&mut self, state: &mut ControlState) -> bool;

    /// Yield for a backend-appropriate pacing interval; invoked only on
    /// the lowest-priority provider, once per tick
    fn wait(&mut self) {}
}

/// Single-slot latest-frame buffer
///
/// Shared between the network thread (writer) and a backend's render
/// thread (reader). The writer replaces, the reader consumes-and-clears;
/// intermediate frames are dropped without harm. No queueing, so memory
/// stays bounded and the render side never sees stale backlog.
#[derive(Default)]
pub struct FrameSlot {
    slot: Mutex<Option<Vec<u8>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a frame, replacing whatever was there
    pub fn put(&self, frame: Vec<u8>) {
        *self.slot.lock() = Some(frame);
    }

    /// Take the newest frame, leaving the slot empty
    pub fn take(&self) -> Option<Vec<u8>> {
        self.slot.lock().take()
    }
}
