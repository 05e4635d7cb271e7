//! Provider composition with deterministic merge ordering
//!
//! Active providers live in a list whose order encodes priority: the last
//! registered provider is the highest priority. Each tick updates providers
//! from lowest to highest priority so a higher-priority provider's writes
//! to the shared [`ControlState`] land after, and therefore win over, a
//! lower-priority provider's writes for the same command.

use crate::protocol::command::ControlState;
use crate::provider::Provider;

/// Ordered set of active providers
#[derive(Default)]
pub struct ProviderComposer {
    providers: Vec<Box<dyn Provider>>,
}

impl ProviderComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider at the end of the list (highest priority so far)
    pub fn register(&mut self, provider: Box<dyn Provider>) {
        log::info!("Registered provider: {}", provider.name());
        self.providers.push(provider);
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Run one composer tick: update every provider from lowest to
    /// highest priority, then pace on the lowest-priority provider's
    /// `wait`.
    ///
    /// Returns `false` as soon as any provider requests termination; the
    /// tick ends there and the session with it.
    pub fn tick(&mut self, state: &mut ControlState) -> bool {
        for provider in self.providers.iter_mut() {
            if !provider.update(state) {
                log::info!("Provider {} requested session end", provider.name());
                return false;
            }
        }

        if let Some(first) = self.providers.first_mut() {
            first.wait();
        }

        true
    }

    /// Deliver one frame to every provider's draw capability, in provider
    /// list order
    pub fn draw_all(&mut self, frame: &[u8]) {
        for provider in self.providers.iter_mut() {
            provider.draw(frame);
        }
    }
}
