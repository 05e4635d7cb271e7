//! PWM driver boundary
//!
//! Motors and servos only ever set per-channel duty values; the register
//! protocol of the actual controller (a 16-channel I2C PWM chip on the
//! real robot) lives behind this trait.

use crate::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// Number of output channels on the PWM controller
pub const PWM_CHANNELS: usize = 16;

/// Per-channel duty driver
pub trait PwmDriver: Send {
    /// Counts per full PWM period (4096 for the 12-bit controller)
    fn resolution(&self) -> u16;

    /// Set the duty value for one channel, in counts
    fn set_duty(&mut self, channel: u8, value: u16) -> Result<()>;
}

/// Shared handle to the one PWM controller, used by both the drive train
/// and the pan/tilt head
pub type SharedPwm = Arc<Mutex<Box<dyn PwmDriver>>>;

/// Wrap a driver into a [`SharedPwm`] handle
pub fn shared(driver: Box<dyn PwmDriver>) -> SharedPwm {
    Arc::new(Mutex::new(driver))
}

/// Mock PWM driver recording the last duty per channel
///
/// Clones share state, so a test can keep one handle while the robot owns
/// the other.
#[derive(Clone, Default)]
pub struct MockPwm {
    channels: Arc<Mutex<[u16; PWM_CHANNELS]>>,
}

impl MockPwm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last duty written to a channel
    pub fn duty(&self, channel: u8) -> u16 {
        self.channels.lock()[channel as usize]
    }
}

impl PwmDriver for MockPwm {
    fn resolution(&self) -> u16 {
        4096
    }

    fn set_duty(&mut self, channel: u8, value: u16) -> Result<()> {
        self.channels.lock()[channel as usize] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_duties() {
        let mock = MockPwm::new();
        let mut driver = mock.clone();

        driver.set_duty(3, 2048).unwrap();
        assert_eq!(mock.duty(3), 2048);
        assert_eq!(mock.duty(0), 0);
    }
}
