//! Pan/tilt servo control
//!
//! Standard hobby servos on PWM channels 8 (pan) and 9 (tilt), pulsed at
//! 50 Hz: 500 us at 0 degrees plus ~11.1 us per degree (the 0.09 deg/step
//! slope of the original head hardware), converted to counts of the
//! driver's resolution over the 20 ms period.

use crate::error::Result;
use crate::robot::pwm::SharedPwm;

/// First servo channel on the PWM controller (motor pairs use 0-7)
const SERVO_CHANNEL_OFFSET: u8 = 8;

/// PWM period in microseconds at the 50 Hz servo rate
const PERIOD_US: f32 = 20_000.0;

/// Pan servo index
pub const PAN: u8 = 0;

/// Tilt servo index
pub const TILT: u8 = 1;

pub struct PanTilt {
    pwm: SharedPwm,
    resolution: u16,
}

impl PanTilt {
    /// Acquire the head and center both servos to 90 degrees
    pub fn new(pwm: SharedPwm) -> Result<Self> {
        let resolution = pwm.lock().resolution();
        let mut head = Self { pwm, resolution };
        head.set_angle(PAN, 90)?;
        head.set_angle(TILT, 90)?;
        Ok(head)
    }

    /// Drive one servo to an absolute angle in degrees
    pub fn set_angle(&mut self, servo: u8, angle: u8) -> Result<()> {
        let pulse_us = 500 + (f32::from(angle) / 0.09).round() as u32;
        let counts = (pulse_us as f32 * f32::from(self.resolution) / PERIOD_US) as u16;

        log::debug!("Servo {} -> {} deg ({} counts)", servo, angle, counts);
        self.pwm
            .lock()
            .set_duty(SERVO_CHANNEL_OFFSET + servo, counts)
    }
}
