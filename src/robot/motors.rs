//! Omni-wheel motor mixing and drive train
//!
//! Three input axes (drive, strafe, turn) combine into four wheel duty
//! cycles for a four-wheel omnidirectional layout. Each axis contributes
//! a per-wheel sign pattern; axes below the deadzone contribute nothing.
//! Per wheel the active contributions are averaged and clamped to
//! [-1.0, 1.0] before scaling to the PWM resolution.
//!
//! Each wheel is driven by two complementary channels. Positive duty sets
//! the forward channel proportional and the reverse channel to zero,
//! negative duty the mirror image, and zero duty sets BOTH channels to
//! full scale - the controller's electrical brake convention. That exact
//! zero behavior must be preserved; "both zero" would mean freewheel.

use crate::error::Result;
use crate::robot::pwm::SharedPwm;

/// Magnitude below which an input axis is treated as zero, so stick noise
/// never drives the wheels
pub const DEADZONE: f32 = 0.3;

/// Complementary (reverse, forward) PWM channel pair per wheel, in the
/// order the sign patterns below index them
pub const MOTOR_CHANNELS: [(u8, u8); 4] = [(0, 1), (3, 2), (6, 7), (4, 5)];

const DRIVE_SIGNS: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const STRAFE_SIGNS: [f32; 4] = [1.0, -1.0, -1.0, 1.0];
const TURN_SIGNS: [f32; 4] = [1.0, 1.0, -1.0, -1.0];

/// Combine axis inputs into per-wheel duty cycles in [-1.0, 1.0]
pub fn mix(drive: f32, strafe: f32, turn: f32) -> [f32; 4] {
    let mut sums = [0.0f32; 4];
    let mut active = 0u32;

    for (axis, signs) in [
        (drive, DRIVE_SIGNS),
        (strafe, STRAFE_SIGNS),
        (turn, TURN_SIGNS),
    ] {
        if axis.abs() > DEADZONE {
            for (sum, sign) in sums.iter_mut().zip(signs) {
                *sum += axis * sign;
            }
            active += 1;
        }
    }

    if active == 0 {
        return [0.0; 4];
    }

    sums.map(|sum| (sum / active as f32).clamp(-1.0, 1.0))
}

/// Applies mixed duties to the wheel PWM channels
pub struct DriveTrain {
    pwm: SharedPwm,
    max: u16,
}

impl DriveTrain {
    pub fn new(pwm: SharedPwm) -> Self {
        let max = pwm.lock().resolution() - 1;
        Self { pwm, max }
    }

    /// Mix the three axes and write all eight wheel channels
    pub fn drive(&mut self, drive: f32, strafe: f32, turn: f32) -> Result<()> {
        let duties = mix(drive, strafe, turn);
        log::debug!(
            "Drive d={:.2} s={:.2} t={:.2} -> duties {:?}",
            drive,
            strafe,
            turn,
            duties
        );

        let mut pwm = self.pwm.lock();
        for ((reverse, forward), duty) in MOTOR_CHANNELS.iter().zip(duties) {
            let value = (duty * self.max as f32) as i32;

            if value > 0 {
                pwm.set_duty(*forward, value as u16)?;
                pwm.set_duty(*reverse, 0)?;
            } else if value < 0 {
                pwm.set_duty(*forward, 0)?;
                pwm.set_duty(*reverse, (-value) as u16)?;
            } else {
                // Electrical brake: both channels at full scale.
                pwm.set_duty(*forward, self.max)?;
                pwm.set_duty(*reverse, self.max)?;
            }
        }
        Ok(())
    }

    /// Brake all wheels
    pub fn stop(&mut self) -> Result<()> {
        self.drive(0.0, 0.0, 0.0)
    }
}
